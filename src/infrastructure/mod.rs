//! # Infrastructure Layer
//!
//! Implementations that touch the OS or the network: the sandbox path
//! guard, the tool executor, and the model service client.

pub mod llm;
pub mod sandbox;
pub mod tools;
pub mod tui;
