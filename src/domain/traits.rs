//! # Domain Traits
//!
//! Abstract interface for the model session. Allows a pluggable
//! implementation in the Infrastructure layer and a scripted one in tests.

use async_trait::async_trait;

use crate::domain::errors::UpstreamError;
use crate::domain::types::{ModelResponse, ModelTurn};

/// The opaque conversation handle the orchestrator owns.
///
/// The remote side remembers prior turns; `send` is the only way to
/// advance the exchange, which keeps conversation state from being
/// mutated out of order.
#[async_trait]
pub trait ModelSession: Send {
    /// Send one turn of input and wait for the model's response.
    async fn send(&mut self, turn: ModelTurn) -> Result<ModelResponse, UpstreamError>;
}
