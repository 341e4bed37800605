//! # Sandbox Path Guard
//!
//! Resolves model-supplied paths against a fixed workspace root and
//! rejects any resolution that escapes it. Containment is checked on the
//! fully resolved path, never on the raw string.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::domain::errors::ToolError;

/// A fixed workspace root all file and shell operations are confined to.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Creates the root directory if absent and pins its canonical form.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = std::fs::canonicalize(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a model-supplied path to a real path inside the root.
    ///
    /// A leading `/` is treated as the root itself. `.` and `..` segments
    /// are normalized lexically first; a `..` that climbs past the root is
    /// rejected outright. The deepest existing ancestor is then
    /// canonicalized so a symlinked directory cannot carry the target
    /// outside the root, and the containment check runs on that final
    /// resolved path.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, ToolError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(ToolError::Validation("path must not be empty".to_string()));
        }

        // Absolute paths are re-anchored at the sandbox root.
        let relative = trimmed.trim_start_matches('/');

        let mut parts: Vec<OsString> = Vec::new();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(segment) => parts.push(segment.to_os_string()),
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(ToolError::SecurityViolation(format!(
                            "access denied to '{}': escapes the workspace root",
                            path
                        )));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {}
            }
        }

        let mut target = self.root.clone();
        for part in &parts {
            target.push(part);
        }

        let resolved = self.canonicalize_existing_prefix(&target)?;
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(ToolError::SecurityViolation(format!(
                "access denied to '{}': resolves outside the workspace root",
                path
            )))
        }
    }

    /// Canonicalizes the deepest ancestor of `target` that exists, then
    /// re-appends the not-yet-created remainder. New files may be written
    /// under directories that do not exist yet, but every existing
    /// component (including symlinks) is resolved before the containment
    /// check.
    fn canonicalize_existing_prefix(&self, target: &Path) -> Result<PathBuf, ToolError> {
        let mut current = target.to_path_buf();
        let mut pending: Vec<OsString> = Vec::new();

        loop {
            match std::fs::canonicalize(&current) {
                Ok(canonical) => {
                    let mut resolved = canonical;
                    for part in pending.iter().rev() {
                        resolved.push(part);
                    }
                    return Ok(resolved);
                }
                Err(_) => {
                    let Some(name) = current.file_name() else {
                        return Err(ToolError::ExecutionFailure(format!(
                            "unable to resolve path '{}'",
                            target.display()
                        )));
                    };
                    pending.push(name.to_os_string());
                    match current.parent() {
                        Some(parent) => current = parent.to_path_buf(),
                        None => {
                            return Err(ToolError::ExecutionFailure(format!(
                                "unable to resolve path '{}'",
                                target.display()
                            )));
                        }
                    }
                }
            }
        }
    }
}
