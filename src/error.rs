//! Engine error taxonomy
//!
//! Every public operation returns a result instead of raising to the top
//! level; the command layer decides user-facing messaging and exit code.

use std::path::PathBuf;

/// Errors produced by the state engine.
///
/// Validation errors are rejected before any write. NotFound errors are
/// resolved via fallback chains where one exists; otherwise only the failing
/// operation aborts. I/O errors carry the failing path and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid enum value, malformed id, or out-of-range confidence
    #[error("validation: {0}")]
    Validation(String),

    /// Expected section, task, or template absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Read/write/copy failure with the failing path
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template missing entirely (distinct from unresolved placeholders,
    /// which are non-fatal warnings)
    #[error("template error: {0}")]
    Template(String),
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
