// ============================================================
// Layer 3 — Data Pipeline Errors
// ============================================================
// Typed failures that callers may want to match on. Everything
// above the data layer wraps these in anyhow with context.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    /// A line in a source file violates the `<text><sep><label>` layout.
    #[error("malformed record at {}:{line}: {reason}", path.display())]
    MalformedRecord {
        path:   PathBuf,
        /// 1-based line number
        line:   usize,
        reason: String,
    },

    /// Accelerator requested but this build has no accelerator backend.
    #[error("accelerator requested but not available in this build")]
    DeviceUnavailable,

    /// Failure reported by the tokenizer or the tensor framework.
    #[error("framework error: {0}")]
    Framework(String),

    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DataError {
    pub fn framework(e: impl std::fmt::Display) -> Self {
        Self::Framework(e.to_string())
    }
}
