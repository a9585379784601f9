//! Error types for code generation and persistence

use thiserror::Error;

/// Errors that can occur while generating or persisting artifacts
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Requested backend has no generation rules
    #[error("Unsupported backend '{0}'. Supported backends: c, cuda")]
    UnsupportedBackend(String),

    /// Build mode configuration could not be read
    #[error("Invalid build mode: {0}")]
    InvalidBuildMode(String),

    /// Writing the artifact set failed; nothing from this run was kept
    #[error("Failed to write artifacts to '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
