//! Error types for overlay-core

use std::path::PathBuf;

/// Result type for overlay-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in overlay-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A command was issued against a filesystem state it cannot act on
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    /// A link or copy for a single file could not be created
    #[error("Failed to project {source_path} into {target_path}: {source}")]
    Projection {
        source_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: overlay_fs::Error,
    },

    /// The configuration failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An exception rule is not a usable relative glob
    #[error("Invalid exception pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A module with this name is already configured
    #[error("Module '{name}' is already configured")]
    ModuleExists { name: String },

    /// No module with this name is configured
    #[error("Module '{name}' is not configured")]
    ModuleNotFound { name: String },

    /// Exception rule index out of range
    #[error("No exception rule at index {index} ({count} configured)")]
    ExceptionNotFound { index: usize, count: usize },

    // Transparent wrappers for underlying errors
    /// Filesystem error from overlay-fs
    #[error(transparent)]
    Fs(#[from] overlay_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
