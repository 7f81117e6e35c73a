//! Error type for the semgrid CLI.

use crate::config::ConfigError;

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by the CLI frontend.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the workbench library.
    #[error(transparent)]
    Core(#[from] semgrid::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid command-line usage.
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Create a usage error with a message.
    #[must_use]
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
