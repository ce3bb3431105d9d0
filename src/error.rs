use thiserror::Error;

/// Errors raised by the chart pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed series data or chart parameters. A programming error upstream.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Aggregate failure of a batch load. One bad package fails the whole batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("load failed: {reason}")]
pub struct LoadError {
    /// Logged for diagnostics, never shown to the user.
    pub reason: String,
}

impl LoadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
