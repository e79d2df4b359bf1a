//! Shared error type across filstat crates.

use thiserror::Error;

/// Stable error codes, used in logs and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Report interval could not be parsed.
    InvalidInterval,
    /// Endpoint address could not be parsed or turned into dial arguments.
    InvalidEndpoint,
    /// Config file is malformed or fails validation.
    Config,
    /// View registration rejected by the stats backend.
    Registration,
    /// HTTP server failed to bind or serve.
    Server,
    /// Anything else.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidInterval => "INVALID_INTERVAL",
            ErrorCode::InvalidEndpoint => "INVALID_ENDPOINT",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Registration => "REGISTRATION",
            ErrorCode::Server => "SERVER",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, FilstatError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum FilstatError {
    #[error("invalid metrics interval: {0}")]
    InvalidInterval(String),
    #[error("invalid metrics endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("config: {0}")]
    Config(String),
    #[error("view registration failed: {0}")]
    Registration(String),
    #[error("metrics server: {0}")]
    Server(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl FilstatError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            FilstatError::InvalidInterval(_) => ErrorCode::InvalidInterval,
            FilstatError::InvalidEndpoint(_) => ErrorCode::InvalidEndpoint,
            FilstatError::Config(_) => ErrorCode::Config,
            FilstatError::Registration(_) => ErrorCode::Registration,
            FilstatError::Server(_) => ErrorCode::Server,
            FilstatError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// True for errors raised while validating configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            FilstatError::InvalidInterval(_)
                | FilstatError::InvalidEndpoint(_)
                | FilstatError::Config(_)
        )
    }
}
