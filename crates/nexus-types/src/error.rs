//! Error hierarchy for Nexus.

use thiserror::Error;

/// Failures of the remote conversational model.
///
/// The core never retries any of these; the caller decides what to show.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Quota exhausted or rate limited: {message}")]
    RateLimited { message: String },

    #[error("Server error: {status} {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Response blocked: {reason}")]
    Blocked { reason: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Failures while emitting a reply to a display sink.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Display sink failed: {0}")]
    Sink(#[from] std::io::Error),

    #[error("Render cancelled")]
    Cancelled,
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
