//! Session-specific error types.

use crate::SessionState;
use nexus_types::ApiError;
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Nothing to send: input is empty")]
    EmptyInput,

    #[error("A reply is already in progress for this session")]
    Busy,

    #[error("Operation not allowed while session is {actual} (expected {expected})")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },

    #[error("No reply pending for \"{text}\": it was not the submitted text")]
    NotSubmitted { text: String },

    #[error("Upstream error: {0}")]
    Upstream(#[from] ApiError),
}
