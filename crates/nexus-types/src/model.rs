//! Trait for the remote conversational model.

use crate::{ApiError, Message};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`ConversationalModel::send_message`].
pub type ModelFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ApiError>> + Send + 'a>>;

/// A hosted language model that answers one user turn at a time.
///
/// `context` is the conversation so far, oldest first, not including
/// `new_text`. Implementations own credentials and connection setup.
/// Dyn-compatible so sessions can hold `Arc<dyn ConversationalModel>`.
pub trait ConversationalModel: Send + Sync {
    /// Send `new_text` after `context` and return the complete reply text.
    fn send_message<'a>(&'a self, context: &'a [Message], new_text: &'a str) -> ModelFuture<'a>;

    /// Model name for logging/display (e.g., "gemini-1.5-flash").
    fn name(&self) -> &str;
}
