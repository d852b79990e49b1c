//! The chat session: transcript ownership and the per-request state machine.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use nexus_types::{ApiError, ConversationalModel, Message, Transcript, preview};
use uuid::Uuid;

use crate::error::SessionError;
use crate::intro::is_intro_request;
use crate::reply::ReplySource;

/// Where a session is in its request cycle.
///
/// `Idle → AwaitingReply → Streaming → Idle`. An upstream failure goes
/// straight from `AwaitingReply` back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingReply,
    Streaming,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingReply => "awaiting reply",
            SessionState::Streaming => "streaming",
        };
        f.write_str(name)
    }
}

/// One conversation with a remote model.
///
/// Holds the append-only transcript. At most one reply is in flight at a
/// time; a second `submit` before `finalize` or `abandon` is rejected.
pub struct ChatSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    transcript: Transcript,
    model: Arc<dyn ConversationalModel>,
    state: SessionState,
    /// Index of the user message awaiting a reply.
    pending: Option<usize>,
    request_timeout: Option<Duration>,
}

impl ChatSession {
    /// Create a new empty session.
    pub fn new(model: Arc<dyn ConversationalModel>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            transcript: Transcript::new(),
            model,
            state: SessionState::Idle,
            pending: None,
            request_timeout: None,
        }
    }

    /// Bound the model call; expiry surfaces as [`ApiError::Timeout`].
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Short hex prefix of the session ID for display.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Append the user's message and start a request.
    pub fn submit(&mut self, user_text: &str) -> Result<Message, SessionError> {
        if user_text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }
        if self.state != SessionState::Idle {
            return Err(SessionError::Busy);
        }

        tracing::debug!("[{}] submit: {}", self.short_id(), preview(user_text, 60));
        let message = Message::user(user_text);
        self.pending = Some(self.transcript.len());
        self.transcript.push(message.clone());
        self.transition(SessionState::AwaitingReply);
        Ok(message)
    }

    /// Produce the reply for the submitted text.
    ///
    /// `user_text` must be the text passed to the preceding `submit`.
    /// Intro questions get the canned introduction; everything else goes to
    /// the model with the transcript preceding the submitted message. On
    /// failure the session returns to idle with only the user message added.
    pub async fn reply(&mut self, user_text: &str) -> Result<ReplySource, SessionError> {
        self.expect_state(SessionState::AwaitingReply)?;

        let (context_len, submitted) = self.pending_message()?;
        if submitted != user_text {
            return Err(SessionError::NotSubmitted {
                text: preview(user_text, 60),
            });
        }

        if is_intro_request(&submitted) {
            tracing::debug!("[{}] intro requested", self.short_id());
            self.transition(SessionState::Streaming);
            return Ok(ReplySource::intro());
        }

        let result = self.ask_model(context_len, &submitted).await;

        match result {
            Ok(text) => {
                self.transition(SessionState::Streaming);
                Ok(ReplySource::model(text))
            }
            Err(e) => {
                tracing::warn!("[{}] model call failed: {e}", self.short_id());
                self.pending = None;
                self.transition(SessionState::Idle);
                Err(SessionError::Upstream(e))
            }
        }
    }

    /// Transcript index and content of the message awaiting a reply.
    fn pending_message(&self) -> Result<(usize, String), SessionError> {
        self.pending
            .and_then(|index| {
                let message = self.transcript.messages().get(index)?;
                Some((index, message.content().to_string()))
            })
            .ok_or(SessionError::InvalidState {
                expected: SessionState::AwaitingReply,
                actual: self.state,
            })
    }

    async fn ask_model(&self, context_len: usize, user_text: &str) -> Result<String, ApiError> {
        let context = &self.transcript.messages()[..context_len];
        tracing::debug!(
            "[{}] sending to {} with {} context messages",
            self.short_id(),
            self.model.name(),
            context.len()
        );

        let call = self.model.send_message(context, user_text);
        match self.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| ApiError::Timeout)?,
            None => call.await,
        }
    }

    /// Store the rendered reply as an assistant message and end the request.
    pub fn finalize(&mut self, text: &str) -> Result<Message, SessionError> {
        self.expect_state(SessionState::Streaming)?;

        let message = Message::assistant(text.trim());
        self.transcript.push(message.clone());
        self.pending = None;
        self.transition(SessionState::Idle);
        Ok(message)
    }

    /// Drop the in-flight reply without storing anything.
    ///
    /// Used after a render error or cancellation. No-op when idle.
    pub fn abandon(&mut self) {
        if self.state != SessionState::Idle {
            tracing::debug!("[{}] reply abandoned while {}", self.short_id(), self.state);
        }
        self.pending = None;
        self.transition(SessionState::Idle);
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::debug!("[{}] {} -> {}", self.short_id(), self.state, next);
        }
        self.state = next;
    }
}
