//! Chat sessions for Nexus: transcript ownership, reply policy, request state.

pub mod error;
pub mod intro;
pub mod reply;
mod session;

pub use error::SessionError;
pub use intro::{ASSISTANT_INTRO, is_intro_request};
pub use reply::{Granularity, Pacing, ReplySource, Units};
pub use session::{ChatSession, SessionState};
