//! Shared types and error hierarchy for Nexus.

pub mod error;
pub mod message;
pub mod model;
pub mod util;

pub use error::{ApiError, ConfigError, RenderError};
pub use message::*;
pub use model::{ConversationalModel, ModelFuture};
pub use util::{preview, truncate_str};
