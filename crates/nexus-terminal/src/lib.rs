//! Terminal output for Nexus: the typing renderer, display sinks, and styling.

pub mod sink;
pub mod spinner;
mod state;
mod stream;
pub mod style;

pub use sink::{DisplaySink, FrameRecorder, PlainSink, TerminalSink};
pub use spinner::Spinner;
pub use state::RenderState;
pub use stream::{DEFAULT_CURSOR, StreamRenderer};
