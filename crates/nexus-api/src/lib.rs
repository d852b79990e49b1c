//! Gemini API client for Nexus.

mod client;
mod model;
pub mod wire;

pub use client::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, GeminiClient};
