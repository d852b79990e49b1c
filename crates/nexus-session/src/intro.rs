//! Canned self-introduction and the phrases that trigger it.

/// The fixed introduction returned instead of calling the model.
pub const ASSISTANT_INTRO: &str = "I am a large language model, based on Gemini. \
I'm a computer program designed to process and generate human-like text. \
I can answer questions, translate languages, write different kinds of creative content, \
and summarize factual topics. Essentially, I'm an AI assistant designed to help people \
with a wide range of tasks involving text.";

/// Lowercase phrases that ask the assistant about itself.
pub const INTRO_TRIGGERS: &[&str] = &[
    "who are you",
    "about yourself",
    "tell me about you",
    "what are you",
];

/// True if `text` contains any trigger phrase, ignoring case.
pub fn is_intro_request(text: &str) -> bool {
    let lowered = text.to_lowercase();
    INTRO_TRIGGERS.iter().any(|phrase| lowered.contains(phrase))
}
