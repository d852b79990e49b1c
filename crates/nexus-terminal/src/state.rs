//! Per-reply accumulation state, kept free of any display side effects.

/// Text accumulated so far for one reply, plus whether emission has ended.
#[derive(Debug, Default)]
pub struct RenderState {
    accumulated: String,
    complete: bool,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one unit (a word with its trailing space, or a single char).
    pub fn push(&mut self, unit: &str) {
        debug_assert!(!self.complete, "push after finish");
        self.accumulated.push_str(unit);
    }

    /// The in-progress frame: accumulated text followed by the cursor glyph.
    pub fn frame(&self, cursor: &str) -> String {
        let mut frame = String::with_capacity(self.accumulated.len() + cursor.len());
        frame.push_str(&self.accumulated);
        frame.push_str(cursor);
        frame
    }

    /// Mark emission complete and return the whitespace-trimmed text.
    pub fn finish(&mut self) -> String {
        self.complete = true;
        self.accumulated.trim().to_string()
    }

    pub fn text(&self) -> &str {
        &self.accumulated
    }
}
