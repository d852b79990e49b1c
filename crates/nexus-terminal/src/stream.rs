//! Incremental "typing" renderer for assistant replies.
//!
//! Units (words or characters) are appended one at a time; after each unit
//! the sink receives the text so far followed by a cursor glyph. Once the
//! units run out, the sink receives the trimmed text with no cursor.

use crate::sink::DisplaySink;
use crate::state::RenderState;
use nexus_types::RenderError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Glyph shown at the end of in-progress text.
pub const DEFAULT_CURSOR: &str = "\u{258C}";

/// Emits a reply to a [`DisplaySink`] one unit at a time.
#[derive(Debug, Clone)]
pub struct StreamRenderer {
    cursor: String,
}

impl Default for StreamRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamRenderer {
    pub fn new() -> Self {
        Self {
            cursor: DEFAULT_CURSOR.to_string(),
        }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    /// Render `units` to `sink`, pausing `delay` after each unit.
    ///
    /// Returns the whitespace-trimmed concatenation of all units. The pause is
    /// a cooperative sleep raced against `cancel`; cancellation stops the
    /// render with [`RenderError::Cancelled`] and the sink keeps its last frame.
    pub async fn render<I, S>(
        &self,
        units: I,
        delay: Duration,
        mut sink: S,
        cancel: &CancellationToken,
    ) -> Result<String, RenderError>
    where
        I: IntoIterator<Item = String>,
        S: DisplaySink,
    {
        let mut state = RenderState::new();
        let mut emitted = 0usize;

        for unit in units {
            if cancel.is_cancelled() {
                return Err(RenderError::Cancelled);
            }

            state.push(&unit);
            sink.update(&state.frame(&self.cursor))?;
            emitted += 1;

            if !delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("Render cancelled after {emitted} units");
                        return Err(RenderError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        let text = state.finish();
        sink.finish(&text)?;
        tracing::debug!("Rendered {emitted} units ({} bytes)", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::FrameRecorder;
    use std::io;

    fn chars(text: &str) -> Vec<String> {
        text.chars().map(String::from).collect()
    }

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(|w| format!("{w} ")).collect()
    }

    struct BrokenSink {
        fail_after: usize,
        calls: usize,
    }

    impl DisplaySink for BrokenSink {
        fn update(&mut self, _frame: &str) -> io::Result<()> {
            self.calls += 1;
            if self.calls > self.fail_after {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "display gone"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn char_units_emit_growing_frames() {
        let renderer = StreamRenderer::new();
        let mut recorder = FrameRecorder::new();
        let text = renderer
            .render(
                chars("Hi there"),
                Duration::ZERO,
                &mut recorder,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(text, "Hi there");
        assert_eq!(recorder.frames.len(), 8);
        assert_eq!(recorder.frames[0], "H\u{258C}");
        assert_eq!(recorder.frames[1], "Hi\u{258C}");
        assert_eq!(recorder.frames[7], "Hi there\u{258C}");
        assert_eq!(recorder.finished.as_deref(), Some("Hi there"));
    }

    #[tokio::test]
    async fn word_units_joined_by_single_space_and_trimmed() {
        let renderer = StreamRenderer::new();
        let mut recorder = FrameRecorder::new();
        let text = renderer
            .render(
                words("I  am\n a model"),
                Duration::ZERO,
                &mut recorder,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(text, "I am a model");
        assert_eq!(recorder.frames[0], "I \u{258C}");
        assert_eq!(recorder.frames[3], "I am a model \u{258C}");
    }

    #[tokio::test(start_paused = true)]
    async fn result_independent_of_delay() {
        let renderer = StreamRenderer::new();
        let cancel = CancellationToken::new();
        let fast = renderer
            .render(chars(" padded "), Duration::ZERO, FrameRecorder::new(), &cancel)
            .await
            .unwrap();
        let slow = renderer
            .render(
                chars(" padded "),
                Duration::from_millis(10),
                FrameRecorder::new(),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(fast, "padded");
        assert_eq!(fast, slow);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_applies_per_unit() {
        let renderer = StreamRenderer::new();
        let start = tokio::time::Instant::now();
        renderer
            .render(
                chars("abcd"),
                Duration::from_millis(10),
                FrameRecorder::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn empty_units_finish_empty() {
        let renderer = StreamRenderer::new();
        let mut recorder = FrameRecorder::new();
        let text = renderer
            .render(
                Vec::<String>::new(),
                Duration::ZERO,
                &mut recorder,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(text, "");
        assert!(recorder.frames.is_empty());
        assert_eq!(recorder.finished.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn custom_cursor() {
        let renderer = StreamRenderer::new().with_cursor("_");
        let mut recorder = FrameRecorder::new();
        renderer
            .render(chars("ok"), Duration::ZERO, &mut recorder, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(recorder.frames, ["o_", "ok_"]);
    }

    #[tokio::test]
    async fn sink_failure_is_render_error() {
        let renderer = StreamRenderer::new();
        let sink = BrokenSink {
            fail_after: 2,
            calls: 0,
        };
        let result = renderer
            .render(chars("hello"), Duration::ZERO, sink, &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(RenderError::Sink(_))));
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let renderer = StreamRenderer::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut recorder = FrameRecorder::new();
        let result = renderer
            .render(chars("hello"), Duration::ZERO, &mut recorder, &cancel)
            .await;
        assert!(matches!(result, Err(RenderError::Cancelled)));
        assert!(recorder.frames.is_empty());
        assert!(recorder.finished.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_mid_render() {
        let renderer = StreamRenderer::new();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(25)).await;
            trigger.cancel();
        });

        let mut recorder = FrameRecorder::new();
        let result = renderer
            .render(
                chars("a long reply"),
                Duration::from_millis(10),
                &mut recorder,
                &cancel,
            )
            .await;
        assert!(matches!(result, Err(RenderError::Cancelled)));
        assert!(!recorder.frames.is_empty());
        assert!(recorder.frames.len() < 12);
        assert!(recorder.finished.is_none());
    }
}
