//! Braille spinner shown on stderr while a reply is pending.

use std::io::Write;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Braille animation frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame interval in milliseconds.
const FRAME_MS: u64 = 80;

/// A terminal spinner running as a background tokio task.
///
/// Call `stop()` before drawing anything else on the same line.
pub struct Spinner {
    handle: JoinHandle<()>,
}

impl Spinner {
    /// Start a spinner showing `message`.
    pub fn new(message: &str) -> Self {
        let message = message.to_string();
        let handle = tokio::spawn(async move {
            for frame in FRAMES.iter().cycle() {
                let _ = write!(std::io::stderr(), "\r  {frame} {message}");
                let _ = std::io::stderr().flush();
                tokio::time::sleep(Duration::from_millis(FRAME_MS)).await;
            }
        });

        Self { handle }
    }

    /// Abort the animation task and clear the line.
    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
        clear_line();
    }
}

/// Clear the current line on stderr.
pub fn clear_line() {
    let _ = write!(std::io::stderr(), "\r\x1b[2K");
    let _ = std::io::stderr().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}

    #[test]
    fn spinner_is_send_sync() {
        is_send::<Spinner>();
        is_sync::<Spinner>();
    }

    #[test]
    fn frames_has_entries() {
        assert!(FRAMES.len() >= 2);
    }

    #[tokio::test]
    async fn start_and_stop_no_panic() {
        let spinner = Spinner::new("Thinking...");
        tokio::time::sleep(Duration::from_millis(1)).await;
        spinner.stop().await;
    }
}
