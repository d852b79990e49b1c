//! Ctrl+C handling: cancel the reply in flight, or exit when idle.

use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Exit status for an interrupt at the prompt (128 + SIGINT).
const INTERRUPT_EXIT_CODE: i32 = 130;

/// Routes Ctrl+C to the current turn's cancellation token.
pub struct InterruptHandler {
    in_flight: Arc<Mutex<Option<CancellationToken>>>,
}

impl InterruptHandler {
    /// Start listening for Ctrl+C on a background task.
    pub fn install() -> Self {
        let in_flight: Arc<Mutex<Option<CancellationToken>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&in_flight);

        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                let token = slot.lock().ok().and_then(|mut t| t.take());
                match token {
                    Some(token) => {
                        tracing::debug!("Interrupt: cancelling reply in flight");
                        token.cancel();
                    }
                    None => {
                        eprintln!();
                        std::process::exit(INTERRUPT_EXIT_CODE);
                    }
                }
            }
        });

        Self { in_flight }
    }

    /// Register a fresh token for the turn about to start.
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Ok(mut slot) = self.in_flight.lock() {
            *slot = Some(token.clone());
        }
        token
    }

    /// The turn is over; Ctrl+C exits again.
    pub fn end(&self) {
        if let Ok(mut slot) = self.in_flight.lock() {
            slot.take();
        }
    }
}
