use crate::{Clock, DisplaySink, RepeatingTask};

use std::{sync::Arc, time::Duration};

use tokio::time::Instant;
use tracing::debug;

/// Text shown by a cleared or freshly started timer.
pub const ZERO_ELAPSED: &str = "00:00";

/// Render whole seconds as `MM:SS`.
///
/// Minutes keep growing past 59; seconds wrap at 60.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

struct TimerSession {
    started_at: Instant,
    task: RepeatingTask,
}

/// Elapsed-time counter rendering `MM:SS` into a [`DisplaySink`].
pub struct ElapsedTicker {
    clock: Arc<dyn Clock>,
    display: Arc<dyn DisplaySink>,
    interval: Duration,
    session: Option<TimerSession>,
}

impl ElapsedTicker {
    /// Create a stopped ticker.
    pub fn new(clock: Arc<dyn Clock>, display: Arc<dyn DisplaySink>, interval: Duration) -> Self {
        Self {
            clock,
            display,
            interval,
            session: None,
        }
    }

    /// Begin a new timing session from now.
    ///
    /// A running session is replaced; elapsed time never carries over.
    pub fn start(&mut self) {
        self.stop();

        let started_at = self.clock.now();
        let clock = Arc::clone(&self.clock);
        let display = Arc::clone(&self.display);

        let task = RepeatingTask::start("elapsed-ticker", self.interval, move || {
            let elapsed = clock.now().saturating_duration_since(started_at).as_secs();
            display.set_text(&format_elapsed(elapsed));
        });

        self.session = Some(TimerSession { started_at, task });
    }

    /// Halt updates, leaving the last rendered value on the display.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            session.task.cancel();
            debug!(
                elapsed_ms = self
                    .clock
                    .now()
                    .saturating_duration_since(session.started_at)
                    .as_millis(),
                "Ticker stopped"
            );
        }
    }

    /// Halt updates and reset the display to `00:00`.
    pub fn clear(&mut self) {
        self.stop();
        self.display.set_text(ZERO_ELAPSED);
    }

    /// Whether a timing session is active.
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }
}
