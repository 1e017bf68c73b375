use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Cancellable periodic callback.
///
/// Fires once inline from [`RepeatingTask::start`], then again `interval`
/// after each fire has returned. Scheduling is relative to handling time, so
/// a slow fire delays the next one instead of stacking ticks.
///
/// The cancelled flag and the fire share one lock: once [`cancel`] returns,
/// the callback never runs again, even for a tick that was already due.
///
/// [`cancel`]: RepeatingTask::cancel
pub struct RepeatingTask {
    name: &'static str,
    cancelled: Arc<Mutex<bool>>,
    handle: JoinHandle<()>,
}

impl RepeatingTask {
    /// Fire `tick` now and every `interval` after that.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(name: &'static str, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        tick();

        let cancelled = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                // Guard is held across the fire and released before the next await.
                let stop = {
                    let cancelled = flag.lock().unwrap_or_else(|e| {
                        error!(task = name, "Cancel flag lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    if !*cancelled {
                        tick();
                    }
                    *cancelled
                };
                if stop {
                    break;
                }
            }
        });

        debug!(task = name, interval_ms = interval.as_millis(), "Repeating task started");

        Self {
            name,
            cancelled,
            handle,
        }
    }

    /// Stop the task. No tick runs after this returns.
    pub fn cancel(&self) {
        let mut cancelled = self.cancelled.lock().unwrap_or_else(|e| e.into_inner());
        if !*cancelled {
            *cancelled = true;
            self.handle.abort();
            debug!(task = self.name, "Repeating task cancelled");
        }
    }

    /// Whether [`cancel`](RepeatingTask::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
