use tokio::time::Instant;

/// Monotonic time source used for elapsed-time calculations.
pub trait Clock: Send + Sync {
    /// Current instant. Never decreases between calls.
    fn now(&self) -> Instant;
}

/// Clock backed by the tokio time driver.
///
/// Follows tokio's paused clock, so `#[tokio::test(start_paused = true)]`
/// controls it deterministically.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
