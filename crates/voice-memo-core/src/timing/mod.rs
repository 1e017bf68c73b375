mod clock;
mod repeating_task;
mod sampler;
mod ticker;

pub use {
    clock::{Clock, MonotonicClock},
    repeating_task::RepeatingTask,
    sampler::{AmplitudeSampler, AmplitudeSource},
    ticker::{ElapsedTicker, ZERO_ELAPSED, format_elapsed},
};
