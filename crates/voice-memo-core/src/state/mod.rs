mod recording_state;
mod state_holder;

pub use {
    recording_state::{PrimaryControl, RecordingState},
    state_holder::{StateHolder, StateObserver},
};
