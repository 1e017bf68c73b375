use crate::RecordingState;

use tracing::debug;

/// Receives every published [`RecordingState`].
pub trait StateObserver: Send {
    /// Called synchronously from [`StateHolder::set`].
    fn state_changed(&self, state: RecordingState);
}

impl<F> StateObserver for F
where
    F: Fn(RecordingState) + Send,
{
    fn state_changed(&self, state: RecordingState) {
        self(state)
    }
}

/// Publish-on-mutation holder for the recorder state.
///
/// `set` stores the value and notifies every observer before returning, so
/// observers never see a state that the holder does not also report.
pub struct StateHolder {
    value: RecordingState,
    observers: Vec<Box<dyn StateObserver>>,
}

impl StateHolder {
    /// Create a holder with no observers.
    pub fn new(initial: RecordingState) -> Self {
        Self {
            value: initial,
            observers: Vec::new(),
        }
    }

    /// Current state.
    pub fn get(&self) -> RecordingState {
        self.value
    }

    /// Register an observer. It is notified with the current state right away.
    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        observer.state_changed(self.value);
        self.observers.push(observer);
    }

    /// Store `value` and notify observers in subscription order.
    pub fn set(&mut self, value: RecordingState) {
        debug!(from = ?self.value, to = ?value, "State published");
        self.value = value;
        for observer in &self.observers {
            observer.state_changed(value);
        }
    }
}

impl Default for StateHolder {
    fn default() -> Self {
        Self::new(RecordingState::default())
    }
}
