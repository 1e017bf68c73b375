use std::fmt;

use error_location::ErrorLocation;
use thiserror::Error;

/// Audio capability an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Microphone capture writing the recording file.
    Capture,
    /// Speaker playback reading the recording file.
    Playback,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Capture => f.write_str("capture"),
            Capability::Playback => f.write_str("playback"),
        }
    }
}

/// Recorder errors with source location tracking.
#[derive(Error, Debug)]
pub enum MemoError {
    /// Device unavailable, storage unwritable or recording unreadable.
    #[error("Failed to open {capability}: {reason} {location}")]
    CapabilityOpenFailed {
        /// Capability that failed to open.
        capability: Capability,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Level read on a closed or invalid capture handle.
    #[error("Failed to read capture level: {reason} {location}")]
    CapabilityReadFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An open handle could not be stopped or released cleanly.
    #[error("Failed to release {capability}: {reason} {location}")]
    CapabilityReleaseFailed {
        /// Capability that failed to release.
        capability: Capability,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback resampling failed.
    #[error("Resampling error: {reason} {location}")]
    Resampling {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`MemoError`].
pub type Result<T> = std::result::Result<T, MemoError>;
