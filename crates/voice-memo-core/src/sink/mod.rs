mod history;

pub use history::AmplitudeHistory;

/// Receives the rendered elapsed time.
pub trait DisplaySink: Send + Sync {
    /// Replace the displayed text.
    fn set_text(&self, text: &str);
}

/// Receives sampled amplitudes for visualization.
///
/// The sink decides how much history to keep.
pub trait VisualizationSink: Send + Sync {
    /// Append one amplitude sample.
    fn append(&self, level: u32);

    /// Discard all history.
    fn clear(&self);
}
