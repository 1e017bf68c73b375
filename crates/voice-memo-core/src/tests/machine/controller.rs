use crate::{
    Capability, MemoError, MemoEvent, OpenHandle, RecordingState, ZERO_ELAPSED,
    tests::fakes::{Harness, MAX_AMPLITUDE},
};

use std::{
    path::Path,
    sync::{Arc, Mutex, atomic::Ordering},
    time::Duration,
};

use uuid::Uuid;

const HALF_TICK: Duration = Duration::from_millis(500);

/// WHAT: The primary button walks through the full record/play cycle
/// WHY: Each state must lead to the documented next state
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_fresh_controller_when_pressing_primary_four_times_then_states_cycle() {
    // Given: A controller in its initial state
    let mut h = Harness::new();
    assert_eq!(h.controller.state(), RecordingState::BeforeRecording);

    // When: Pressing the primary button four times
    h.press().unwrap();
    h.press().unwrap();
    h.press().unwrap();
    h.press().unwrap();

    // Then: Record, stop, play, stop
    assert_eq!(
        h.states(),
        vec![
            RecordingState::BeforeRecording,
            RecordingState::OnRecording,
            RecordingState::AfterRecording,
            RecordingState::OnPlaying,
            RecordingState::AfterRecording,
        ]
    );
    assert_eq!(h.capture.opens.load(Ordering::SeqCst), 1);
    assert_eq!(h.playback.opens.load(Ordering::SeqCst), 1);
}

/// WHAT: Handles, ticker and sampler always agree with the state
/// WHY: OnRecording and OnPlaying must own exactly one handle and run both processes
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_any_reachable_state_when_inspecting_then_invariant_holds() {
    // Given: A controller
    let mut h = Harness::new();
    h.assert_consistent();

    // When: Visiting every state, including via reset from both reset-enabled states
    let steps: [fn(&mut Harness) -> crate::CoreResult<()>; 9] = [
        Harness::press, // OnRecording
        Harness::press, // AfterRecording
        Harness::reset, // BeforeRecording
        Harness::press, // OnRecording
        Harness::press, // AfterRecording
        Harness::press, // OnPlaying
        Harness::reset, // BeforeRecording
        Harness::reset, // no-op
        Harness::press, // OnRecording
    ];

    // Then: The invariant holds after every step
    for step in steps {
        step(&mut h).unwrap();
        tokio::time::sleep(HALF_TICK).await;
        h.assert_consistent();
    }
}

/// WHAT: Recording opens capture at the configured path and samples its level
/// WHY: The sampler must read the live capture meter while recording
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_before_recording_when_pressing_primary_then_capture_level_is_sampled() {
    // Given: A controller ready to record
    let mut h = Harness::new();

    // When: Starting a recording and feeding the meter
    h.press().unwrap();
    let meter = h.capture.meter().unwrap();
    meter.record_peak(1200);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // Then: First sample is immediate (0), second reads the held peak
    assert_eq!(h.visualization.levels(), vec![0, 1200]);
    assert_eq!(
        h.capture.destinations.lock().unwrap().as_slice(),
        [Path::new("memo.wav").to_path_buf()]
    );
    assert!(matches!(
        h.controller.open_handle(),
        Some(OpenHandle::Capture(_))
    ));
}

/// WHAT: Playback samples a constant zero amplitude
/// WHY: There is no level source during playback
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_after_recording_when_playing_then_sampler_appends_zeros() {
    // Given: A finished recording with a loud history
    let mut h = Harness::new();
    h.press().unwrap();
    h.capture.meter().unwrap().record_peak(MAX_AMPLITUDE);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    h.press().unwrap();
    let recorded = h.visualization.levels().len();

    // When: Playing for two ticks
    h.press().unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    // Then: Every playback sample is zero
    let levels = h.visualization.levels();
    assert_eq!(levels.len(), recorded + 3);
    assert!(levels[recorded..].iter().all(|&level| level == 0));
}

/// WHAT: Ticker restarts from 00:00 on playback
/// WHY: Playback time is measured from the start of playback, not of recording
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recording_of_five_seconds_when_playing_then_timer_restarts_from_zero() {
    // Given: A five-second recording
    let mut h = Harness::new();
    h.press().unwrap();
    tokio::time::sleep(Duration::from_millis(5200)).await;
    h.press().unwrap();
    assert_eq!(h.display.last().as_deref(), Some("00:05"));

    // When: Starting playback
    h.press().unwrap();

    // Then: Display shows 00:00 and counts up from there
    assert_eq!(h.display.last().as_deref(), Some(ZERO_ELAPSED));
    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(h.display.last().as_deref(), Some("00:02"));
}

/// WHAT: Stopping keeps the last elapsed time on the display
/// WHY: The recorded length stays visible in AfterRecording
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_stopping_then_display_keeps_elapsed_time() {
    // Given: A recording running for three and a half seconds
    let mut h = Harness::new();
    h.press().unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;

    // When: Stopping and letting more time pass
    h.press().unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    // Then: Display still reads 00:03
    assert_eq!(h.display.last().as_deref(), Some("00:03"));
    assert_eq!(h.controller.state(), RecordingState::AfterRecording);
}

/// WHAT: Reset clears timer display and visualization history
/// WHY: Returning to BeforeRecording must discard the previous session's output
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_after_recording_when_reset_then_display_zero_and_history_empty() {
    // Given: A recording with history and elapsed time
    let mut h = Harness::new();
    h.press().unwrap();
    h.capture.meter().unwrap().record_peak(900);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    h.press().unwrap();
    assert!(!h.visualization.levels().is_empty());

    // When: Resetting
    h.reset().unwrap();

    // Then: Everything is back to the initial presentation
    assert_eq!(h.controller.state(), RecordingState::BeforeRecording);
    assert_eq!(h.display.last().as_deref(), Some(ZERO_ELAPSED));
    assert!(h.visualization.levels().is_empty());
    h.assert_consistent();
}

/// WHAT: Reset during playback closes the playback handle first
/// WHY: Side effects are ordered audio, timer, visualization, state
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_on_playing_when_reset_then_side_effects_in_order() {
    // Given: Playback in progress
    let mut h = Harness::new();
    h.press().unwrap();
    h.press().unwrap();
    h.press().unwrap();
    h.journal.clear();

    // When: Resetting
    h.reset().unwrap();

    // Then: Close, display, visualization, state
    assert_eq!(
        h.journal.entries(),
        vec![
            "playback:close".to_string(),
            format!("display:{ZERO_ELAPSED}"),
            "visualization:clear".to_string(),
            "state:BeforeRecording".to_string(),
        ]
    );
}

/// WHAT: Reset is ignored before and during recording
/// WHY: The reset control is only enabled in AfterRecording and OnPlaying
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_before_or_on_recording_when_reset_then_nothing_changes() {
    // Given: A fresh controller
    let mut h = Harness::new();

    // When: Resetting in BeforeRecording
    h.reset().unwrap();

    // Then: No side effects
    assert!(h.journal.entries().is_empty());
    assert_eq!(h.controller.state(), RecordingState::BeforeRecording);

    // When: Resetting in OnRecording
    h.press().unwrap();
    h.journal.clear();
    h.reset().unwrap();

    // Then: Recording continues untouched
    assert!(h.journal.entries().is_empty());
    assert_eq!(h.controller.state(), RecordingState::OnRecording);
    h.assert_consistent();
}

/// WHAT: Natural end of playback behaves like pressing stop
/// WHY: Playback completion must return to AfterRecording and free the device
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_on_playing_when_playback_completes_then_after_recording() {
    // Given: Playback in progress
    let mut h = Harness::new();
    h.press().unwrap();
    h.press().unwrap();
    h.press().unwrap();

    // When: The playback capability reports the end
    assert!(h.playback.complete());
    h.drain_events().unwrap();

    // Then: Same result as a manual stop
    assert_eq!(h.controller.state(), RecordingState::AfterRecording);
    assert_eq!(h.playback.closes.load(Ordering::SeqCst), 1);
    h.assert_consistent();
}

/// WHAT: Completion from an earlier playback is ignored
/// WHY: A late signal must not stop a newer playback
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_second_playback_when_stale_completion_arrives_then_playback_continues() {
    // Given: A first playback that was stopped, then a second one
    let mut h = Harness::new();
    h.press().unwrap();
    h.press().unwrap();
    h.press().unwrap();
    let first = match h.controller.open_handle() {
        Some(OpenHandle::Playback(session_id)) => Some(session_id),
        _ => None,
    }
    .unwrap();
    h.press().unwrap();
    h.press().unwrap();

    // When: The first session's completion arrives
    h.controller
        .handle(MemoEvent::PlaybackCompleted { session_id: first })
        .unwrap();

    // Then: The second playback keeps running
    assert_eq!(h.controller.state(), RecordingState::OnPlaying);
    assert_ne!(
        h.controller.open_handle(),
        Some(OpenHandle::Playback(first))
    );
    h.assert_consistent();
}

/// WHAT: Completion outside OnPlaying is ignored
/// WHY: Completion is only meaningful for an open playback
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_on_recording_when_completion_arrives_then_ignored() {
    // Given: A recording in progress
    let mut h = Harness::new();
    h.press().unwrap();

    // When: An unknown completion arrives
    h.controller
        .handle(MemoEvent::PlaybackCompleted {
            session_id: Uuid::new_v4(),
        })
        .unwrap();

    // Then: Still recording
    assert_eq!(h.controller.state(), RecordingState::OnRecording);
    h.assert_consistent();
}

/// WHAT: A double press opens exactly one capture
/// WHY: Transitions are serialized; the second press stops the first recording
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_before_recording_when_double_pressing_then_single_capture_opened() {
    // Given: A fresh controller
    let mut h = Harness::new();

    // When: Two presses back to back
    h.press().unwrap();
    h.press().unwrap();

    // Then: One capture opened and closed
    assert_eq!(h.capture.opens.load(Ordering::SeqCst), 1);
    assert_eq!(h.capture.closes.load(Ordering::SeqCst), 1);
    assert_eq!(h.controller.state(), RecordingState::AfterRecording);
}

/// WHAT: Capture open failure leaves the controller idle
/// WHY: A denied microphone must not start the timer or change state
#[tokio::test(start_paused = true)]
async fn given_capture_unavailable_when_pressing_primary_then_error_and_state_unchanged() {
    // Given: A capture capability that fails to open
    let mut h = Harness::new();
    h.capture.fail_open.store(true, Ordering::SeqCst);

    // When: Pressing record
    let result = h.press();

    // Then: Open failure, nothing running, nothing published
    assert!(matches!(
        result,
        Err(MemoError::CapabilityOpenFailed {
            capability: Capability::Capture,
            ..
        })
    ));
    assert_eq!(h.controller.state(), RecordingState::BeforeRecording);
    assert!(h.journal.entries().is_empty());
    assert!(h.display.texts().is_empty());
    h.assert_consistent();
}

/// WHAT: Playback open failure stays in AfterRecording
/// WHY: The recording remains available for another attempt
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_playback_unavailable_when_pressing_play_then_error_and_state_unchanged() {
    // Given: A recording and a playback capability that fails to open
    let mut h = Harness::new();
    h.press().unwrap();
    h.press().unwrap();
    h.playback.fail_open.store(true, Ordering::SeqCst);

    // When: Pressing play
    let result = h.press();

    // Then: Open failure, still AfterRecording
    assert!(matches!(
        result,
        Err(MemoError::CapabilityOpenFailed {
            capability: Capability::Playback,
            ..
        })
    ));
    assert_eq!(h.controller.state(), RecordingState::AfterRecording);
    h.assert_consistent();
}

/// WHAT: Release failure still completes the stop transition
/// WHY: The handle is consumed by close and cannot be retried
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_capture_close_fails_when_stopping_then_error_returned_and_after_recording() {
    // Given: A recording whose capture fails to finalize
    let mut h = Harness::new();
    h.press().unwrap();
    h.capture.fail_close.store(true, Ordering::SeqCst);

    // When: Stopping
    let result = h.press();

    // Then: Error reported, transition completed
    assert!(matches!(
        result,
        Err(MemoError::CapabilityReleaseFailed { .. })
    ));
    assert_eq!(h.controller.state(), RecordingState::AfterRecording);
    h.assert_consistent();
}

/// WHAT: A failing playback close during reset still resets
/// WHY: The release error is reported, but the recorder must not stay half reset
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_playback_close_fails_when_resetting_then_error_returned_and_before_recording() {
    // Given: Playback in progress with history, and a device that fails to close
    let mut h = Harness::new();
    h.press().unwrap();
    h.capture.meter().unwrap().record_peak(900);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    h.press().unwrap();
    h.press().unwrap();
    h.playback.fail_close.store(true, Ordering::SeqCst);
    h.journal.clear();

    // When: Resetting
    let result = h.reset();

    // Then: Error reported, reset fully applied in order
    assert!(matches!(
        result,
        Err(MemoError::CapabilityReleaseFailed {
            capability: Capability::Playback,
            ..
        })
    ));
    assert_eq!(h.controller.state(), RecordingState::BeforeRecording);
    assert_eq!(h.display.last().as_deref(), Some(ZERO_ELAPSED));
    assert!(h.visualization.levels().is_empty());
    assert_eq!(h.playback.open_handles(), 0);
    assert_eq!(
        h.journal.entries(),
        vec![
            "playback:close".to_string(),
            format!("display:{ZERO_ELAPSED}"),
            "visualization:clear".to_string(),
            "state:BeforeRecording".to_string(),
        ]
    );
    h.assert_consistent();
}

/// WHAT: A failing playback close during shutdown still stops everything
/// WHY: Exit must not leave the ticker or sampler running after a device error
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_playback_close_fails_when_shutting_down_then_error_returned_and_stopped() {
    // Given: Playback in progress with a device that fails to close
    let mut h = Harness::new();
    h.press().unwrap();
    h.press().unwrap();
    h.press().unwrap();
    h.playback.fail_close.store(true, Ordering::SeqCst);

    // When: Shutting down
    let result = h.controller.shutdown();

    // Then: Error reported, nothing left open or running
    assert!(matches!(
        result,
        Err(MemoError::CapabilityReleaseFailed { .. })
    ));
    assert_eq!(h.controller.state(), RecordingState::AfterRecording);
    assert_eq!(h.controller.open_handle(), None);
    assert!(!h.controller.ticker().is_running());
    assert!(!h.controller.sampler().is_running());
    h.assert_consistent();
}

/// WHAT: Shutdown releases an in-progress recording
/// WHY: Exiting must not leave the device or the file open
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_on_recording_when_shutdown_then_handle_released_and_processes_stopped() {
    // Given: A recording in progress
    let mut h = Harness::new();
    h.press().unwrap();

    // When: Shutting down
    h.controller.shutdown().unwrap();

    // Then: Nothing left open or running
    assert_eq!(h.capture.open_handles(), 0);
    assert_eq!(h.controller.state(), RecordingState::AfterRecording);
    h.assert_consistent();
}

/// WHAT: A new subscriber sees the current state immediately
/// WHY: The tray must render the right controls from the start
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_on_recording_when_subscribing_then_current_state_delivered() {
    // Given: A recording in progress
    let mut h = Harness::new();
    h.press().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    // When: Subscribing
    h.controller.subscribe(Box::new(move |state: RecordingState| {
        sink.lock().unwrap().push(state);
    }));

    // Then: The current state arrives right away
    assert_eq!(*seen.lock().unwrap(), vec![RecordingState::OnRecording]);
}
