//! Tray icons drawn per recorder state.
//!
//! The icon shows the action the primary control performs next: a dot to
//! record, a square to stop, a triangle to play.

use voice_memo_core::{PrimaryControl, RecordingState};

use image::{Rgba, RgbaImage};

/// Icon edge length in pixels.
pub const ICON_SIZE: u32 = 32;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const IDLE_RED: Rgba<u8> = Rgba([200, 60, 60, 255]);
const LIVE_RED: Rgba<u8> = Rgba([235, 30, 30, 255]);
const PLAY_GREEN: Rgba<u8> = Rgba([40, 170, 80, 255]);

/// Draw the icon for `state`.
pub fn render_icon(state: RecordingState) -> RgbaImage {
    let color = match state {
        RecordingState::BeforeRecording => IDLE_RED,
        RecordingState::OnRecording => LIVE_RED,
        RecordingState::AfterRecording | RecordingState::OnPlaying => PLAY_GREEN,
    };

    let shape: fn(f32, f32) -> bool = match state.primary_control() {
        PrimaryControl::Record => in_dot,
        PrimaryControl::Stop => in_square,
        PrimaryControl::Play => in_triangle,
    };

    let size = ICON_SIZE as f32;
    RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        // Pixel centre in 0.0..1.0.
        let u = (x as f32 + 0.5) / size;
        let v = (y as f32 + 0.5) / size;
        if shape(u, v) { color } else { TRANSPARENT }
    })
}

fn in_dot(u: f32, v: f32) -> bool {
    let (dx, dy) = (u - 0.5, v - 0.5);
    dx * dx + dy * dy <= 0.38 * 0.38
}

fn in_square(u: f32, v: f32) -> bool {
    (0.2..=0.8).contains(&u) && (0.2..=0.8).contains(&v)
}

fn in_triangle(u: f32, v: f32) -> bool {
    // Right-pointing, left edge at u = 0.22, apex at (0.85, 0.5).
    if !(0.22..=0.85).contains(&u) {
        return false;
    }
    let half_height = 0.32 * (0.85 - u) / (0.85 - 0.22);
    (v - 0.5).abs() <= half_height
}
