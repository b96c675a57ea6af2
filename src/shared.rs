// The fixed contract of the drawing surface, plus the types shared between
// the tui, the session layer, and main.
//
// The surface is an 800x400 logical canvas. Horizontal position is absolute
// time over a 10 second window, independent of the tempo field. Vertical
// position picks one of 24 semitone rows, bottom row anchored at C2, rows
// ascending toward the top of the canvas. Tests rely on these exact numbers.
//
// The rendering idea is the same as before: the session layer owns all of the
// interesting state, and the tui just draws whatever `display_state()` hands
// it on every frame.

pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 400.0;

pub const BASE_MIDI_NOTE: u8 = 36; // C2
pub const NUM_NOTES: usize = 24;
pub const TOTAL_SECONDS: f64 = 10.0;

pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One recorded pointer position on the logical canvas.
///
/// A path is a concatenation of strokes. Exactly the first point of each
/// stroke carries `stroke_start == true`; every continuation point appended
/// while the pointer stays down carries `false`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathPoint {
    pub x: f32,
    pub y: f32,
    pub stroke_start: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // pointer events, already mapped into logical canvas coordinates
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    PointerLeave,

    // transport and session keys
    Play,
    Clear,
    Save,
    CycleSample,
    AdjustTempo(f32),

    Quit,
}

/// Everything the tui needs to draw one frame.
#[derive(Clone, Debug)]
pub struct DisplayState {
    pub points: Vec<PathPoint>,
    pub sample_name: Option<String>,
    pub sample_duration: f64, // seconds, 0.0 while nothing is loaded
    pub play_enabled: bool,
    pub save_enabled: bool,
    pub capturing: bool,
    pub tempo: f32,
    pub status: String,
}
