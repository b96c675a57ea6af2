//! Geometry mappers: vertical canvas position to playback rate, horizontal
//! canvas position to a timeline offset.
//!
//! Pitch is quantized to the semitone lattice; time is continuous. Neither
//! mapper has an error path, out-of-range input is clamped, never rejected.

use crate::shared::{BASE_MIDI_NOTE, CANVAS_HEIGHT, CANVAS_WIDTH, NUM_NOTES, NOTE_NAMES, TOTAL_SECONDS};

/// Height of one semitone band in logical canvas units.
pub fn row_height() -> f32 {
    CANVAS_HEIGHT / NUM_NOTES as f32
}

/// Semitone row under a vertical canvas position. Row 0 is the bottom band
/// (the canvas y axis grows downward, so it gets inverted first), clamped to
/// the lattice.
pub fn row_at(y: f32) -> usize {
    let inverted = CANVAS_HEIGHT - y;
    let row = (inverted / row_height()).floor() as i32;
    row.clamp(0, NUM_NOTES as i32 - 1) as usize
}

/// Equal-tempered semitone-to-rate conversion: the clamped row index is added
/// to the base MIDI note and the distance from that base becomes the rate
/// exponent. Doubling the rate is +12 semitones.
pub fn pitch_rate(y: f32) -> f32 {
    let midi_note = BASE_MIDI_NOTE as i32 + row_at(y) as i32;
    let semitones = (midi_note - BASE_MIDI_NOTE as i32) as f32;
    2f32.powf(semitones / 12.0)
}

/// Linear map from horizontal canvas position onto the 10 second timeline,
/// floored at zero. No per-row quantization here.
pub fn timeline_offset(x: f32) -> f64 {
    ((x / CANVAS_WIDTH) as f64 * TOTAL_SECONDS).max(0.0)
}

/// Label for a lattice row, e.g. "C2" for the bottom row. Only used by the
/// grid rendering.
pub fn note_label(row: usize) -> String {
    let midi_note = BASE_MIDI_NOTE as usize + row;
    format!("{}{}", NOTE_NAMES[midi_note % 12], midi_note / 12)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_row_is_unshifted() {
        // y = 400 is the bottom edge, row 0, no pitch shift
        assert_eq!(row_at(CANVAS_HEIGHT), 0);
        assert!((pitch_rate(CANVAS_HEIGHT) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn top_row_is_23_semitones_up() {
        // y = 0 is the top edge, row 23, rate 2^(23/12)
        assert_eq!(row_at(0.0), NUM_NOTES - 1);
        let expected = 2f32.powf(23.0 / 12.0);
        assert!((pitch_rate(0.0) - expected).abs() < 1e-4);
        assert!((pitch_rate(0.0) - 3.568).abs() < 1e-3);
    }

    #[test]
    fn rate_is_monotonic_in_screen_height() {
        // higher on screen (smaller y) never lowers the pitch
        let mut previous = f32::INFINITY;
        let mut y = 0.0;
        while y <= CANVAS_HEIGHT {
            let rate = pitch_rate(y);
            assert!(rate.is_finite());
            assert!(rate <= previous, "rate rose while moving down at y={y}");
            assert!((1.0..=2f32.powf(23.0 / 12.0) + 1e-4).contains(&rate));
            previous = rate;
            y += 0.5;
        }
    }

    #[test]
    fn off_canvas_positions_are_clamped() {
        assert_eq!(row_at(-50.0), NUM_NOTES - 1);
        assert_eq!(row_at(CANVAS_HEIGHT + 50.0), 0);
        assert!((pitch_rate(-50.0) - pitch_rate(0.0)).abs() < 1e-6);
    }

    #[test]
    fn timeline_endpoints_and_monotonicity() {
        assert_eq!(timeline_offset(0.0), 0.0);
        assert!((timeline_offset(CANVAS_WIDTH) - TOTAL_SECONDS).abs() < 1e-9);
        let mut previous = -1.0;
        let mut x = 0.0;
        while x <= CANVAS_WIDTH {
            let t = timeline_offset(x);
            assert!(t >= previous);
            previous = t;
            x += 1.0;
        }
        // left of the canvas floors at zero rather than going negative
        assert_eq!(timeline_offset(-10.0), 0.0);
    }

    #[test]
    fn quarter_width_is_quarter_window() {
        assert!((timeline_offset(200.0) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn row_labels_match_the_lattice() {
        // midi 36 labels with octave 36 / 12 = 3, matching the grid header
        assert_eq!(note_label(0), "C3");
        assert_eq!(note_label(1), "C#3");
        assert_eq!(note_label(23), "B4");
    }
}
