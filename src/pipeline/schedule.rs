//! Schedule compiler: walks the recorded path pairwise and emits the playback
//! events a play action will arm, plus the capture deadline derived from them.
//!
//! Degenerate input never aborts a compile. A segment that is too short, an
//! event whose clamped content duration vanishes, or a bad pitch rate all
//! drop that single event and the walk continues.

use crate::pipeline::mapper;
use crate::shared::PathPoint;

/// Nominal timeline duration rendered for an isolated point or for the last
/// point of a stroke.
pub const TAP_TIMELINE_SECONDS: f64 = 0.1;

/// Durations at or below this count as no content at all.
pub const MIN_EVENT_SECONDS: f64 = 0.001;

/// Safety tail appended after the last event's end before capture stops.
pub const CAPTURE_TAIL_SECONDS: f64 = 0.2;

/// Capture window when a play action produced no events.
pub const EMPTY_CAPTURE_SECONDS: f64 = 0.1;

/// One scheduled playback of the loaded sample.
///
/// `timeline_start` is absolute engine time (the shared epoch of the play
/// action plus the point's timeline offset). `sample_offset_duration` is how
/// much buffer content the voice consumes, already clamped to the sample's
/// real length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackEvent {
    pub timeline_start: f64,
    pub sample_offset_duration: f64,
    pub pitch_rate: f32,
}

/// Compile a drawn path into playback events.
///
/// Each point `p1` is paired with its successor:
/// - successor continues the stroke: one continuous-segment event, pitched at
///   `p1` only, spanning the timeline distance between the two points;
/// - successor opens a new stroke: `p1` terminates its stroke and gets a tap;
/// - no successor: the final point overall gets the same tap treatment.
///
/// Events come out in non-decreasing `timeline_start` order along the path
/// walk, but consumers must not rely on that. Strokes overlap freely and the
/// resulting voices are meant to sound simultaneously.
pub fn compile(points: &[PathPoint], sample_duration: f64, epoch: f64) -> Vec<PlaybackEvent> {
    let mut events = Vec::new();

    for (i, p1) in points.iter().enumerate() {
        match points.get(i + 1) {
            Some(p2) if !p2.stroke_start => {
                let timeline_duration =
                    mapper::timeline_offset(p2.x) - mapper::timeline_offset(p1.x);
                if timeline_duration <= MIN_EVENT_SECONDS {
                    continue; // degenerate segment, dropped without a word
                }
                push_event(&mut events, p1, timeline_duration, sample_duration, epoch);
            }
            // p1 either closes its stroke (the successor starts a new one) or
            // is the last point of the whole path: render it as a short tap
            _ => push_event(&mut events, p1, TAP_TIMELINE_SECONDS, sample_duration, epoch),
        }
    }

    events
}

fn push_event(
    events: &mut Vec<PlaybackEvent>,
    p1: &PathPoint,
    timeline_duration: f64,
    sample_duration: f64,
    epoch: f64,
) {
    let pitch_rate = mapper::pitch_rate(p1.y);
    // The mapper clamps, so this is practically unreachable, but the rate
    // feeds a multiplicative duration and gets guarded here independently.
    if !pitch_rate.is_finite() || pitch_rate <= 0.0 {
        return;
    }

    // Content consumed from the buffer. A rate above 1.0 eats through the
    // sample faster than the timeline advances, and the buffer cannot supply
    // more content than it holds.
    let sample_offset_duration = (timeline_duration * pitch_rate as f64).min(sample_duration);
    if sample_offset_duration <= MIN_EVENT_SECONDS {
        return;
    }

    events.push(PlaybackEvent {
        timeline_start: epoch + mapper::timeline_offset(p1.x),
        sample_offset_duration,
        pitch_rate,
    });
}

/// Absolute engine time at which the capture session should stop: the latest
/// event end plus a safety tail, or a short fixed window past the epoch when
/// nothing survived compilation.
pub fn capture_deadline(events: &[PlaybackEvent], epoch: f64) -> f64 {
    let last_end = events
        .iter()
        .map(|e| e.timeline_start + e.sample_offset_duration)
        .fold(None, |acc: Option<f64>, end| {
            Some(acc.map_or(end, |a: f64| a.max(end)))
        });

    match last_end {
        Some(end) => end + CAPTURE_TAIL_SECONDS,
        None => epoch + EMPTY_CAPTURE_SECONDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::PathPoint;

    fn start(x: f32, y: f32) -> PathPoint {
        PathPoint { x, y, stroke_start: true }
    }

    fn cont(x: f32, y: f32) -> PathPoint {
        PathPoint { x, y, stroke_start: false }
    }

    #[test]
    fn empty_path_compiles_to_nothing() {
        let events = compile(&[], 2.0, 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn single_point_becomes_one_tap() {
        let events = compile(&[start(400.0, 400.0)], 2.0, 1.5);
        assert_eq!(events.len(), 1);
        let tap = events[0];
        // bottom row, rate 1.0, nominal 0.1s of content, start at epoch + 5s
        assert!((tap.pitch_rate - 1.0).abs() < 1e-6);
        assert!((tap.sample_offset_duration - 0.1).abs() < 1e-9);
        assert!((tap.timeline_start - 6.5).abs() < 1e-9);
    }

    #[test]
    fn diagonal_segment_scenario() {
        // 2s sample, A=(0,400) start, B=(400,200) continuation:
        // offset(A)=0, offset(B)=5, pitch at A's bottom row is 1.0, so the
        // segment wants 5s of content and clamps to the 2s the buffer holds.
        let events = compile(&[start(0.0, 400.0), cont(400.0, 200.0)], 2.0, 0.0);
        assert_eq!(events.len(), 2);

        let segment = events[0];
        assert!((segment.timeline_start - 0.0).abs() < 1e-9);
        assert!((segment.pitch_rate - 1.0).abs() < 1e-6);
        assert!((segment.sample_offset_duration - 2.0).abs() < 1e-9);

        // B is the last point overall and gets the tap treatment
        let tap = events[1];
        assert!((tap.timeline_start - 5.0).abs() < 1e-9);
        assert!((tap.pitch_rate - 2.0).abs() < 1e-6);
        assert!((tap.sample_offset_duration - 0.2).abs() < 1e-9);
    }

    #[test]
    fn zero_width_segment_emits_nothing_for_the_pair() {
        // p1 -> p2 spans no timeline at all, so the pair contributes no
        // segment event; only p2's terminal tap survives.
        let events = compile(&[start(300.0, 100.0), cont(300.0, 350.0)], 2.0, 0.0);
        assert_eq!(events.len(), 1);
        assert!((events[0].timeline_start - mapper::timeline_offset(300.0)).abs() < 1e-9);
        assert!((events[0].pitch_rate - mapper::pitch_rate(350.0)).abs() < 1e-6);
    }

    #[test]
    fn content_never_exceeds_the_sample() {
        let sample_duration = 0.75;
        let events = compile(&[start(0.0, 400.0), cont(800.0, 400.0)], sample_duration, 0.0);
        // a full-width segment at rate 1.0 wants 10s of content
        assert!((events[0].sample_offset_duration - sample_duration).abs() < 1e-9);
        for e in &events {
            assert!(e.sample_offset_duration <= sample_duration + 1e-12);
        }
    }

    #[test]
    fn stroke_boundary_taps_the_closing_point() {
        // two disjoint strokes: the first stroke's last point becomes a tap
        // because its successor opens a new stroke
        let points = [
            start(0.0, 400.0),
            cont(80.0, 400.0),
            start(400.0, 200.0),
            cont(480.0, 200.0),
        ];
        let events = compile(&points, 2.0, 0.0);
        // segment, tap(close of stroke 1), segment, tap(final point)
        assert_eq!(events.len(), 4);
        assert!((events[1].timeline_start - 1.0).abs() < 1e-9);
        assert!((events[1].sample_offset_duration - 0.1).abs() < 1e-9);
        assert!((events[3].timeline_start - 6.0).abs() < 1e-9);
    }

    #[test]
    fn starts_are_nondecreasing_within_a_stroke() {
        let points = [
            start(0.0, 100.0),
            cont(100.0, 120.0),
            cont(200.0, 140.0),
            cont(350.0, 90.0),
        ];
        let events = compile(&points, 3.0, 0.0);
        assert!(events.len() >= 3);
        for pair in events.windows(2) {
            assert!(pair[1].timeline_start >= pair[0].timeline_start);
        }
    }

    #[test]
    fn overlapping_strokes_keep_their_own_starts() {
        // a second stroke drawn over an earlier timeline region keeps its own
        // (earlier) start times; superposition is the consumer's business
        let points = [
            start(200.0, 100.0),
            cont(600.0, 100.0),
            start(0.0, 300.0),
            cont(400.0, 300.0),
        ];
        let events = compile(&points, 5.0, 0.0);
        assert_eq!(events.len(), 4);
        assert!((events[0].timeline_start - 2.5).abs() < 1e-9);
        assert!((events[2].timeline_start - 0.0).abs() < 1e-9);
        assert!(events[2].timeline_start < events[1].timeline_start);
    }

    #[test]
    fn tiny_sample_drops_the_tap() {
        // clamping to a sub-threshold sample duration kills the event
        let events = compile(&[start(100.0, 100.0)], 0.0005, 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn epoch_shifts_every_start_uniformly() {
        let points = [start(0.0, 400.0), cont(400.0, 400.0)];
        let at_zero = compile(&points, 2.0, 0.0);
        let shifted = compile(&points, 2.0, 7.25);
        assert_eq!(at_zero.len(), shifted.len());
        for (a, b) in at_zero.iter().zip(&shifted) {
            assert!((b.timeline_start - a.timeline_start - 7.25).abs() < 1e-9);
            assert_eq!(a.sample_offset_duration, b.sample_offset_duration);
            assert_eq!(a.pitch_rate, b.pitch_rate);
        }
    }

    #[test]
    fn deadline_follows_the_latest_event_end() {
        let events = compile(&[start(0.0, 400.0), cont(400.0, 400.0)], 2.0, 1.0);
        // segment ends at 1.0 + 2.0, trailing tap ends at 6.0 + 0.1
        let deadline = capture_deadline(&events, 1.0);
        assert!((deadline - (6.0 + 0.1 + CAPTURE_TAIL_SECONDS)).abs() < 1e-9);
    }

    #[test]
    fn deadline_for_an_empty_schedule_is_a_short_window() {
        let deadline = capture_deadline(&[], 3.0);
        assert!((deadline - 3.1).abs() < 1e-9);
    }
}
