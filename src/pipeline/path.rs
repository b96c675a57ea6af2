//! Stroke recorder: accumulates pointer input into an ordered point sequence.
//!
//! The recorder is a two-state machine, idle or drawing. A stroke opens on
//! pointer-down, grows on pointer-move, and ends on pointer-up or when the
//! pointer leaves the canvas. Several disjoint strokes accumulate into one
//! path until an explicit clear.

use crate::shared::PathPoint;

#[derive(Clone, Debug, Default)]
pub struct SketchPath {
    points: Vec<PathPoint>,
    drawing: bool,
}

impl SketchPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Open a new stroke at the given position. The gate on whether drawing
    /// is allowed at all (a sample must be loaded) lives in the session
    /// layer, the recorder itself accepts every stroke.
    pub fn begin_stroke(&mut self, x: f32, y: f32) {
        self.points.push(PathPoint { x, y, stroke_start: true });
        self.drawing = true;
    }

    /// Append a continuation point. Ignored while idle, so stray move events
    /// after pointer-up never corrupt the stroke structure.
    pub fn extend(&mut self, x: f32, y: f32) {
        if !self.drawing {
            return;
        }
        self.points.push(PathPoint { x, y, stroke_start: false });
    }

    pub fn end_stroke(&mut self) {
        self.drawing = false;
    }

    /// Wipe the whole sequence unconditionally, mid-stroke included.
    pub fn clear(&mut self) {
        self.points.clear();
        self.drawing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_structure_invariant_holds() {
        let mut path = SketchPath::new();
        path.begin_stroke(10.0, 20.0);
        path.extend(11.0, 21.0);
        path.extend(12.0, 22.0);
        path.end_stroke();
        path.begin_stroke(100.0, 200.0);
        path.extend(101.0, 201.0);
        path.end_stroke();

        let points = path.points();
        assert_eq!(points.len(), 5);
        // the first point of the sequence, and the first point after a stroke
        // boundary, are the only stroke starts
        let starts: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.stroke_start)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(starts, vec![0, 3]);
    }

    #[test]
    fn moves_while_idle_are_dropped() {
        let mut path = SketchPath::new();
        path.extend(5.0, 5.0);
        assert!(path.is_empty());

        path.begin_stroke(1.0, 1.0);
        path.end_stroke();
        path.extend(2.0, 2.0);
        assert_eq!(path.points().len(), 1);
    }

    #[test]
    fn clear_wipes_mid_stroke() {
        let mut path = SketchPath::new();
        path.begin_stroke(1.0, 1.0);
        path.extend(2.0, 2.0);
        assert!(path.is_drawing());
        path.clear();
        assert!(path.is_empty());
        assert!(!path.is_drawing());
    }
}
