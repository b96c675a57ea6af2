use ratatui::style::Color;
use ratatui::widgets::canvas::{Context, Line as CanvasLine, Points};

use crate::pipeline::mapper;
use crate::shared::{CANVAS_HEIGHT, CANVAS_WIDTH, NUM_NOTES, PathPoint, TOTAL_SECONDS};

// The widget canvas has y growing upward, the logical canvas grows downward.
fn flip(y: f32) -> f64 {
    (CANVAS_HEIGHT - y) as f64
}

/// Second ticks along the time axis and one line per lattice row, with note
/// names on the left edge.
pub fn draw_grid(ctx: &mut Context) {
    let seconds = TOTAL_SECONDS as usize;
    for i in 0..=seconds {
        let x = i as f64 / TOTAL_SECONDS * CANVAS_WIDTH as f64;
        ctx.draw(&CanvasLine {
            x1: x,
            y1: 0.0,
            x2: x,
            y2: CANVAS_HEIGHT as f64,
            color: Color::DarkGray,
        });
        if i < seconds {
            ctx.print(x + 4.0, CANVAS_HEIGHT as f64 - 8.0, format!("{i}s"));
        }
    }

    let row_height = mapper::row_height() as f64;
    for row in 0..=NUM_NOTES {
        let y = row as f64 * row_height;
        ctx.draw(&CanvasLine {
            x1: 0.0,
            y1: y,
            x2: CANVAS_WIDTH as f64,
            y2: y,
            color: Color::DarkGray,
        });
        if row < NUM_NOTES {
            ctx.print(2.0, y + 2.0, mapper::note_label(row));
        }
    }
}

/// The drawn contour: connected lines inside each stroke, a dot for every
/// recorded point so isolated taps stay visible.
pub fn draw_path(ctx: &mut Context, points: &[PathPoint]) {
    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        if p2.stroke_start {
            continue; // stroke boundary, nothing connects across it
        }
        ctx.draw(&CanvasLine {
            x1: p1.x as f64,
            y1: flip(p1.y),
            x2: p2.x as f64,
            y2: flip(p2.y),
            color: Color::LightBlue,
        });
    }

    let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x as f64, flip(p.y))).collect();
    ctx.draw(&Points { coords: &coords, color: Color::LightBlue });
}
