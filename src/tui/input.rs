use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::shared::{CANVAS_HEIGHT, CANVAS_WIDTH, InputEvent};

use super::mode::TuiState;

// Poll for terminal input and resolve it into semantic input events. Mouse
// positions are translated from screen cells into logical canvas coordinates
// here, so everything downstream works in canvas units only.
pub fn poll_input(timeout: Duration, ts: &TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(handle_key(key.code)),
        Event::Mouse(mouse) => Ok(handle_mouse(mouse, ts)),
        _ => Ok(vec![]),
    }
}

fn handle_key(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::Play],
        KeyCode::Char('c') => vec![InputEvent::Clear],
        KeyCode::Char('s') => vec![InputEvent::Save],
        KeyCode::Char('o') => vec![InputEvent::CycleSample],

        // tempo knob; displayed but not consumed by the timing math
        KeyCode::Char('[') => vec![InputEvent::AdjustTempo(-5.0)],
        KeyCode::Char(']') => vec![InputEvent::AdjustTempo(5.0)],

        _ => vec![],
    }
}

fn handle_mouse(mouse: MouseEvent, ts: &TuiState) -> Vec<InputEvent> {
    let Some(area) = ts.canvas_area else {
        return vec![];
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            match to_canvas(area, mouse.column, mouse.row) {
                Some((x, y)) => vec![InputEvent::PointerDown { x, y }],
                None => vec![],
            }
        }
        // dragging off the canvas counts as the pointer leaving it
        MouseEventKind::Drag(MouseButton::Left) => {
            match to_canvas(area, mouse.column, mouse.row) {
                Some((x, y)) => vec![InputEvent::PointerMove { x, y }],
                None => vec![InputEvent::PointerLeave],
            }
        }
        MouseEventKind::Up(MouseButton::Left) => vec![InputEvent::PointerUp],
        _ => vec![],
    }
}

// Screen cell to logical canvas coordinates, sampling at the cell center.
// Canvas y grows downward, same as the terminal rows.
fn to_canvas(area: Rect, column: u16, row: u16) -> Option<(f32, f32)> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    let inside = column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height;
    if !inside {
        return None;
    }
    let x = ((column - area.x) as f32 + 0.5) / area.width as f32 * CANVAS_WIDTH;
    let y = ((row - area.y) as f32 + 0.5) / area.height as f32 * CANVAS_HEIGHT;
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_centers_map_into_the_canvas() {
        let area = Rect::new(2, 1, 80, 20);
        let (x, y) = to_canvas(area, 2, 1).unwrap();
        assert!((x - 5.0).abs() < 1e-3); // half a cell of 10 logical units
        assert!((y - 10.0).abs() < 1e-3);

        let (x, y) = to_canvas(area, 81, 20).unwrap();
        assert!((x - 795.0).abs() < 1e-3);
        assert!((y - 390.0).abs() < 1e-3);
    }

    #[test]
    fn positions_off_the_canvas_do_not_map() {
        let area = Rect::new(2, 1, 80, 20);
        assert!(to_canvas(area, 1, 5).is_none());
        assert!(to_canvas(area, 82, 5).is_none());
        assert!(to_canvas(area, 10, 0).is_none());
        assert!(to_canvas(area, 10, 21).is_none());
    }
}
