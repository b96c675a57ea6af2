use ratatui::layout::Rect;

// State local to the tui. The view records where the canvas landed on screen
// each frame so the input side can map terminal mouse positions back into
// logical canvas coordinates.
#[derive(Clone, Copy, Debug, Default)]
pub struct TuiState {
    pub canvas_area: Option<Rect>,
}
