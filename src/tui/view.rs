use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::canvas::Canvas;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::shared::{CANVAS_HEIGHT, CANVAS_WIDTH, DisplayState};

use super::grid;
use super::mode::TuiState;

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &mut TuiState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // sample, tempo, status
            Constraint::Min(10),   // the canvas
            Constraint::Length(1), // key help
        ])
        .split(area);

    draw_header(frame, sections[0], state);
    draw_canvas(frame, sections[1], state, ts);
    draw_help(frame, sections[2], state);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sample = match &state.sample_name {
        Some(name) => format!("{name} ({:.2}s)", state.sample_duration),
        None => "none".to_string(),
    };
    let rec = if state.capturing { "   REC" } else { "" };
    let text = vec![
        Line::from(format!("sample: {sample}   tempo: {:.0}{rec}", state.tempo)),
        Line::from(state.status.clone()),
    ];
    let block = Block::default().borders(Borders::ALL).title("soundsketch");
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_canvas(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &mut TuiState) {
    let block = Block::default().borders(Borders::ALL);
    // remember where the drawing surface landed so mouse input can be mapped
    // back into logical coordinates
    ts.canvas_area = Some(block.inner(area));

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, CANVAS_WIDTH as f64])
        .y_bounds([0.0, CANVAS_HEIGHT as f64])
        .paint(|ctx| {
            grid::draw_grid(ctx);
            grid::draw_path(ctx, &state.points);
        });
    frame.render_widget(canvas, area);
}

fn draw_help(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let play = if state.play_enabled { "space play" } else { "space play (off)" };
    let save = if state.save_enabled { "s save" } else { "s save (off)" };
    let help = format!("draw with the mouse   {play}   c clear   {save}   o sample   [/] tempo   q quit");
    frame.render_widget(Paragraph::new(help), area);
}
