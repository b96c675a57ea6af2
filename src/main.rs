mod audio;
mod audio_api;
mod loader;
mod middle;
mod pipeline;
mod shared;
mod tui;

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use middle::Session;
use pipeline::persistence;
use shared::InputEvent;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    // drawing happens with the mouse, so capture it for the whole session
    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let audio = audio::start_audio()?;

    // the argument is either a sample file or the session directory
    let arg: Option<PathBuf> = std::env::args().nth(1).map(PathBuf::from);
    let (session_dir, initial_sample) = match arg {
        Some(path) if path.is_file() => {
            let dir = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            (dir, Some(path))
        }
        Some(path) => (path, None),
        None => (std::env::current_dir().unwrap_or_default(), None),
    };

    let settings = persistence::load_settings(&session_dir).unwrap_or_default();
    let mut session = Session::new(session_dir.clone(), audio.sample_rate());
    session.set_tempo(settings.tempo);

    // an explicit file argument wins over the previously used sample
    let remembered = (!settings.sample_path.is_empty())
        .then(|| PathBuf::from(&settings.sample_path))
        .filter(|p| p.exists());
    if let Some(path) = initial_sample.or(remembered) {
        if let Some(cmd) = session.load_sample(&path) {
            audio.send(cmd);
        }
    }

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = Duration::from_millis(16); // ~60fps
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        // sync engine state and drain the capture stream before drawing
        session.set_capturing(audio.is_capturing());
        while let Some(msg) = audio.poll_capture() {
            session.on_capture_msg(msg);
        }

        let ds = session.display_state();
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, &mut tui_state);
        })?;

        let events = tui::input::poll_input(tick_rate, &tui_state)?;
        let now = audio.clock_seconds();
        for event in events {
            if event == InputEvent::Quit {
                // remember the session settings before quitting
                let _ = persistence::save_settings(&session_dir, &session.settings());
                drop(term);
                drop(audio);
                return Ok(());
            }
            for cmd in session.handle_input(event, now) {
                audio.send(cmd);
            }
        }

        // deferred capture stop, keyed to the engine clock
        for cmd in session.tick(audio.clock_seconds()) {
            audio.send(cmd);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
        let _ = terminal::disable_raw_mode();
    }
}
