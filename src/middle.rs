// The session layer. Owns the loaded sample, the drawn path, the capture
// session, and the status line; the tui renders whatever display_state()
// returns and main forwards the AudioCommands coming out of here to the
// render thread. All of the gating (can we draw, can we play, can we save)
// happens in this one place instead of in ambient globals.

use std::path::{Path, PathBuf};

use crate::audio::{CaptureFormat, CaptureSession, SampleId};
use crate::audio_api::{AudioCommand, CaptureMsg};
use crate::loader::sample_loader;
use crate::pipeline::path::SketchPath;
use crate::pipeline::persistence::SessionSettings;
use crate::pipeline::schedule;
use crate::shared::{DisplayState, InputEvent};

struct LoadedSample {
    id: SampleId,
    name: String,
    path: PathBuf,
    duration: f64,
}

pub struct Session {
    session_dir: PathBuf,
    sample_rate: u32,
    sample: Option<LoadedSample>,
    path: SketchPath,
    capture: Option<CaptureSession>,
    // absolute engine time at which the active capture stops; the deferred
    // stop is this one deadline checked by tick(), no ambient timers
    capture_deadline: Option<f64>,
    capturing: bool,
    tempo: f32,
    status: String,
}

impl Session {
    pub fn new(session_dir: PathBuf, sample_rate: u32) -> Self {
        Self {
            session_dir,
            sample_rate,
            sample: None,
            path: SketchPath::new(),
            capture: None,
            capture_deadline: None,
            capturing: false,
            tempo: 120.0,
            status: "load a sample (o), then draw with the mouse".into(),
        }
    }

    pub fn set_tempo(&mut self, tempo: f32) {
        self.tempo = tempo.clamp(30.0, 300.0);
    }

    /// Synced from the engine once per frame, display only.
    pub fn set_capturing(&mut self, capturing: bool) {
        self.capturing = capturing;
    }

    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            tempo: self.tempo,
            sample_path: self
                .sample
                .as_ref()
                .map(|s| s.path.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Decode a sample and hand back the registration command. A decode
    /// failure leaves no sample loaded, which disables play until a good
    /// file comes along; there is no retry.
    pub fn load_sample(&mut self, path: &Path) -> Option<AudioCommand> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match sample_loader::load(path, self.sample_rate) {
            Ok((id, buffer)) => {
                let duration = buffer.duration_seconds();
                self.sample = Some(LoadedSample {
                    id,
                    name: name.clone(),
                    path: path.to_path_buf(),
                    duration,
                });
                self.status = format!("loaded {name} ({duration:.2}s)");
                Some(AudioCommand::RegisterSample { id, buffer })
            }
            Err(e) => {
                self.sample = None;
                self.status = format!("could not decode {name}: {e}");
                None
            }
        }
    }

    /// Route one input event; `now` is the engine clock in seconds.
    pub fn handle_input(&mut self, event: InputEvent, now: f64) -> Vec<AudioCommand> {
        match event {
            InputEvent::PointerDown { x, y } => {
                if self.sample.is_none() {
                    self.status = "load a sample before drawing".into();
                    return vec![];
                }
                self.path.begin_stroke(x, y);
                vec![]
            }
            InputEvent::PointerMove { x, y } => {
                self.path.extend(x, y);
                vec![]
            }
            InputEvent::PointerUp | InputEvent::PointerLeave => {
                self.path.end_stroke();
                vec![]
            }
            InputEvent::Play => self.start_playback(now),
            InputEvent::Clear => self.clear(),
            InputEvent::Save => {
                self.export();
                vec![]
            }
            InputEvent::CycleSample => self.cycle_sample(),
            InputEvent::AdjustTempo(delta) => {
                // the tempo field is shown but feeds no timing math; the
                // x axis is absolute time (see DESIGN.md)
                self.set_tempo(self.tempo + delta);
                vec![]
            }
            InputEvent::Quit => vec![],
        }
    }

    /// Deferred capture stop, checked against the engine clock each frame.
    pub fn tick(&mut self, now: f64) -> Vec<AudioCommand> {
        if let Some(deadline) = self.capture_deadline {
            if now >= deadline {
                self.capture_deadline = None;
                return vec![AudioCommand::StopCapture];
            }
        }
        vec![]
    }

    /// Chunks and the finished notification coming back from the engine.
    pub fn on_capture_msg(&mut self, msg: CaptureMsg) {
        match msg {
            CaptureMsg::Block(frames) => {
                if let Some(capture) = &mut self.capture {
                    capture.append_block(&frames);
                }
            }
            CaptureMsg::Finished => {
                if let Some(capture) = &mut self.capture {
                    capture.finalize();
                    if capture.has_chunks() {
                        self.status = "take ready, press s to save".into();
                    }
                }
            }
        }
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            points: self.path.points().to_vec(),
            sample_name: self.sample.as_ref().map(|s| s.name.clone()),
            sample_duration: self.sample.as_ref().map_or(0.0, |s| s.duration),
            play_enabled: self.sample.is_some() && !self.path.is_empty(),
            save_enabled: self
                .capture
                .as_ref()
                .is_some_and(|c| c.is_finalized() && c.has_chunks()),
            capturing: self.capturing,
            tempo: self.tempo,
            status: self.status.clone(),
        }
    }

    fn start_playback(&mut self, now: f64) -> Vec<AudioCommand> {
        let Some(sample) = &self.sample else {
            self.status = "load a sample and draw something first".into();
            return vec![];
        };
        if self.path.is_empty() {
            self.status = "draw something first".into();
            return vec![];
        }

        // one epoch per play action; every event start is absolute from here
        let events = schedule::compile(self.path.points(), sample.duration, now);
        let deadline = schedule::capture_deadline(&events, now);

        let mut cmds = Vec::new();
        match CaptureFormat::negotiate() {
            Some(format) => {
                // a fresh take replaces whatever the previous play captured
                self.capture = Some(CaptureSession::new(format, self.sample_rate));
                self.capture_deadline = Some(deadline);
                cmds.push(AudioCommand::StartCapture);
                self.status = format!("playing {} events, recording", events.len());
            }
            None => {
                self.capture = None;
                self.capture_deadline = None;
                self.status =
                    format!("playing {} events (no capture format, saving disabled)", events.len());
            }
        }
        cmds.push(AudioCommand::Play { sample: sample.id, events });
        cmds
    }

    /// Wipe the path unconditionally and force-stop an active capture. The
    /// take finalizes with whatever chunks already arrived; voices from a
    /// prior play keep sounding, clear does not reach into the engine.
    fn clear(&mut self) -> Vec<AudioCommand> {
        self.path.clear();
        self.status = "cleared".into();
        if self.capture.as_ref().is_some_and(|c| !c.is_finalized()) {
            self.capture_deadline = None;
            return vec![AudioCommand::StopCapture];
        }
        vec![]
    }

    fn export(&mut self) {
        let Some(capture) = self.capture.as_mut() else {
            self.status = "nothing recorded, play something first".into();
            return;
        };
        if !capture.is_finalized() {
            self.status = "still recording, wait for the take to finish".into();
            return;
        }
        if !capture.has_chunks() {
            self.status = "recording is empty, play something first".into();
            return;
        }
        match capture.export(&self.session_dir) {
            Ok(path) => {
                self.status = format!("saved {}", path.display());
                // chunks are spent; drop the session so a stale re-export
                // is impossible
                self.capture = None;
            }
            Err(e) => self.status = format!("save failed: {e}"),
        }
    }

    fn cycle_sample(&mut self) -> Vec<AudioCommand> {
        let paths = match sample_loader::index_wav_in_dir(&self.session_dir) {
            Ok(paths) => paths,
            Err(e) => {
                self.status = format!("could not index {}: {e}", self.session_dir.display());
                return vec![];
            }
        };
        if paths.is_empty() {
            self.status = format!("no wav files in {}", self.session_dir.display());
            return vec![];
        }
        let next = match &self.sample {
            Some(s) => paths
                .iter()
                .position(|p| *p == s.path)
                .map_or(0, |i| (i + 1) % paths.len()),
            None => 0,
        };
        self.load_sample(&paths[next]).into_iter().collect()
    }
}
