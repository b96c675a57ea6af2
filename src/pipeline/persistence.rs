// Session settings, loaded on startup and saved on quit. Only the small
// stuff survives a restart; drawn paths deliberately do not.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const SETTINGS_DIR: &str = ".soundsketch";
const SETTINGS_FILE: &str = "session.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSettings {
    pub tempo: f32,
    pub sample_path: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { tempo: 120.0, sample_path: String::new() }
    }
}

// <session_dir>/.soundsketch/session.json
fn settings_path(session_dir: &Path) -> PathBuf {
    session_dir.join(SETTINGS_DIR).join(SETTINGS_FILE)
}

pub fn load_settings(session_dir: &Path) -> Option<SessionSettings> {
    let path = settings_path(session_dir);
    let data = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data).ok()
}

// Save the settings, creating .soundsketch/ if it isn't there yet.
pub fn save_settings(session_dir: &Path, settings: &SessionSettings) -> anyhow::Result<()> {
    let path = settings_path(session_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json)?;
    Ok(())
}
