use std::path::{Path, PathBuf};

use crate::audio::{next_sample_id, SampleBuffer, SampleId};

// Decode a WAV from disk, ready for registration with the engine. Decoding
// happens here on the interaction thread, never in the render callback.
pub fn load(path: &Path, target_rate: u32) -> anyhow::Result<(SampleId, SampleBuffer)> {
    let id = next_sample_id();
    let buffer = SampleBuffer::load_wav(path, target_rate)?;
    Ok((id, buffer))
}

// WAV files directly inside `dir`, sorted by name. This is the whole "file
// picker": the sample key cycles through whatever is indexed here.
pub fn index_wav_in_dir(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}
