//! Output capture: taps the rendered mix while a play action runs, keeps the
//! take as ordered chunks, and assembles them into a downloadable file on
//! demand.
//!
//! The recorder negotiates a container format from a preference list. The
//! compressed container is preferred but no encoder for it is compiled in, so
//! negotiation falls through to PCM WAV via hound. Should the whole list come
//! up empty, playback still proceeds and saving is disabled for that session.

use std::path::{Path, PathBuf};

use super::frame::StereoFrame;

pub const EXPORT_BASENAME: &str = "sketched_sound";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureFormat {
    /// Opus in a WebM container.
    WebmOpus,
    /// 16 bit PCM WAV.
    Wav,
}

impl CaptureFormat {
    const PREFERRED: [CaptureFormat; 2] = [CaptureFormat::WebmOpus, CaptureFormat::Wav];

    pub fn mime_type(self) -> &'static str {
        match self {
            CaptureFormat::WebmOpus => "audio/webm;codecs=opus",
            CaptureFormat::Wav => "audio/wav",
        }
    }

    /// File extension rule: `wav` whenever the mime type names WAV, `webm`
    /// for everything else.
    pub fn extension(self) -> &'static str {
        if self.mime_type().contains("wav") { "wav" } else { "webm" }
    }

    fn has_encoder(self) -> bool {
        match self {
            // no opus/webm muxer is wired into the build
            CaptureFormat::WebmOpus => false,
            CaptureFormat::Wav => true,
        }
    }

    /// First format in the preference list with a working encoder, or `None`
    /// when capture is unavailable altogether.
    pub fn negotiate() -> Option<CaptureFormat> {
        Self::PREFERRED.into_iter().find(|f| f.has_encoder())
    }
}

/// One recording take. Created when a play action begins, appended to while
/// the engine streams rendered blocks back, finalized by the deferred stop or
/// by an explicit clear, and drained by export.
#[derive(Clone, Debug)]
pub struct CaptureSession {
    format: CaptureFormat,
    sample_rate: u32,
    chunks: Vec<Vec<u8>>,
    finalized: bool,
}

impl CaptureSession {
    pub fn new(format: CaptureFormat, sample_rate: u32) -> Self {
        Self { format, sample_rate, chunks: Vec::new(), finalized: false }
    }

    pub fn format(&self) -> CaptureFormat {
        self.format
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn has_chunks(&self) -> bool {
        self.chunks.iter().any(|c| !c.is_empty())
    }

    /// Encode one rendered block and append it. Blocks arriving after the
    /// session is finalized (stragglers from the render thread) are dropped.
    pub fn append_block(&mut self, frames: &[StereoFrame]) {
        if self.finalized || frames.is_empty() {
            return;
        }
        let mut chunk = Vec::with_capacity(frames.len() * 4);
        for frame in frames {
            for sample in [frame.left, frame.right] {
                let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                chunk.extend_from_slice(&quantized.to_le_bytes());
            }
        }
        self.chunks.push(chunk);
    }

    /// Close the chunk sequence. Export stays possible afterwards, appending
    /// does not.
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    /// Assemble every chunk in arrival order into `sketched_sound.<ext>`
    /// under `dir`. The chunk sequence is cleared on success so a later
    /// export cannot re-emit stale data.
    pub fn export(&mut self, dir: &Path) -> anyhow::Result<PathBuf> {
        anyhow::ensure!(self.has_chunks(), "nothing captured");

        let path = dir.join(format!("{}.{}", EXPORT_BASENAME, self.format.extension()));
        match self.format {
            CaptureFormat::Wav => self.write_wav(&path)?,
            CaptureFormat::WebmOpus => anyhow::bail!("no webm encoder available"),
        }
        self.chunks.clear();
        Ok(path)
    }

    fn write_wav(&self, path: &Path) -> anyhow::Result<()> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for chunk in &self.chunks {
            for pair in chunk.chunks_exact(2) {
                writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
            }
        }
        writer.finalize()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiation_falls_back_to_wav() {
        // the preferred compressed container has no encoder in this build
        assert_eq!(CaptureFormat::negotiate(), Some(CaptureFormat::Wav));
    }

    #[test]
    fn extension_follows_the_mime_type() {
        assert_eq!(CaptureFormat::Wav.extension(), "wav");
        assert_eq!(CaptureFormat::WebmOpus.extension(), "webm");
    }

    #[test]
    fn blocks_become_ordered_chunks() {
        let mut session = CaptureSession::new(CaptureFormat::Wav, 44100);
        assert!(!session.has_chunks());

        session.append_block(&[StereoFrame::mono(0.5); 4]);
        session.append_block(&[StereoFrame::mono(-0.5); 2]);
        assert!(session.has_chunks());
        assert_eq!(session.chunks.len(), 2);
        // 4 frames * 2 channels * 2 bytes
        assert_eq!(session.chunks[0].len(), 16);
        assert_eq!(session.chunks[1].len(), 8);
    }

    #[test]
    fn finalize_stops_appends_but_not_export() {
        let mut session = CaptureSession::new(CaptureFormat::Wav, 44100);
        session.append_block(&[StereoFrame::mono(0.1); 8]);
        session.finalize();
        session.append_block(&[StereoFrame::mono(0.9); 8]);
        assert_eq!(session.chunks.len(), 1);
        assert!(session.is_finalized());
        assert!(session.has_chunks());
    }

    #[test]
    fn clipping_input_is_clamped_at_full_scale() {
        let mut session = CaptureSession::new(CaptureFormat::Wav, 44100);
        session.append_block(&[StereoFrame::mono(4.0), StereoFrame::mono(-4.0)]);
        let chunk = &session.chunks[0];
        let first = i16::from_le_bytes([chunk[0], chunk[1]]);
        let third = i16::from_le_bytes([chunk[4], chunk[5]]);
        assert_eq!(first, i16::MAX);
        assert_eq!(third, -i16::MAX);
    }

    #[test]
    fn export_writes_a_wav_and_clears_the_chunks() {
        let dir = std::env::temp_dir().join("soundsketch-capture-test");
        std::fs::create_dir_all(&dir).unwrap();

        let mut session = CaptureSession::new(CaptureFormat::Wav, 8000);
        session.append_block(&[StereoFrame::mono(0.25); 64]);
        session.finalize();

        let path = session.export(&dir).unwrap();
        assert!(path.ends_with("sketched_sound.wav"));

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.len(), 128); // 64 frames * 2 channels

        // a second export has nothing left to emit
        assert!(!session.has_chunks());
        assert!(session.export(&dir).is_err());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn export_without_chunks_is_refused() {
        let mut session = CaptureSession::new(CaptureFormat::Wav, 44100);
        session.finalize();
        assert!(session.export(&std::env::temp_dir()).is_err());
    }
}
