use std::path::Path;

use super::frame::{lerp, StereoFrame};

/// The decoded sample. Immutable once registered with the engine; every voice
/// of a play action reads the same frames through a shared reference.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
    pub sample_rate: u32,
}

impl SampleBuffer {
    /// Decode a WAV file and bring it to the engine rate. Any decode problem
    /// surfaces as an error here and the caller decides what to disable.
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / full_scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let channels = spec.channels.max(1) as usize;
        let mut frames: Vec<StereoFrame> = if channels == 1 {
            samples.into_iter().map(StereoFrame::mono).collect()
        } else {
            // keep the first two channels, anything beyond is dropped
            samples
                .chunks_exact(channels)
                .map(|c| StereoFrame { left: c[0], right: c[1] })
                .collect()
        };

        if frames.is_empty() {
            anyhow::bail!("{} holds no audio frames", path.display());
        }

        if spec.sample_rate != target_rate {
            frames = resample_linear(&frames, spec.sample_rate, target_rate);
        }

        Ok(Self { data: frames, sample_rate: target_rate })
    }

    pub fn duration_seconds(&self) -> f64 {
        self.data.len() as f64 / self.sample_rate as f64
    }
}

// Linear resampler, same tradeoff as the loader has always made: good enough
// for short one-shot samples, not a mastering tool.
fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || frames.is_empty() {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = ((frames.len() as f64) * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos.floor() as usize;
        let frac = (src_pos - idx as f64) as f32;
        if idx + 1 >= frames.len() {
            out.push(*frames.last().unwrap_or(&StereoFrame::zero()));
        } else {
            let a = frames[idx];
            let b = frames[idx + 1];
            out.push(StereoFrame {
                left: lerp(a.left, b.left, frac),
                right: lerp(a.right, b.right, frac),
            });
        }
    }
    out
}
