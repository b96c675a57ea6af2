use std::sync::Arc;

use super::frame::{lerp, StereoFrame};
use super::sample_buffer::SampleBuffer;

/// One scheduled playback of the sample.
///
/// A voice is armed with an absolute engine frame and then left alone: it
/// consumes `[0, content_frames)` of its buffer at `rate` buffer frames per
/// output frame, boosted by a fixed gain, and deactivates itself when the
/// content runs out. The buffer reference is captured at arm time, so a
/// sample replaced later never affects a voice already in flight.
#[derive(Clone, Debug)]
pub struct Voice {
    buffer: Arc<SampleBuffer>,
    start_frame: u64,
    pos: f32,
    rate: f32,
    gain: f32,
    content_frames: f32,
    active: bool,
}

impl Voice {
    pub fn new(
        buffer: Arc<SampleBuffer>,
        start_frame: u64,
        rate: f32,
        gain: f32,
        content_seconds: f64,
    ) -> Self {
        let content_frames = (content_seconds * buffer.sample_rate as f64) as f32;
        let content_frames = content_frames.min(buffer.data.len() as f32);
        let active = content_frames > 0.0 && rate > 0.0 && rate.is_finite();
        Self {
            buffer,
            start_frame,
            pos: 0.0,
            rate,
            gain,
            content_frames,
            active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mix this voice into `out`, which covers the absolute engine frames
    /// `[block_start, block_start + out.len())`. A voice whose start lies
    /// beyond the block stays armed and untouched.
    pub fn render_into(&mut self, block_start: u64, out: &mut [StereoFrame]) {
        if !self.active {
            return;
        }
        let block_end = block_start + out.len() as u64;
        if self.start_frame >= block_end {
            return; // not due yet
        }
        let skip = self.start_frame.saturating_sub(block_start) as usize;

        let data = &self.buffer.data;
        for frame in out[skip..].iter_mut() {
            if self.pos >= self.content_frames {
                self.active = false;
                break;
            }
            let i = self.pos as usize;
            if i >= data.len() {
                self.active = false;
                break;
            }
            let frac = self.pos - i as f32;
            let s0 = data[i];
            let s1 = data.get(i + 1).copied().unwrap_or(s0);
            frame.accumulate(
                StereoFrame {
                    left: lerp(s0.left, s1.left, frac),
                    right: lerp(s0.right, s1.right, frac),
                },
                self.gain,
            );
            self.pos += self.rate;
        }
    }
}
