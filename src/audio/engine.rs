use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::audio_api::{AudioCommand, CaptureMsg};
use crate::pipeline::schedule::PlaybackEvent;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;
use super::voice::Voice;

/// Fixed boost applied to every voice. Short fragments read as quiet, so the
/// original tuning doubles them; dense overlap can clip because nothing
/// limits the sum, and that stays as documented behavior.
pub const PLAYBACK_GAIN: f32 = 2.0;

/// Runs inside the render callback. Owns the registered sample buffers, the
/// armed voices, the frame clock, and the capture tap.
pub struct Engine {
    sample_rate: u32,
    samples: HashMap<SampleId, Arc<SampleBuffer>>,
    voices: Vec<Voice>,
    clock_frames: u64,
    capturing: bool,
    capture_tx: Option<Sender<CaptureMsg>>,
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            samples: HashMap::new(),
            voices: Vec::new(),
            clock_frames: 0,
            capturing: false,
            capture_tx: None,
        }
    }

    pub fn set_capture_tx(&mut self, tx: Sender<CaptureMsg>) {
        self.capture_tx = Some(tx);
    }

    pub fn clock_frames(&self) -> u64 {
        self.clock_frames
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    #[cfg(test)]
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                // a new load replaces the store wholesale under a fresh id;
                // armed voices hold their own references, so in-flight audio
                // from the old buffer keeps sounding
                self.samples.clear();
                self.samples.insert(id, Arc::new(buffer));
            }
            AudioCommand::Play { sample, events } => self.arm(sample, &events),
            AudioCommand::StartCapture => {
                self.capturing = true;
            }
            AudioCommand::StopCapture => {
                if self.capturing {
                    self.capturing = false;
                    if let Some(tx) = &self.capture_tx {
                        let _ = tx.try_send(CaptureMsg::Finished);
                    }
                }
            }
        }
    }

    /// Arm one voice per event against the engine clock. An unknown sample id
    /// (never registered, or already replaced) arms nothing; a failed play is
    /// never allowed to take the session down.
    fn arm(&mut self, sample: SampleId, events: &[PlaybackEvent]) {
        let Some(buffer) = self.samples.get(&sample) else {
            return;
        };
        for event in events {
            let start_frame =
                (event.timeline_start * self.sample_rate as f64).round().max(0.0) as u64;
            self.voices.push(Voice::new(
                Arc::clone(buffer),
                start_frame,
                event.pitch_rate,
                PLAYBACK_GAIN,
                event.sample_offset_duration,
            ));
        }
    }

    /// Render one block, retire spent voices, advance the clock, and feed the
    /// capture tap with a copy of exactly what went out.
    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        for frame in out.iter_mut() {
            *frame = StereoFrame::zero();
        }

        let block_start = self.clock_frames;
        for voice in &mut self.voices {
            voice.render_into(block_start, out);
        }
        self.voices.retain(|v| v.is_active());
        self.clock_frames += out.len() as u64;

        if self.capturing {
            if let Some(tx) = &self.capture_tx {
                let _ = tx.try_send(CaptureMsg::Block(out.to_vec()));
            }
        }
    }
}
