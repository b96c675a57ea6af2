use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::audio_api::{AudioCommand, CaptureMsg};

mod capture;
mod engine;
mod frame;
mod sample_buffer;
mod sample_id;
mod voice;

pub use capture::{CaptureFormat, CaptureSession};
pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;
pub use sample_id::{next_sample_id, SampleId};

use engine::Engine;

/// The interaction thread's view of the render thread: a command channel in,
/// a capture channel out, and two atomics mirroring the engine state.
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    capture_rx: Receiver<CaptureMsg>,
    clock_frames: Arc<AtomicU64>,
    capturing: Arc<AtomicBool>,
    sample_rate: u32,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.tx.try_send(cmd);
    }

    pub fn poll_capture(&self) -> Option<CaptureMsg> {
        self.capture_rx.try_recv().ok()
    }

    /// The engine's monotonic clock in seconds. This is the session clock:
    /// play epochs and capture deadlines are all measured against it.
    pub fn clock_seconds(&self) -> f64 {
        self.clock_frames.load(Ordering::Relaxed) as f64 / self.sample_rate as f64
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Relaxed)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(256);
    let (capture_tx, capture_rx) = crossbeam_channel::bounded::<CaptureMsg>(2048);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;

    let clock_frames = Arc::new(AtomicU64::new(0));
    let capturing = Arc::new(AtomicBool::new(false));

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream = build_output_stream_f32(
                &device,
                &config.into(),
                rx,
                capture_tx,
                channels,
                sample_rate,
                Arc::clone(&clock_frames),
                Arc::clone(&capturing),
            )?;
            output_stream.play().context("failed to play output stream")?;

            Ok(AudioHandle {
                tx,
                capture_rx,
                clock_frames,
                capturing,
                sample_rate,
                _output_stream: output_stream,
            })
        }
        _ => anyhow::bail!("unsupported sample format (only f32 supported for now)"),
    }
}

#[allow(clippy::too_many_arguments)]
fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    capture_tx: Sender<CaptureMsg>,
    channels: usize,
    sample_rate: u32,
    clock_frames: Arc<AtomicU64>,
    capturing: Arc<AtomicBool>,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(sample_rate);
    engine.set_capture_tx(capture_tx);

    let mut scratch: Vec<StereoFrame> = Vec::new();

    let err_fn = |err| eprintln!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels;
            scratch.clear();
            scratch.resize(n_frames, StereoFrame::zero());
            engine.render_block(&mut scratch);

            // fan the stereo mix out over however many channels the device has
            for (frame, out) in scratch.iter().zip(data.chunks_exact_mut(channels)) {
                out[0] = frame.left;
                if channels > 1 {
                    out[1] = frame.right;
                }
                for extra in out.iter_mut().skip(2) {
                    *extra = 0.0;
                }
            }

            clock_frames.store(engine.clock_frames(), Ordering::Relaxed);
            capturing.store(engine.is_capturing(), Ordering::Relaxed);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
