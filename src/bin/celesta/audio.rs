//! Output stream and the tone engine that drives it.

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Stream,
};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::{Consumer, RingBuffer};
use tracing::{error, info};

use celesta::{
    engine::{queued, EngineError, QueuedEngine, ToneId},
    InstrumentConfig, ToneEngine, MAX_BLOCK_SIZE,
};

/// Mono samples handed to the oscilloscope; oldest are dropped when full.
const SCOPE_QUEUE_SIZE: usize = 8192;

/// A queued engine whose stream stays paused until the first interaction.
pub struct StreamEngine {
    queued: QueuedEngine,
    stream: Stream,
    suspended: bool,
}

pub struct AudioOutput {
    pub engine: StreamEngine,
    pub scope_rx: Consumer<f32>,
    pub sample_rate: f32,
    pub channels: usize,
}

/// Open the default output device with a paused stream.
pub fn open(config: &InstrumentConfig) -> EyreResult<AudioOutput> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!(EngineError::NoDevice))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = stream_config.sample_rate().0 as f32;
    let channels = stream_config.channels() as usize;
    info!(sample_rate, channels, waveform = %config.waveform, "opening output stream");

    let (engine, mut renderer) = queued::channel(sample_rate, config.waveform);
    let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE_SIZE);
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &stream_config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames_to_render];
                renderer.render_block(block);

                // Copy to output (mono to all channels)
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                    let _ = scope_tx.push(s);
                }

                frames_written += frames_to_render;
            }
        },
        |err| error!(%err, "audio stream error"),
        None,
    )?;
    stream.pause().wrap_err("failed to pause output stream")?;

    Ok(AudioOutput {
        engine: StreamEngine {
            queued: engine,
            stream,
            suspended: true,
        },
        scope_rx,
        sample_rate,
        channels,
    })
}

impl ToneEngine for StreamEngine {
    type Tone = ToneId;

    fn current_time(&self) -> f64 {
        self.queued.current_time()
    }

    fn create_tone(&mut self, frequency: f32) -> ToneId {
        self.queued.create_tone(frequency)
    }

    fn ramp_amplitude(&mut self, tone: ToneId, target: f32, duration: f32) {
        self.queued.ramp_amplitude(tone, target, duration)
    }

    fn stop_tone(&mut self, tone: ToneId, at: f64) {
        self.queued.stop_tone(tone, at)
    }

    fn master_level(&self) -> f32 {
        self.queued.master_level()
    }

    fn set_master_level(&mut self, level: f32) {
        self.queued.set_master_level(level)
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.stream
            .play()
            .map_err(|err| EngineError::Stream(err.to_string()))?;
        self.suspended = false;
        Ok(())
    }
}
