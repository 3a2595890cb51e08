use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

use crate::dsp::Waveform;

use super::{
    bank::ToneBank,
    clock::SharedClock,
    command::{ToneCommand, ToneId},
    EngineError, ToneEngine,
};

pub const COMMAND_QUEUE_SIZE: usize = 256;

/// Control-thread half of a queued engine.
///
/// Every engine call becomes a [`ToneCommand`] pushed into a wait-free ring.
/// Time is read back from the frame counter the audio thread publishes.
pub struct QueuedEngine {
    tx: Producer<ToneCommand>,
    clock: SharedClock,
    sample_rate: f32,
    next_id: u64,
    master: f32,
}

/// Audio-thread half: owns the tone bank and the receiving end of the ring.
pub struct ToneRenderer {
    bank: ToneBank,
    rx: Consumer<ToneCommand>,
    clock: SharedClock,
}

/// Split a tone engine across the control and audio threads.
pub fn channel(sample_rate: f32, waveform: Waveform) -> (QueuedEngine, ToneRenderer) {
    channel_with_capacity(sample_rate, waveform, COMMAND_QUEUE_SIZE)
}

pub fn channel_with_capacity(
    sample_rate: f32,
    waveform: Waveform,
    queue_size: usize,
) -> (QueuedEngine, ToneRenderer) {
    let (tx, rx) = RingBuffer::<ToneCommand>::new(queue_size);
    let clock = SharedClock::new();
    let bank = ToneBank::new(sample_rate, waveform);

    let engine = QueuedEngine {
        tx,
        clock: clock.clone(),
        sample_rate: bank.sample_rate(),
        next_id: 0,
        master: bank.master(),
    };
    let renderer = ToneRenderer { bank, rx, clock };

    (engine, renderer)
}

impl QueuedEngine {
    pub fn push(&mut self, command: ToneCommand) -> Result<(), EngineError> {
        self.tx
            .push(command)
            .map_err(|_| EngineError::QueueFull(command))
    }

    fn send(&mut self, command: ToneCommand) {
        if let Err(err) = self.push(command) {
            warn!(%err, "audio thread is not keeping up");
        }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl ToneEngine for QueuedEngine {
    type Tone = ToneId;

    fn current_time(&self) -> f64 {
        self.clock.seconds(self.sample_rate)
    }

    fn create_tone(&mut self, frequency: f32) -> ToneId {
        let id = ToneId(self.next_id);
        self.next_id += 1;
        self.send(ToneCommand::Create { id, frequency });
        id
    }

    fn ramp_amplitude(&mut self, tone: ToneId, target: f32, duration: f32) {
        self.send(ToneCommand::Ramp {
            id: tone,
            target,
            duration,
        });
    }

    fn stop_tone(&mut self, tone: ToneId, at: f64) {
        self.send(ToneCommand::Stop { id: tone, at });
    }

    fn master_level(&self) -> f32 {
        self.master
    }

    fn set_master_level(&mut self, level: f32) {
        self.master = level.clamp(0.0, 1.0);
        let level = self.master;
        self.send(ToneCommand::SetMaster { level });
    }
}

impl ToneRenderer {
    /// Apply pending commands, render, then publish the new frame position.
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.bank.drain(&mut self.rx);
        self.bank.render_block(out);
        self.clock.store(self.bank.frame());
    }

    pub fn bank(&self) -> &ToneBank {
        &self.bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_reach_the_audio_side() {
        let (mut engine, mut renderer) = channel(1_000.0, Waveform::Square);
        let tone = engine.create_tone(100.0);
        engine.ramp_amplitude(tone, 1.0, 0.0);

        let mut buffer = vec![0.0; 100];
        renderer.render_block(&mut buffer);

        assert!(renderer.bank().is_playing(tone));
        assert!(buffer.iter().any(|s| s.abs() > 0.0));
        assert!((engine.current_time() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn full_queue_reports_dropped_command() {
        let (mut engine, _renderer) = channel_with_capacity(1_000.0, Waveform::Sine, 1);
        engine
            .push(ToneCommand::SetMaster { level: 0.1 })
            .unwrap();

        let err = engine
            .push(ToneCommand::SetMaster { level: 0.2 })
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::QueueFull(ToneCommand::SetMaster { .. })
        ));
    }

    #[test]
    fn master_level_is_tracked_locally() {
        let (mut engine, mut renderer) = channel(1_000.0, Waveform::Sine);
        engine.set_master_level(1.7);
        assert_eq!(engine.master_level(), 1.0);

        engine.set_master_level(0.4);
        let mut buffer = vec![0.0; 8];
        renderer.render_block(&mut buffer);
        assert_eq!(renderer.bank().master(), 0.4);
    }
}
