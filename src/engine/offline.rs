use crate::dsp::Waveform;

use super::{
    bank::ToneBank,
    command::{ToneCommand, ToneId},
    EngineError, ToneEngine,
};

/// A tone engine whose clock only moves when it renders.
///
/// Calls go straight into the bank, so the state seen after `create_tone`
/// or `stop_tone` is exact. While suspended, `render` outputs silence and
/// time stands still.
pub struct OfflineEngine {
    bank: ToneBank,
    next_id: u64,
    suspended: bool,
    resume_count: usize,
}

impl OfflineEngine {
    pub fn new(sample_rate: f32, waveform: Waveform) -> Self {
        Self {
            bank: ToneBank::new(sample_rate, waveform),
            next_id: 0,
            suspended: false,
            resume_count: 0,
        }
    }

    /// Start blocked until the first `resume`, like an autoplay-gated context.
    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    pub fn render(&mut self, out: &mut [f32]) {
        if self.suspended {
            out.fill(0.0);
            return;
        }
        self.bank.render_block(out);
    }

    /// Render and discard `seconds` of audio. Returns the peak sample.
    pub fn advance(&mut self, seconds: f64) -> f32 {
        let mut frames = (seconds * self.bank.sample_rate() as f64).round() as usize;
        let mut block = [0.0f32; 256];
        let mut peak = 0.0f32;

        while frames > 0 {
            let n = frames.min(block.len());
            self.render(&mut block[..n]);
            peak = block[..n].iter().fold(peak, |acc, &x| acc.max(x.abs()));
            frames -= n;
        }

        peak
    }

    pub fn bank(&self) -> &ToneBank {
        &self.bank
    }

    pub fn resume_count(&self) -> usize {
        self.resume_count
    }
}

impl ToneEngine for OfflineEngine {
    type Tone = ToneId;

    fn current_time(&self) -> f64 {
        self.bank.time()
    }

    fn create_tone(&mut self, frequency: f32) -> ToneId {
        let id = ToneId(self.next_id);
        self.next_id += 1;
        self.bank.apply(ToneCommand::Create { id, frequency });
        id
    }

    fn ramp_amplitude(&mut self, tone: ToneId, target: f32, duration: f32) {
        self.bank.apply(ToneCommand::Ramp {
            id: tone,
            target,
            duration,
        });
    }

    fn stop_tone(&mut self, tone: ToneId, at: f64) {
        self.bank.apply(ToneCommand::Stop { id: tone, at });
    }

    fn master_level(&self) -> f32 {
        self.bank.master()
    }

    fn set_master_level(&mut self, level: f32) {
        self.bank.apply(ToneCommand::SetMaster { level });
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.suspended = false;
        self.resume_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_engine_holds_time() {
        let mut engine = OfflineEngine::new(1_000.0, Waveform::Sine).suspended();
        engine.advance(0.5);
        assert_eq!(engine.current_time(), 0.0);

        engine.resume().unwrap();
        engine.advance(0.5);
        assert!((engine.current_time() - 0.5).abs() < 1e-9);
        assert_eq!(engine.resume_count(), 1);
    }

    #[test]
    fn tone_ids_are_never_reused() {
        let mut engine = OfflineEngine::new(1_000.0, Waveform::Sine);
        let a = engine.create_tone(440.0);
        engine.stop_tone(a, 0.0);
        engine.advance(0.01);
        let b = engine.create_tone(440.0);
        assert_ne!(a, b);
    }
}
