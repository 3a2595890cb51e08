use crate::dsp::{Oscillator, Ramp, Waveform};

use super::command::{CommandReceiver, ToneCommand, ToneId};

/// Per-tone gain before the master stage, so a full two-hand chord stays
/// below clipping.
pub const HEADROOM: f32 = 0.25;

/// Slots allocated up front. The bank never grows, so rendering and command
/// application never allocate.
pub const DEFAULT_CAPACITY: usize = 128;

struct ToneSlot {
    id: Option<ToneId>,
    osc: Oscillator,
    ramp: Ramp,
    stop_frame: Option<u64>,
}

impl ToneSlot {
    fn empty(waveform: Waveform) -> Self {
        Self {
            id: None,
            osc: Oscillator::new(waveform, 0.0),
            ramp: Ramp::new(),
            stop_frame: None,
        }
    }

    fn free(&mut self) {
        self.id = None;
        self.stop_frame = None;
        self.ramp.reset();
    }
}

/// Renders every live tone into a mono block.
///
/// The bank owns its own frame counter: a stop scheduled for engine time
/// `t` silences the tone at frame `round(t * sample_rate)`, sample-accurate
/// within the block.
pub struct ToneBank {
    sample_rate: f32,
    waveform: Waveform,
    master: f32,
    slots: Vec<ToneSlot>,
    frame: u64,
}

impl ToneBank {
    pub fn new(sample_rate: f32, waveform: Waveform) -> Self {
        Self::with_capacity(sample_rate, waveform, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(sample_rate: f32, waveform: Waveform, capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| ToneSlot::empty(waveform)).collect();

        Self {
            sample_rate: sample_rate.max(1.0),
            waveform,
            master: 1.0,
            slots,
            frame: 0,
        }
    }

    pub fn apply(&mut self, command: ToneCommand) {
        match command {
            ToneCommand::Create { id, frequency } => {
                let waveform = self.waveform;
                let Some(idx) = self.free_slot() else {
                    // Every slot is held: the new tone stays silent
                    return;
                };
                let slot = &mut self.slots[idx];
                slot.id = Some(id);
                slot.osc.retune(waveform, frequency);
                slot.ramp.reset();
                slot.stop_frame = None;
            }
            ToneCommand::Ramp {
                id,
                target,
                duration,
            } => {
                let sample_rate = self.sample_rate;
                if let Some(slot) = self.find(id) {
                    slot.ramp.ramp_to(target, duration, sample_rate);
                }
            }
            ToneCommand::Stop { id, at } => {
                let frame = (at.max(0.0) * self.sample_rate as f64).round() as u64;
                if let Some(slot) = self.find(id) {
                    slot.stop_frame = Some(frame);
                }
            }
            ToneCommand::SetMaster { level } => {
                self.master = level.clamp(0.0, 1.0);
            }
        }
    }

    /// Apply every pending command.
    pub fn drain<R: CommandReceiver>(&mut self, rx: &mut R) {
        while let Some(command) = rx.pop() {
            self.apply(command);
        }
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let start = self.frame;
        let sample_rate = self.sample_rate;

        for slot in self.slots.iter_mut().filter(|s| s.id.is_some()) {
            for (i, o) in out.iter_mut().enumerate() {
                if slot.stop_frame.is_some_and(|stop| start + i as u64 >= stop) {
                    slot.free();
                    break;
                }
                *o += slot.osc.next_sample(sample_rate) * slot.ramp.next_sample();
            }
        }

        let gain = self.master * HEADROOM;
        for o in out.iter_mut() {
            *o = (*o * gain).clamp(-1.0, 1.0);
        }

        self.frame += out.len() as u64;
    }

    /// Number of tones still producing (or scheduled to produce) sound.
    pub fn active_tones(&self) -> usize {
        self.slots.iter().filter(|s| s.id.is_some()).count()
    }

    pub fn is_playing(&self, id: ToneId) -> bool {
        self.slots.iter().any(|s| s.id == Some(id))
    }

    /// Current ramp level of a tone, if it is still in the bank.
    pub fn tone_level(&self, id: ToneId) -> Option<f32> {
        self.slots
            .iter()
            .find(|s| s.id == Some(id))
            .map(|s| s.ramp.level())
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn master(&self) -> f32 {
        self.master
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Applies to tones created after the call.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// An empty slot, else the one whose scheduled stop comes first.
    fn free_slot(&self) -> Option<usize> {
        if let Some(idx) = self.slots.iter().position(|s| s.id.is_none()) {
            return Some(idx);
        }
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| s.stop_frame.map(|stop| (idx, stop)))
            .min_by_key(|&(_, stop)| stop)
            .map(|(idx, _)| idx)
    }

    fn find(&mut self, id: ToneId) -> Option<&mut ToneSlot> {
        self.slots.iter_mut().find(|s| s.id == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn peak(buffer: &[f32]) -> f32 {
        buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn start_tone(bank: &mut ToneBank, id: u64, frequency: f32) {
        bank.apply(ToneCommand::Create {
            id: ToneId(id),
            frequency,
        });
        bank.apply(ToneCommand::Ramp {
            id: ToneId(id),
            target: 1.0,
            duration: 0.01,
        });
    }

    #[test]
    fn new_tone_starts_silent() {
        let mut bank = ToneBank::new(SAMPLE_RATE, Waveform::Square);
        bank.apply(ToneCommand::Create {
            id: ToneId(1),
            frequency: 100.0,
        });

        let mut buffer = vec![0.0; 64];
        bank.render_block(&mut buffer);
        assert_eq!(peak(&buffer), 0.0);
        assert_eq!(bank.active_tones(), 1);
    }

    #[test]
    fn ramped_tone_produces_sound() {
        let mut bank = ToneBank::new(SAMPLE_RATE, Waveform::Square);
        start_tone(&mut bank, 1, 100.0);

        let mut buffer = vec![0.0; 64];
        bank.render_block(&mut buffer);
        assert!((peak(&buffer) - HEADROOM).abs() < 1e-6);
    }

    #[test]
    fn stop_frees_slot_at_scheduled_frame() {
        let mut bank = ToneBank::new(SAMPLE_RATE, Waveform::Square);
        start_tone(&mut bank, 1, 100.0);
        bank.apply(ToneCommand::Stop {
            id: ToneId(1),
            at: 0.032,
        });

        let mut buffer = vec![0.0; 64];
        bank.render_block(&mut buffer);

        assert!(!bank.is_playing(ToneId(1)));
        assert!(buffer[31].abs() > 0.0);
        assert!(buffer[32..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn master_scales_output() {
        let mut bank = ToneBank::new(SAMPLE_RATE, Waveform::Square);
        start_tone(&mut bank, 1, 100.0);
        bank.apply(ToneCommand::SetMaster { level: 0.5 });

        let mut buffer = vec![0.0; 64];
        bank.render_block(&mut buffer);
        assert!((peak(&buffer) - 0.5 * HEADROOM).abs() < 1e-6);
    }

    #[test]
    fn full_bank_reuses_earliest_stopping_slot() {
        let mut bank = ToneBank::with_capacity(SAMPLE_RATE, Waveform::Sine, 2);
        start_tone(&mut bank, 0, 200.0);
        start_tone(&mut bank, 1, 300.0);
        bank.apply(ToneCommand::Stop { id: ToneId(1), at: 0.5 });
        bank.apply(ToneCommand::Stop { id: ToneId(0), at: 0.9 });

        start_tone(&mut bank, 2, 400.0);

        assert_eq!(bank.capacity(), 2);
        assert!(bank.is_playing(ToneId(0)));
        assert!(!bank.is_playing(ToneId(1)));
        assert!(bank.is_playing(ToneId(2)));
    }

    #[test]
    fn full_bank_of_held_tones_never_grows() {
        let mut bank = ToneBank::with_capacity(SAMPLE_RATE, Waveform::Sine, 2);
        for id in 0..5 {
            start_tone(&mut bank, id, 200.0 + id as f32);
        }

        assert_eq!(bank.capacity(), 2);
        assert_eq!(bank.active_tones(), 2);
        assert!(!bank.is_playing(ToneId(4)));
    }

    #[test]
    fn commands_for_unknown_tones_are_ignored() {
        let mut bank = ToneBank::new(SAMPLE_RATE, Waveform::Sine);
        bank.apply(ToneCommand::Stop {
            id: ToneId(42),
            at: 0.0,
        });
        bank.apply(ToneCommand::Ramp {
            id: ToneId(42),
            target: 1.0,
            duration: 0.1,
        });
        assert_eq!(bank.active_tones(), 0);
    }
}
