use tracing::debug;

use crate::engine::ToneEngine;

use super::registry::VoiceRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SustainState {
    #[default]
    Off,
    On,
}

/// A momentary sustain pedal: on while held, off the instant it is let go.
///
/// Pressing it changes no voice. Lifting it releases, in one step, every
/// voice whose input ended while it was down.
#[derive(Debug, Clone, Default)]
pub struct SustainPedal {
    state: SustainState,
}

impl SustainPedal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Press the pedal. Returns false if it was already down.
    pub fn activate(&mut self) -> bool {
        if self.state == SustainState::On {
            return false;
        }
        self.state = SustainState::On;
        debug!("sustain on");
        true
    }

    /// Lift the pedal and flush held voices. Returns how many were released,
    /// or `None` if the pedal was already up.
    pub fn deactivate<E: ToneEngine>(&mut self, voices: &mut VoiceRegistry<E>) -> Option<usize> {
        if self.state == SustainState::Off {
            return None;
        }
        self.state = SustainState::Off;
        let flushed = voices.flush_sustained();
        debug!(flushed, "sustain off");
        Some(flushed)
    }

    pub fn state(&self) -> SustainState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == SustainState::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dsp::Waveform,
        engine::OfflineEngine,
        synth::{registry::EnvelopeTimes, voice::VoiceState},
    };

    fn registry() -> VoiceRegistry<OfflineEngine> {
        VoiceRegistry::new(
            OfflineEngine::new(1_000.0, Waveform::Sine),
            EnvelopeTimes::default(),
        )
    }

    #[test]
    fn activate_twice_is_a_no_op() {
        let mut pedal = SustainPedal::new();
        assert!(pedal.activate());
        assert!(!pedal.activate());
        assert!(pedal.is_on());
    }

    #[test]
    fn deactivate_when_up_flushes_nothing() {
        let mut voices = registry();
        let held = voices.start(440.0);
        voices.request_stop(held, SustainState::On);

        let mut pedal = SustainPedal::new();
        assert_eq!(pedal.deactivate(&mut voices), None);
        assert_eq!(voices.state(held), Some(VoiceState::PendingRelease));
    }

    #[test]
    fn lifting_releases_all_pending_voices_at_once() {
        let mut voices = registry();
        let mut pedal = SustainPedal::new();
        pedal.activate();

        let a = voices.start(261.63);
        let b = voices.start(329.63);
        let still_held = voices.start(392.0);
        voices.request_stop(a, pedal.state());
        voices.request_stop(b, pedal.state());

        assert_eq!(pedal.deactivate(&mut voices), Some(2));
        assert_eq!(voices.state(a), Some(VoiceState::Releasing));
        assert_eq!(voices.state(b), Some(VoiceState::Releasing));
        assert_eq!(voices.state(still_held), Some(VoiceState::Attacking));

        let end_a = voices.get(a).unwrap().release_ends_at();
        let end_b = voices.get(b).unwrap().release_ends_at();
        assert_eq!(end_a, end_b);
    }
}
