use std::collections::BTreeMap;

use tracing::debug;

use crate::engine::ToneEngine;

use super::{
    config::InstrumentConfig,
    sustain::SustainState,
    voice::{Voice, VoiceEvent, VoiceHandle, VoiceState},
};

/// Attack and release timing applied to every voice, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeTimes {
    pub attack: f32,
    pub release: f32,
    pub pedal_release: f32,
    pub stop_tail: f32,
}

impl From<&InstrumentConfig> for EnvelopeTimes {
    fn from(config: &InstrumentConfig) -> Self {
        Self {
            attack: config.attack.max(0.0),
            release: config.release.max(0.0),
            pedal_release: config.pedal_release.max(0.0),
            stop_tail: config.stop_tail.max(0.0),
        }
    }
}

impl Default for EnvelopeTimes {
    fn default() -> Self {
        Self::from(&InstrumentConfig::default())
    }
}

/// Owns every sounding voice, from `start` until its release has run out.
///
/// Time comes from the engine. A voice whose scheduled stop has passed is
/// removed on the next [`reap`](VoiceRegistry::reap), never earlier, so
/// a releasing voice is still visible while it fades.
pub struct VoiceRegistry<E: ToneEngine> {
    engine: E,
    voices: BTreeMap<VoiceHandle, Voice<E::Tone>>,
    next_handle: u64,
    times: EnvelopeTimes,
}

impl<E: ToneEngine> VoiceRegistry<E> {
    pub fn new(engine: E, times: EnvelopeTimes) -> Self {
        Self {
            engine,
            voices: BTreeMap::new(),
            next_handle: 0,
            times,
        }
    }

    /// Create a tone at `frequency` and start its attack.
    pub fn start(&mut self, frequency: f32) -> VoiceHandle {
        let handle = VoiceHandle(self.next_handle);
        self.next_handle += 1;

        let now = self.engine.current_time();
        let tone = self.engine.create_tone(frequency);
        self.engine.ramp_amplitude(tone, 1.0, self.times.attack);

        self.voices.insert(
            handle,
            Voice::new(handle, frequency, tone, now, self.times.attack),
        );
        debug!(voice = %handle, frequency, live = self.voices.len(), "voice started");
        handle
    }

    /// The input behind `handle` has ended.
    ///
    /// With the pedal up the voice starts releasing; with it down the voice
    /// keeps sounding, marked for release when the pedal lifts. Unknown
    /// handles and voices already let go are ignored.
    pub fn request_stop(&mut self, handle: VoiceHandle, sustain: SustainState) {
        let Some(voice) = self.voices.get_mut(&handle) else {
            return;
        };
        if !voice.state().is_held() {
            return;
        }

        match sustain {
            SustainState::On => {
                voice.apply(VoiceEvent::InputEnded { pedal_down: true });
                debug!(voice = %handle, "voice held by sustain");
            }
            SustainState::Off => {
                let duration = self.times.release;
                begin_release(
                    &mut self.engine,
                    voice,
                    duration,
                    self.times.stop_tail,
                    VoiceEvent::InputEnded { pedal_down: false },
                );
            }
        }
    }

    /// Release every voice waiting on the pedal. Returns how many.
    pub fn flush_sustained(&mut self) -> usize {
        let duration = self.times.pedal_release;
        let tail = self.times.stop_tail;
        let mut flushed = 0;

        for voice in self
            .voices
            .values_mut()
            .filter(|v| v.state() == VoiceState::PendingRelease)
        {
            begin_release(
                &mut self.engine,
                voice,
                duration,
                tail,
                VoiceEvent::PedalLifted,
            );
            flushed += 1;
        }

        if flushed > 0 {
            debug!(flushed, "sustained voices released");
        }
        flushed
    }

    /// Advance time-driven transitions and drop voices whose stop has passed.
    /// Returns how many voices were removed.
    pub fn reap(&mut self) -> usize {
        let now = self.engine.current_time();

        for voice in self.voices.values_mut() {
            match voice.state() {
                VoiceState::Attacking if now >= voice.attack_ends_at() => {
                    voice.apply(VoiceEvent::AttackElapsed);
                }
                VoiceState::Releasing
                    if voice.release_ends_at().is_some_and(|end| now >= end) =>
                {
                    voice.apply(VoiceEvent::ReleaseElapsed);
                }
                _ => {}
            }
        }

        let before = self.voices.len();
        self.voices.retain(|_, v| v.state().is_sounding());
        let removed = before - self.voices.len();

        if removed > 0 {
            debug!(removed, live = self.voices.len(), "voices reaped");
        }
        removed
    }

    pub fn get(&self, handle: VoiceHandle) -> Option<&Voice<E::Tone>> {
        self.voices.get(&handle)
    }

    /// `None` for a handle this registry never issued; `Stopped` once reaped.
    pub fn state(&self, handle: VoiceHandle) -> Option<VoiceState> {
        match self.voices.get(&handle) {
            Some(voice) => Some(voice.state()),
            None if handle.0 < self.next_handle => Some(VoiceState::Stopped),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice<E::Tone>> {
        self.voices.values()
    }

    pub fn live_count(&self) -> usize {
        self.voices.len()
    }

    pub fn pending_count(&self) -> usize {
        self.voices
            .values()
            .filter(|v| v.state() == VoiceState::PendingRelease)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn times(&self) -> EnvelopeTimes {
        self.times
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

fn begin_release<E: ToneEngine>(
    engine: &mut E,
    voice: &mut Voice<E::Tone>,
    duration: f32,
    tail: f32,
    event: VoiceEvent,
) {
    let now = engine.current_time();
    let stop_at = now + (duration + tail) as f64;

    engine.ramp_amplitude(voice.tone(), 0.0, duration);
    engine.stop_tone(voice.tone(), stop_at);
    voice.set_release_end(stop_at);
    voice.apply(event);

    debug!(voice = %voice.handle(), stop_at, "voice releasing");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dsp::Waveform, engine::OfflineEngine};

    const SAMPLE_RATE: f32 = 1_000.0;

    fn registry() -> VoiceRegistry<OfflineEngine> {
        VoiceRegistry::new(
            OfflineEngine::new(SAMPLE_RATE, Waveform::Sine),
            EnvelopeTimes::default(),
        )
    }

    #[test]
    fn start_registers_attacking_voice() {
        let mut voices = registry();
        let handle = voices.start(440.0);

        assert_eq!(voices.live_count(), 1);
        assert_eq!(voices.state(handle), Some(VoiceState::Attacking));
        assert!(voices.engine().bank().is_playing(voices.get(handle).unwrap().tone()));
    }

    #[test]
    fn attack_settles_into_sustaining() {
        let mut voices = registry();
        let handle = voices.start(440.0);

        voices.engine_mut().advance(0.05);
        voices.reap();
        assert_eq!(voices.state(handle), Some(VoiceState::Sustaining));
    }

    #[test]
    fn release_keeps_voice_until_stop_passes() {
        let mut voices = registry();
        let handle = voices.start(440.0);
        voices.engine_mut().advance(0.1);

        voices.request_stop(handle, SustainState::Off);
        assert_eq!(voices.state(handle), Some(VoiceState::Releasing));

        // release 0.2 + tail 0.05
        voices.engine_mut().advance(0.2);
        assert_eq!(voices.reap(), 0);
        assert_eq!(voices.live_count(), 1);

        voices.engine_mut().advance(0.06);
        assert_eq!(voices.reap(), 1);
        assert_eq!(voices.state(handle), Some(VoiceState::Stopped));
        assert!(voices.is_empty());
        assert_eq!(voices.engine().bank().active_tones(), 0);
    }

    #[test]
    fn sustained_stop_defers_release() {
        let mut voices = registry();
        let handle = voices.start(440.0);

        voices.request_stop(handle, SustainState::On);
        assert_eq!(voices.state(handle), Some(VoiceState::PendingRelease));

        voices.engine_mut().advance(2.0);
        voices.reap();
        assert_eq!(voices.state(handle), Some(VoiceState::PendingRelease));
        assert_eq!(voices.pending_count(), 1);

        assert_eq!(voices.flush_sustained(), 1);
        assert_eq!(voices.state(handle), Some(VoiceState::Releasing));
        assert_eq!(voices.flush_sustained(), 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut voices = registry();
        let handle = voices.start(440.0);

        voices.request_stop(handle, SustainState::Off);
        let end = voices.get(handle).unwrap().release_ends_at();

        voices.engine_mut().advance(0.1);
        voices.request_stop(handle, SustainState::Off);
        voices.request_stop(handle, SustainState::On);
        assert_eq!(voices.get(handle).unwrap().release_ends_at(), end);
        assert_eq!(voices.state(handle), Some(VoiceState::Releasing));
    }

    #[test]
    fn unknown_handles_are_ignored() {
        let mut voices = registry();
        let stranger = VoiceHandle(99);

        voices.request_stop(stranger, SustainState::Off);
        assert_eq!(voices.state(stranger), None);
        assert!(voices.is_empty());
    }

    #[test]
    fn handles_are_not_reused() {
        let mut voices = registry();
        let first = voices.start(440.0);
        voices.request_stop(first, SustainState::Off);
        voices.engine_mut().advance(1.0);
        voices.reap();

        let second = voices.start(440.0);
        assert_ne!(first, second);
        assert_eq!(voices.state(first), Some(VoiceState::Stopped));
    }
}
