use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{engine::ToneEngine, input::InputId};

use super::{
    config::InstrumentConfig,
    registry::{EnvelopeTimes, VoiceRegistry},
    sustain::{SustainPedal, SustainState},
    voice::{VoiceHandle, VoiceState},
};

/// The playable instrument: voices, the sustain pedal, and which input
/// currently owns which voice.
///
/// All methods run on one thread of control and complete synchronously.
/// None of them fail: stray or duplicate events degrade to no-ops and
/// out-of-range volumes are clamped.
pub struct Instrument<E: ToneEngine> {
    voices: VoiceRegistry<E>,
    pedal: SustainPedal,
    bindings: HashMap<InputId, VoiceHandle>,
}

impl<E: ToneEngine> Instrument<E> {
    pub fn new(engine: E, config: &InstrumentConfig) -> Self {
        let mut instrument = Self {
            voices: VoiceRegistry::new(engine, EnvelopeTimes::from(config)),
            pedal: SustainPedal::new(),
            bindings: HashMap::new(),
        };
        instrument.set_master_volume(config.master_volume);
        instrument
    }

    /// Start a tone for `input`, unless that input already has one.
    pub fn on_input_start(&mut self, input: InputId, frequency: f32) -> Option<VoiceHandle> {
        self.ensure_running();
        if let Some(existing) = self.bindings.get(&input) {
            debug!(%input, voice = %existing, "input already sounding, start ignored");
            return None;
        }
        if !frequency.is_finite() || frequency <= 0.0 {
            warn!(%input, frequency, "ignoring start with unplayable frequency");
            return None;
        }

        let handle = self.voices.start(frequency);
        self.bindings.insert(input, handle);
        Some(handle)
    }

    /// End `input`'s tone. The binding is dropped whether or not the voice
    /// keeps sounding under the pedal.
    pub fn on_input_end(&mut self, input: InputId) -> Option<VoiceHandle> {
        let handle = self.bindings.remove(&input)?;
        self.voices.request_stop(handle, self.pedal.state());
        Some(handle)
    }

    /// End every bound input, e.g. when focus is lost and key-ups will never arrive.
    pub fn end_all_inputs(&mut self) -> usize {
        let inputs: Vec<InputId> = self.bindings.keys().copied().collect();
        for &input in &inputs {
            self.on_input_end(input);
        }
        inputs.len()
    }

    /// Drive the momentary pedal: `true` while held, `false` on release.
    pub fn set_sustain(&mut self, active: bool) {
        if active {
            self.ensure_running();
            self.pedal.activate();
        } else {
            self.pedal.deactivate(&mut self.voices);
        }
    }

    pub fn sustain(&self) -> SustainState {
        self.pedal.state()
    }

    /// Set the master level, clamped to [0, 1]. NaN leaves it unchanged.
    pub fn set_master_volume(&mut self, level: f32) {
        if level.is_nan() {
            return;
        }
        self.voices
            .engine_mut()
            .set_master_level(level.clamp(0.0, 1.0));
    }

    pub fn master_volume(&self) -> f32 {
        self.voices.engine().master_level()
    }

    /// Resume a suspended engine. Failure is logged and otherwise ignored;
    /// the next interaction tries again.
    pub fn ensure_running(&mut self) {
        let engine = self.voices.engine_mut();
        if !engine.is_suspended() {
            return;
        }
        match engine.resume() {
            Ok(()) => debug!("audio engine resumed"),
            Err(err) => warn!(%err, "audio engine could not resume"),
        }
    }

    /// Run the reaper. Call regularly (once per UI frame is plenty).
    pub fn tick(&mut self) -> usize {
        self.voices.reap()
    }

    pub fn bound_voice(&self, input: InputId) -> Option<VoiceHandle> {
        self.bindings.get(&input).copied()
    }

    pub fn voice_state(&self, handle: VoiceHandle) -> Option<VoiceState> {
        self.voices.state(handle)
    }

    pub fn held_inputs(&self) -> impl Iterator<Item = InputId> + '_ {
        self.bindings.keys().copied()
    }

    pub fn live_voices(&self) -> usize {
        self.voices.live_count()
    }

    pub fn voices(&self) -> &VoiceRegistry<E> {
        &self.voices
    }

    pub fn engine(&self) -> &E {
        self.voices.engine()
    }

    pub fn engine_mut(&mut self) -> &mut E {
        self.voices.engine_mut()
    }
}
