pub mod dsp; // Oscillator and amplitude ramp
pub mod engine; // Tone engine seam and sample renderer
pub mod input; // Input identifiers, key map, drag-to-volume
pub mod synth; // Voice lifecycle, sustain pedal, input routing

pub use engine::{EngineError, ToneEngine};
pub use input::InputId;
pub use synth::{
    config::InstrumentConfig,
    instrument::Instrument,
    voice::{VoiceHandle, VoiceState},
};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
