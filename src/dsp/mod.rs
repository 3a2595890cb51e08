//! Low-level DSP primitives used by the tone engine.
//!
//! These components are allocation-free and realtime-safe, so the tone bank
//! can keep one of each per slot and run them inside the audio callback.

/// Phase-accumulator oscillator with selectable waveform.
pub mod oscillator;
/// Linear amplitude ramp used for attack and release.
pub mod ramp;

pub use oscillator::{Oscillator, Waveform};
pub use ramp::Ramp;
