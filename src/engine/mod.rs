//! The tone engine: the seam between voice bookkeeping and sound.
//!
//! The voice registry only ever talks to a [`ToneEngine`]. It creates a tone,
//! ramps its amplitude, and schedules its stop. Two engines ship with the crate:
//!
//! - [`offline::OfflineEngine`] applies every call directly to a
//!   [`bank::ToneBank`] and only moves time forward when asked to render.
//!   Deterministic, used by tests and offline bounces.
//! - [`queued::QueuedEngine`] pushes [`command::ToneCommand`]s through a
//!   lock-free ring to a [`queued::ToneRenderer`] living in the audio callback.

pub mod bank;
pub mod clock;
pub mod command;
pub mod offline;
#[cfg(feature = "rtrb")]
pub mod queued;

use std::fmt;

use thiserror::Error;

pub use bank::ToneBank;
pub use clock::SharedClock;
pub use command::{ToneCommand, ToneId};
pub use offline::OfflineEngine;
#[cfg(feature = "rtrb")]
pub use queued::{QueuedEngine, ToneRenderer};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("audio stream error: {0}")]
    Stream(String),
    #[error("tone command queue is full, dropped {0:?}")]
    QueueFull(ToneCommand),
}

/// Platform audio the instrument plays through.
///
/// Times are in seconds on the engine's own clock (see [`current_time`]).
/// Amplitudes are linear in [0.0, 1.0].
///
/// [`current_time`]: ToneEngine::current_time
pub trait ToneEngine {
    type Tone: Copy + fmt::Debug;

    fn current_time(&self) -> f64;

    /// Create an oscillator at `frequency` Hz, sounding at zero amplitude.
    fn create_tone(&mut self, frequency: f32) -> Self::Tone;

    /// Ramp linearly from the tone's current level to `target` over `duration` seconds.
    fn ramp_amplitude(&mut self, tone: Self::Tone, target: f32, duration: f32);

    /// Stop generating sound at engine time `at`. The tone is gone afterwards.
    fn stop_tone(&mut self, tone: Self::Tone, at: f64);

    fn master_level(&self) -> f32;

    fn set_master_level(&mut self, level: f32);

    /// Engines that start blocked (autoplay policies, paused streams) report it here.
    fn is_suspended(&self) -> bool {
        false
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}
