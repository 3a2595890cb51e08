use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::Waveform, input::drag::DEFAULT_DRAG_SENSITIVITY};

/// Longest accepted `key_hold`, in seconds.
pub const MAX_KEY_HOLD: f32 = 5.0;

const DEFAULT_KEY_HOLD: f32 = 0.35;

/// Everything adjustable about how the instrument sounds and responds.
///
/// Durations are in seconds. Missing fields in a config file fall back to
/// the defaults below.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentConfig {
    /// Ramp from silence to full level when a tone starts.
    pub attack: f32,
    /// Fade-out when an input ends with the pedal up.
    pub release: f32,
    /// Fade-out for tones let go when the pedal lifts.
    pub pedal_release: f32,
    /// Extra time after a release before the tone is stopped and reaped.
    pub stop_tail: f32,
    /// Initial master level, 0.0 to 1.0.
    pub master_volume: f32,
    pub waveform: Waveform,
    /// Volume change per unit of vertical drag.
    pub drag_sensitivity: f32,
    /// How long a key counts as held when the terminal cannot report key release.
    pub key_hold: f32,
}

impl InstrumentConfig {
    pub fn new() -> Self {
        Self {
            attack: 0.03,
            release: 0.2,
            pedal_release: 0.3,
            stop_tail: 0.05,
            master_volume: 0.7,
            waveform: Waveform::Sine,
            drag_sensitivity: DEFAULT_DRAG_SENSITIVITY,
            key_hold: DEFAULT_KEY_HOLD,
        }
    }

    pub fn with_attack(mut self, seconds: f32) -> Self {
        self.attack = seconds;
        self
    }

    pub fn with_release(mut self, seconds: f32) -> Self {
        self.release = seconds;
        self
    }

    pub fn with_pedal_release(mut self, seconds: f32) -> Self {
        self.pedal_release = seconds;
        self
    }

    pub fn with_stop_tail(mut self, seconds: f32) -> Self {
        self.stop_tail = seconds;
        self
    }

    pub fn with_master_volume(mut self, level: f32) -> Self {
        self.master_volume = level;
        self
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_drag_sensitivity(mut self, per_unit: f32) -> Self {
        self.drag_sensitivity = per_unit;
        self
    }

    pub fn with_key_hold(mut self, seconds: f32) -> Self {
        self.key_hold = seconds;
        self
    }

    /// `key_hold` as a duration, clamped to `[0, MAX_KEY_HOLD]`. A
    /// non-finite value falls back to the default.
    pub fn key_hold_duration(&self) -> Duration {
        let seconds = if self.key_hold.is_finite() {
            self.key_hold.clamp(0.0, MAX_KEY_HOLD)
        } else {
            DEFAULT_KEY_HOLD
        };
        Duration::from_secs_f32(seconds)
    }
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = InstrumentConfig::new()
            .with_release(0.5)
            .with_waveform(Waveform::Triangle);
        assert_eq!(config.release, 0.5);
        assert_eq!(config.waveform, Waveform::Triangle);
        assert_eq!(config.attack, 0.03);
        assert_eq!(config.master_volume, 0.7);
    }

    #[test]
    fn key_hold_duration_stays_in_range() {
        let default = InstrumentConfig::new().key_hold_duration();
        assert_eq!(default, Duration::from_secs_f32(0.35));

        for seconds in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let config = InstrumentConfig::new().with_key_hold(seconds);
            assert_eq!(config.key_hold_duration(), default);
        }

        let huge = InstrumentConfig::new().with_key_hold(1e30);
        assert_eq!(huge.key_hold_duration(), Duration::from_secs_f32(MAX_KEY_HOLD));

        let negative = InstrumentConfig::new().with_key_hold(-1.0);
        assert_eq!(negative.key_hold_duration(), Duration::ZERO);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_keep_defaults() {
        let text = "release = 0.5\nwaveform = \"saw\"\n";
        let config: InstrumentConfig = toml::from_str(text).unwrap();

        assert_eq!(config.release, 0.5);
        assert_eq!(config.waveform, Waveform::Saw);
        assert_eq!(config.attack, 0.03);
        assert_eq!(config.master_volume, 0.7);
        assert_eq!(config.key_hold, 0.35);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn unknown_waveform_is_rejected() {
        let result = toml::from_str::<InstrumentConfig>("waveform = \"Sawtooth\"\n");
        assert!(result.is_err());

        let result = toml::from_str::<InstrumentConfig>("waveform = \"SAW\"\n");
        assert!(result.is_err(), "waveform names are lowercase");
    }
}
