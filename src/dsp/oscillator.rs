#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::{f32::consts::TAU, fmt, str::FromStr};

/*
Phase-Accumulator Oscillator
============================

Every tone in the instrument is one of these: a phase that walks from 0.0
to 1.0 once per cycle, and a waveform function that turns the phase into
a sample.

    phase increment = frequency / sample_rate

At 440 Hz and 48 kHz the phase moves 0.00917 per sample, so one cycle
takes ~109 samples. The phase wraps back into [0, 1) after each step.

Waveforms
---------

  Sine      sin(2π·phase)                 pure, soft (the default)
  Triangle  1 - 4·|phase - 0.5|           mellow, weak odd harmonics
  Square    +1 below 0.5, -1 above        hollow, strong odd harmonics
  Saw       2·phase - 1                   bright, all harmonics

Square and saw are naive (not band-limited). At the pitches this
instrument plays (≤ 1.2 kHz) the aliasing stays well under the
fundamental.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Square,
    Saw,
}

impl Waveform {
    /// Sample the waveform at `phase` in [0, 1).
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Saw => 2.0 * phase - 1.0,
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Square => "square",
            Waveform::Saw => "saw",
        };
        f.write_str(name)
    }
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            "square" => Ok(Waveform::Square),
            "saw" | "sawtooth" => Ok(Waveform::Saw),
            other => Err(format!(
                "unknown waveform '{other}' (expected sine, triangle, square or saw)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            frequency: frequency.max(0.0),
            phase: 0.0,
        }
    }

    /// Restart at phase zero with a new pitch. Used when a slot is reused.
    pub fn retune(&mut self, waveform: Waveform, frequency: f32) {
        self.waveform = waveform;
        self.frequency = frequency.max(0.0);
        self.phase = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let out = self.waveform.sample(self.phase);
        self.phase += self.frequency / sample_rate;
        self.phase -= self.phase.floor();
        out
    }

    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let mut osc = Oscillator::new(Waveform::Sine, 440.0);

        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, sample_rate);

        // sample n should be sin(2pi f n / sr)
        let n = 12;
        let expected = (TAU * 440.0 * n as f32 / sample_rate).sin();
        assert!(
            (buffer[n] - expected).abs() < 1e-4,
            "expected {expected}, got {}",
            buffer[n]
        );
    }

    #[test]
    fn waveforms_stay_in_range() {
        for waveform in [
            Waveform::Sine,
            Waveform::Triangle,
            Waveform::Square,
            Waveform::Saw,
        ] {
            let mut osc = Oscillator::new(waveform, 1174.7);
            let mut buffer = vec![0.0f32; 4096];
            osc.render(&mut buffer, 44_100.0);
            assert!(
                buffer.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{waveform} left [-1, 1]"
            );
        }
    }

    #[test]
    fn parses_waveform_names() {
        assert_eq!("Sine".parse::<Waveform>(), Ok(Waveform::Sine));
        assert_eq!("sawtooth".parse::<Waveform>(), Ok(Waveform::Saw));
        assert!("organ".parse::<Waveform>().is_err());
    }
}
