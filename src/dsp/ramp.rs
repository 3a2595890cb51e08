use crate::MIN_TIME;

/*
Linear Amplitude Ramp
=====================

The instrument's envelope is two straight lines: a short attack up to full
level when a tone starts, and a release down to silence when it ends.
Instead of a fixed ADSR shape, the ramp simply moves from wherever it is
now to a new target over a given time. Attack and release are then just
two calls:

    ramp_to(1.0, attack)     on tone start
    ramp_to(0.0, release)    on tone end

  Level
    1.0 ┐   ╱‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾╲
        │  ╱                 ╲
        │ ╱                   ╲
    0.0 └╱─────────────────────╲──→ Time
       attack     held       release

Retargeting mid-ramp starts from the CURRENT level, never jumps. Releasing
during the attack therefore fades out from wherever the attack got to,
which keeps very short taps click-free.


The Math
--------

At ramp_to() we snapshot the start level and convert the duration into a
sample count:

    total_samples = round(duration * sample_rate), at least 1

Each sample:

    elapsed += 1
    level = start + (target - start) * elapsed / total_samples

Interpolating from the snapshot (rather than adding a per-sample
increment) lands exactly on the target after total_samples, with no
accumulated float drift.
*/

#[derive(Debug, Clone)]
pub struct Ramp {
    level: f32,
    start: f32,
    target: f32,
    total_samples: u32,
    elapsed_samples: u32,
}

impl Ramp {
    /// A silent ramp resting at zero.
    pub fn new() -> Self {
        Self {
            level: 0.0,
            start: 0.0,
            target: 0.0,
            total_samples: 1,
            elapsed_samples: 1,
        }
    }

    /// Move linearly from the current level to `target` over `duration` seconds.
    pub fn ramp_to(&mut self, target: f32, duration: f32, sample_rate: f32) {
        self.start = self.level;
        self.target = target.clamp(0.0, 1.0);
        self.total_samples = if duration <= MIN_TIME {
            1
        } else {
            (duration * sample_rate).round().max(1.0) as u32
        };
        self.elapsed_samples = 0;
    }

    /// Advance by one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.elapsed_samples < self.total_samples {
            self.elapsed_samples += 1;
            self.level = if self.elapsed_samples == self.total_samples {
                self.target
            } else {
                let progress = self.elapsed_samples as f32 / self.total_samples as f32;
                (self.start + (self.target - self.start) * progress).clamp(0.0, 1.0)
            };
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Snap to silence with no ramp in progress.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_ramping(&self) -> bool {
        self.elapsed_samples < self.total_samples
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new()
    }
}
