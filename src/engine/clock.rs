use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Frame counter written by the audio thread and read by the control thread.
#[derive(Debug, Clone, Default)]
pub struct SharedClock {
    frames: Arc<AtomicU64>,
}

impl SharedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, frames: u64) {
        self.frames.store(frames, Ordering::Release);
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn seconds(&self, sample_rate: f32) -> f64 {
        self.frames() as f64 / sample_rate as f64
    }
}
