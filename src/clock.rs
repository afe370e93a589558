//! Monotonic time sources.
//!
//! Every note event is stamped with the clock's `now()` in seconds. The audio
//! callback owns the notion of time: it advances a [`FrameClock`] after each
//! rendered block, so controllers running on other threads always schedule
//! relative to what the renderer has actually produced.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// A monotonic source of "now", in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Clock driven by the number of frames rendered so far.
///
/// Clones share the same counter, so one copy can live in the audio callback
/// while another is held by the instrument.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frames: Arc<AtomicU64>,
    sample_rate: f64,
}

impl FrameClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Record that `frames` more frames have been rendered.
    pub fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::Release);
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }
}

impl Clock for FrameClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate
    }
}

/// Clock that only moves when told to. Used for offline rendering and tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.seconds.store(seconds.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.seconds.load(Ordering::Acquire))
    }
}
