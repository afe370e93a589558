//! Post-processing shared by every voice.
//!
//! Voices are summed into one buffer, which then runs through:
//!
//!   highpass (rumble / DC) → lowpass (aliasing hiss) → limiter → master gain
//!
//! The limiter keeps a chord of loud voices from clipping the device. It has
//! an instantaneous attack so its output never exceeds the threshold, and a
//! smooth release so gain recovers without pumping.

use super::filter::SVFilter;

pub const ROLLOFF_LOW_HZ: f32 = 20.0;
pub const ROLLOFF_HIGH_HZ: f32 = 18_000.0;
pub const LIMITER_THRESHOLD: f32 = 0.95;
const LIMITER_RELEASE_SECONDS: f32 = 0.05;

#[derive(Debug, Clone)]
pub struct Limiter {
    threshold: f32,
    gain: f32,
}

impl Limiter {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            gain: 1.0,
        }
    }

    #[inline]
    pub fn process(&mut self, sample: f32, sample_rate: f32) -> f32 {
        let peak = sample.abs();
        let target = if peak * self.gain > self.threshold {
            self.threshold / peak
        } else {
            1.0
        };

        if target < self.gain {
            self.gain = target;
        } else {
            let coeff = 1.0 - (-1.0 / (LIMITER_RELEASE_SECONDS * sample_rate)).exp();
            self.gain += (target - self.gain) * coeff;
        }

        (sample * self.gain).clamp(-self.threshold, self.threshold)
    }

    /// Current gain reduction factor (1.0 = untouched).
    pub fn gain(&self) -> f32 {
        self.gain
    }
}

#[derive(Debug, Clone)]
pub struct OutputChain {
    highpass: SVFilter,
    lowpass: SVFilter,
    limiter: Limiter,
    master_gain: f32,
}

impl OutputChain {
    pub fn new(master_gain: f32) -> Self {
        Self {
            highpass: SVFilter::highpass(ROLLOFF_LOW_HZ),
            lowpass: SVFilter::lowpass(ROLLOFF_HIGH_HZ),
            limiter: Limiter::new(LIMITER_THRESHOLD),
            master_gain,
        }
    }

    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = gain;
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    pub fn process(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            let x = self.highpass.process(*sample, sample_rate);
            let x = self.lowpass.process(x, sample_rate);
            let x = self.limiter.process(x, sample_rate);
            *sample = x * self.master_gain;
        }
    }
}
