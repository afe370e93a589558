#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MIN_LEVEL;

pub const DEFAULT_INITIAL_LEVEL: f64 = MIN_LEVEL;
pub const DEFAULT_ATTACK_FINAL_LEVEL: f64 = 1.0;
pub const DEFAULT_END_VALUE: f64 = MIN_LEVEL;

/// ADSR settings as supplied by a patch or a live parameter change.
///
/// The three optional levels fall back to defaults in [`EnvelopeSettings::resolve`],
/// which is the only place defaults are filled in.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSettings {
    /// Seconds from the initial level to the attack peak.
    pub attack_time: f64,
    /// Seconds from the attack peak to the sustain level.
    pub decay_time: f64,
    pub sustain_level: f64,
    /// Seconds from the level at gate close to the end value.
    pub release_time: f64,
    pub initial_level: Option<f64>,
    pub attack_final_level: Option<f64>,
    pub end_value: Option<f64>,
}

impl EnvelopeSettings {
    pub fn adsr(attack_time: f64, decay_time: f64, sustain_level: f64, release_time: f64) -> Self {
        Self {
            attack_time,
            decay_time,
            sustain_level,
            release_time,
            initial_level: None,
            attack_final_level: None,
            end_value: None,
        }
    }

    pub fn with_initial_level(mut self, level: f64) -> Self {
        self.initial_level = Some(level);
        self
    }

    pub fn with_attack_final_level(mut self, level: f64) -> Self {
        self.attack_final_level = Some(level);
        self
    }

    pub fn with_end_value(mut self, level: f64) -> Self {
        self.end_value = Some(level);
        self
    }

    /// Fill in defaults and clamp everything into the range the ramps accept.
    ///
    /// Levels are floored at [`MIN_LEVEL`] because the decay and release
    /// segments are exponential. Times are floored at zero.
    pub fn resolve(&self) -> EnvelopeShape {
        EnvelopeShape {
            initial_level: positive_level(self.initial_level.unwrap_or(DEFAULT_INITIAL_LEVEL)),
            attack_time: non_negative_time(self.attack_time),
            attack_final_level: positive_level(
                self.attack_final_level.unwrap_or(DEFAULT_ATTACK_FINAL_LEVEL),
            ),
            decay_time: non_negative_time(self.decay_time),
            sustain_level: positive_level(self.sustain_level),
            release_time: non_negative_time(self.release_time),
            end_value: positive_level(self.end_value.unwrap_or(DEFAULT_END_VALUE)),
        }
    }
}

/// Fully resolved envelope shape. Every level is strictly positive and every
/// time is finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    pub initial_level: f64,
    pub attack_time: f64,
    pub attack_final_level: f64,
    pub decay_time: f64,
    pub sustain_level: f64,
    pub release_time: f64,
    pub end_value: f64,
}

/// Floor a level for use as an exponential ramp endpoint. NaN maps to the floor.
pub(crate) fn positive_level(level: f64) -> f64 {
    if level.is_nan() {
        MIN_LEVEL
    } else {
        level.clamp(MIN_LEVEL, f64::MAX)
    }
}

fn non_negative_time(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}
