#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::params::AudioParam;
use super::tuning::Tuning;
use crate::dsp::{FilterType, Waveform};
use crate::envelope::EnvelopeSettings;
use crate::SynthError;

/// Cutoff the filter envelope releases toward, in Hz.
pub const FILTER_FLOOR_HZ: f64 = 20.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub filter_type: FilterType,
    pub cutoff_hz: f64,
    pub resonance: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            filter_type: FilterType::LowPass,
            cutoff_hz: 1000.0,
            resonance: 1.0,
        }
    }
}

/// Template settings every new voice is built from.
///
/// `filter_envelope` is expressed relative to the filter cutoff: its sustain
/// is a fraction of `filter.cutoff_hz`, and its peak is the cutoff itself.
/// [`Patch::filter_envelope_settings`] turns it into absolute Hz.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    pub waveform: Waveform,
    pub amp_envelope: EnvelopeSettings,
    pub filter: FilterSettings,
    pub filter_envelope: EnvelopeSettings,
    pub master_gain: f64,
    pub tuning: Tuning,
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            waveform: Waveform::Triangle,
            amp_envelope: EnvelopeSettings::adsr(0.5, 0.5, 0.1, 0.2),
            filter: FilterSettings::default(),
            filter_envelope: EnvelopeSettings::adsr(0.1, 0.2, 0.5, 0.5),
            master_gain: 0.3,
            tuning: Tuning::default(),
        }
    }
}

impl Patch {
    /// Filter envelope in Hz: peaks at the cutoff, sustains at a fraction of
    /// it and releases to [`FILTER_FLOOR_HZ`].
    pub fn filter_envelope_settings(&self) -> EnvelopeSettings {
        let cutoff = self.filter.cutoff_hz;
        let mut settings = self.filter_envelope;
        settings.sustain_level *= cutoff;
        settings
            .with_attack_final_level(cutoff)
            .with_end_value(FILTER_FLOOR_HZ)
    }

    /// Write one parameter into the template, rejecting values no voice can use.
    pub fn apply(&mut self, param: AudioParam) -> Result<(), SynthError> {
        match param {
            AudioParam::Waveform(waveform) => self.waveform = waveform,
            AudioParam::AmpEnvelope(p) => {
                check_envelope_value(&param, p.value())?;
                p.apply(&mut self.amp_envelope);
            }
            AudioParam::FilterEnvelope(p) => {
                check_envelope_value(&param, p.value())?;
                p.apply(&mut self.filter_envelope);
            }
            AudioParam::FilterType(filter_type) => self.filter.filter_type = filter_type,
            AudioParam::FilterCutoff(hz) => self.filter.cutoff_hz = positive(&param, hz)?,
            AudioParam::FilterResonance(q) => self.filter.resonance = positive(&param, q)?,
            AudioParam::MasterGain(gain) => {
                if !gain.is_finite() || gain < 0.0 {
                    return Err(invalid(&param, gain));
                }
                self.master_gain = gain;
            }
            AudioParam::Divisions(n) => self.tuning.divisions = positive(&param, n)?,
            AudioParam::BaseFrequency(hz) => self.tuning.base_frequency = positive(&param, hz)?,
            AudioParam::BaseMidiNote(note) => {
                if note > 127 {
                    return Err(invalid(&param, note as f64));
                }
                self.tuning.base_midi_note = note;
            }
        }
        Ok(())
    }

    /// Check fields that were set wholesale, e.g. from a configuration file.
    pub fn validate(&self) -> Result<(), SynthError> {
        let fields = [
            AudioParam::FilterCutoff(self.filter.cutoff_hz),
            AudioParam::FilterResonance(self.filter.resonance),
            AudioParam::MasterGain(self.master_gain),
            AudioParam::Divisions(self.tuning.divisions),
            AudioParam::BaseFrequency(self.tuning.base_frequency),
            AudioParam::BaseMidiNote(self.tuning.base_midi_note),
        ];

        let mut scratch = *self;
        fields.into_iter().try_for_each(|param| scratch.apply(param))
    }
}

fn invalid(param: &AudioParam, value: f64) -> SynthError {
    SynthError::InvalidParam {
        name: param.name(),
        value,
    }
}

fn positive(param: &AudioParam, value: f64) -> Result<f64, SynthError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(param, value))
    }
}

// Envelope fields are clamped when resolved; only reject what cannot be clamped sensibly.
fn check_envelope_value(param: &AudioParam, value: f64) -> Result<(), SynthError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(param, value))
    }
}
