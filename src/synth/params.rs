#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{FilterType, Waveform};
use crate::envelope::EnvelopeSettings;

/// One of the four ADSR fields, carrying its new value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopeParam {
    Attack(f64),
    Decay(f64),
    Sustain(f64),
    Release(f64),
}

impl EnvelopeParam {
    pub fn value(self) -> f64 {
        match self {
            EnvelopeParam::Attack(v)
            | EnvelopeParam::Decay(v)
            | EnvelopeParam::Sustain(v)
            | EnvelopeParam::Release(v) => v,
        }
    }

    pub fn apply(self, settings: &mut EnvelopeSettings) {
        match self {
            EnvelopeParam::Attack(v) => settings.attack_time = v,
            EnvelopeParam::Decay(v) => settings.decay_time = v,
            EnvelopeParam::Sustain(v) => settings.sustain_level = v,
            EnvelopeParam::Release(v) => settings.release_time = v,
        }
    }
}

/// A live change to the instrument's template settings.
///
/// Applies to notes started afterwards, and to sounding notes when they are
/// retriggered. [`AudioParam::MasterGain`] is the exception: it reaches the
/// output chain immediately.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioParam {
    Waveform(Waveform),
    AmpEnvelope(EnvelopeParam),
    FilterEnvelope(EnvelopeParam),
    FilterType(FilterType),
    FilterCutoff(f64),
    FilterResonance(f64),
    MasterGain(f64),
    Divisions(f64),
    BaseFrequency(f64),
    BaseMidiNote(u8),
}

impl AudioParam {
    /// Field name as shown in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            AudioParam::Waveform(_) => "waveform",
            AudioParam::AmpEnvelope(p) => match p {
                EnvelopeParam::Attack(_) => "amp_envelope.attack",
                EnvelopeParam::Decay(_) => "amp_envelope.decay",
                EnvelopeParam::Sustain(_) => "amp_envelope.sustain",
                EnvelopeParam::Release(_) => "amp_envelope.release",
            },
            AudioParam::FilterEnvelope(p) => match p {
                EnvelopeParam::Attack(_) => "filter_envelope.attack",
                EnvelopeParam::Decay(_) => "filter_envelope.decay",
                EnvelopeParam::Sustain(_) => "filter_envelope.sustain",
                EnvelopeParam::Release(_) => "filter_envelope.release",
            },
            AudioParam::FilterType(_) => "filter.type",
            AudioParam::FilterCutoff(_) => "filter.cutoff",
            AudioParam::FilterResonance(_) => "filter.resonance",
            AudioParam::MasterGain(_) => "master_gain",
            AudioParam::Divisions(_) => "tuning.divisions",
            AudioParam::BaseFrequency(_) => "tuning.base_frequency",
            AudioParam::BaseMidiNote(_) => "tuning.base_midi_note",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_param_writes_one_field() {
        let mut settings = EnvelopeSettings::adsr(0.1, 0.2, 0.5, 0.3);

        EnvelopeParam::Attack(1.5).apply(&mut settings);
        EnvelopeParam::Sustain(0.8).apply(&mut settings);

        assert_eq!(settings.attack_time, 1.5);
        assert_eq!(settings.decay_time, 0.2);
        assert_eq!(settings.sustain_level, 0.8);
        assert_eq!(settings.release_time, 0.3);
    }

    #[test]
    fn names_distinguish_envelopes() {
        let amp = AudioParam::AmpEnvelope(EnvelopeParam::Release(1.0));
        let filter = AudioParam::FilterEnvelope(EnvelopeParam::Release(1.0));

        assert_eq!(amp.name(), "amp_envelope.release");
        assert_eq!(filter.name(), "filter_envelope.release");
    }
}
