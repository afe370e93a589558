#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Equal Divisions of the Octave
=============================

Standard tuning splits the octave into 12 equal steps (12-EDO). Nothing
about the maths requires 12: any number of equal logarithmic steps works.

    frequency(note) = base_frequency * 2 ^ ((note - base_note) / divisions)

  divisions = 12, base = 261.625 Hz at note 60   → conventional, C4 = 261.6 Hz
  divisions = 19, base = 261.625 Hz at note 60   → 19-EDO, note 79 is C5
  divisions = 24                                  → quarter tones

Moving `divisions` notes up from the base note always doubles the frequency.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub divisions: f64,
    pub base_frequency: f64,
    pub base_midi_note: u8,
}

impl Tuning {
    pub fn equal_divisions(divisions: f64, base_frequency: f64, base_midi_note: u8) -> Self {
        Self {
            divisions,
            base_frequency,
            base_midi_note,
        }
    }

    /// Frequency in Hz for a note identity.
    pub fn frequency(&self, note: u8) -> f64 {
        let steps = note as f64 - self.base_midi_note as f64;
        self.base_frequency * 2.0_f64.powf(steps / self.divisions)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::equal_divisions(12.0, 261.625, 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_note_gives_base_frequency() {
        let tuning = Tuning::default();
        assert!((tuning.frequency(60) - 261.625).abs() < 1e-9);
    }

    #[test]
    fn octave_up_doubles() {
        let tuning = Tuning::default();
        assert!((tuning.frequency(72) - 523.25).abs() < 1e-9);
        assert!((tuning.frequency(48) - 130.8125).abs() < 1e-9);
    }

    #[test]
    fn other_divisions_double_after_their_own_step_count() {
        let tuning = Tuning::equal_divisions(19.0, 440.0, 69);
        assert!((tuning.frequency(69 + 19) - 880.0).abs() < 1e-9);
        assert!(tuning.frequency(70) < 440.0 * 2.0_f64.powf(1.0 / 12.0));
    }

    #[test]
    fn a440_in_twelve_edo() {
        let tuning = Tuning::default();
        // A4 sits nine steps above C4
        assert!((tuning.frequency(69) - 440.0).abs() < 0.01);
    }
}
