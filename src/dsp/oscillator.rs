use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Oscillator
==========

A phase accumulator: phase runs from 0.0 to 1.0 once per cycle and each
waveform is a function of that phase.

  Sine       sin(2π·phase)                 pure tone
  Square     +1 for the first half, -1     odd harmonics, hollow
  Sawtooth   2·phase - 1                   all harmonics, bright
  Triangle   folded sawtooth               odd harmonics, soft

These are naive (not band-limited). The filter that follows every voice
takes the edge off the aliasing for the cutoffs a patch normally uses.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    #[default]
    Triangle,
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
            frequency,
            phase: 0.0,
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let phase = self.phase;
        let value = match self.waveform {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        };

        self.phase += self.frequency / sample_rate;
        self.phase -= self.phase.floor();

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(osc: &mut Oscillator, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len).map(|_| osc.next_sample(sample_rate)).collect()
    }

    #[test]
    fn waveforms_stay_in_unit_range() {
        for waveform in [
            Waveform::Sine,
            Waveform::Square,
            Waveform::Sawtooth,
            Waveform::Triangle,
        ] {
            let mut osc = Oscillator::new(waveform, 440.0);
            let samples = render(&mut osc, 48_000.0, 1024);
            assert!(
                samples.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{:?} left [-1, 1]",
                waveform
            );
        }
    }

    #[test]
    fn sine_completes_one_cycle_per_period() {
        // 100 Hz at 1 kHz: ten samples per cycle
        let mut osc = Oscillator::new(Waveform::Sine, 100.0);
        let samples = render(&mut osc, 1_000.0, 11);

        assert!(samples[0].abs() < 1e-6);
        assert!((samples[10] - samples[0]).abs() < 1e-4);
        assert!((samples[5]).abs() < 1e-4);
    }

    #[test]
    fn triangle_peaks_mid_cycle() {
        let mut osc = Oscillator::new(Waveform::Triangle, 100.0);
        let samples = render(&mut osc, 1_000.0, 10);

        assert!((samples[0] + 1.0).abs() < 1e-6);
        assert!((samples[5] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn frequency_change_takes_effect_immediately() {
        let mut osc = Oscillator::new(Waveform::Sawtooth, 100.0);
        osc.set_frequency(250.0);
        osc.set_waveform(Waveform::Square);

        assert_eq!(osc.frequency(), 250.0);
        assert_eq!(osc.waveform(), Waveform::Square);
    }
}
