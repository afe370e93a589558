use tracing::debug;

use super::patch::Patch;
use crate::dsp::{Oscillator, SVFilter};
use crate::envelope::Envelope;
use crate::param::ParamTimeline;
use crate::MIN_LEVEL;

/// How far a retriggered oscillator's stop is pushed into the future, in seconds.
pub const OSCILLATOR_HOLD: f64 = 1000.0;

/// One sounding note: oscillator → amp gain → filter, with an envelope
/// driving the gain and another driving the filter cutoff.
///
/// The envelopes write into their own [`ParamTimeline`]s. Rendering reads
/// those timelines per sample, so a voice sounds exactly as scheduled.
pub struct Voice {
    note: u8,
    oscillator: Oscillator,
    filter: SVFilter,
    amp_envelope: Envelope<ParamTimeline>,
    filter_envelope: Envelope<ParamTimeline>,
    start_at: f64,
    stop_at: f64,
}

impl Voice {
    /// Build a voice from the patch and open both gates at `at`.
    pub fn start(note: u8, frequency: f64, patch: &Patch, at: f64) -> Self {
        let oscillator = Oscillator::new(patch.waveform, frequency as f32);
        let filter = SVFilter::new(
            patch.filter.filter_type,
            patch.filter.cutoff_hz as f32,
            patch.filter.resonance as f32,
        );

        let mut amp_envelope = Envelope::new(patch.amp_envelope, ParamTimeline::new(MIN_LEVEL));
        let mut filter_envelope = Envelope::new(
            patch.filter_envelope_settings(),
            ParamTimeline::new(patch.filter.cutoff_hz),
        );
        amp_envelope.open_gate(at);
        filter_envelope.open_gate(at);

        debug!(note, frequency, at, "voice started");

        Self {
            note,
            oscillator,
            filter,
            amp_envelope,
            filter_envelope,
            start_at: at,
            stop_at: f64::INFINITY,
        }
    }

    /// Re-open a voice that is still sounding, picking up live patch changes
    /// (waveform, tuning, filter type and resonance, envelope settings).
    pub fn retrigger(&mut self, at: f64, patch: &Patch) {
        self.stop_at = at + OSCILLATOR_HOLD;

        self.oscillator.set_waveform(patch.waveform);
        self.oscillator
            .set_frequency(patch.tuning.frequency(self.note) as f32);
        self.filter.set_filter_type(patch.filter.filter_type);
        self.filter.set_q(patch.filter.resonance as f32);

        self.amp_envelope.retrigger(at, patch.amp_envelope);
        self.filter_envelope
            .retrigger(at, patch.filter_envelope_settings());

        debug!(note = self.note, at, "voice retriggered");
    }

    /// Close both gates; the oscillator stops when the amp release ends.
    pub fn release(&mut self, at: f64) {
        self.amp_envelope.close_gate(at);
        self.filter_envelope.close_gate(at);
        self.stop_at = self.amp_envelope.end_time();
    }

    /// Still audible at `now`, in any phase including release.
    pub fn is_sounding(&self, now: f64) -> bool {
        now < self.amp_envelope.end_time()
    }

    /// The oscillator has stopped and the voice can be dropped.
    pub fn is_finished(&self, now: f64) -> bool {
        now >= self.stop_at
    }

    /// Add this voice's output for the block starting at `start` into `out`.
    pub fn render(&mut self, out: &mut [f32], start: f64, sample_rate: f32) {
        let dt = 1.0 / sample_rate as f64;

        for (i, sample) in out.iter_mut().enumerate() {
            let t = start + i as f64 * dt;
            if t < self.start_at || t >= self.stop_at {
                continue;
            }

            let gain = self.amp_envelope.target().value_at(t) as f32;
            let cutoff = self.filter_envelope.target().value_at(t) as f32;
            self.filter.set_cutoff(cutoff);

            let x = self.oscillator.next_sample(sample_rate) * gain;
            *sample += self.filter.process(x, sample_rate);
        }

        let end = start + out.len() as f64 * dt;
        let amp = self.amp_envelope.target_mut();
        amp.advance_to(end);
        amp.prune_before(end);
        let cutoff = self.filter_envelope.target_mut();
        cutoff.advance_to(end);
        cutoff.prune_before(end);
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn start_time(&self) -> f64 {
        self.start_at
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_at
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    pub fn filter(&self) -> &SVFilter {
        &self.filter
    }

    pub fn amp_envelope(&self) -> &Envelope<ParamTimeline> {
        &self.amp_envelope
    }

    pub fn filter_envelope(&self) -> &Envelope<ParamTimeline> {
        &self.filter_envelope
    }
}
