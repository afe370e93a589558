use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::message::SynthMessage;
use super::params::AudioParam;
use super::patch::Patch;
use super::voice::Voice;
use crate::clock::Clock;
use crate::dsp::OutputChain;
use crate::SynthError;

/*
Voice Table
===========

At most one voice per note. A note-on looks the note up and asks whether the
voice there is still sounding:

  note-on(n)
    │
    ├─ voice at n, now < amp end time   → retrigger in place
    │                                     (attack, decay, sustain or release)
    │
    └─ no voice, or its release is over → build a fresh voice, replacing
                                          whatever finished entry was there

  note-off(n) → close the gates; the entry STAYS so a note-on during the
                release can still find and retrigger it

Entries are dropped by `render` once their oscillator stop time has passed.
Between release end and the next render a finished entry may linger; the
liveness check in `play_note` is what matters, not the entry's presence.
*/

/// Polyphonic voice manager with a shared output chain.
pub struct Instrument<C> {
    clock: C,
    patch: Patch,
    lookahead: f64,
    voices: BTreeMap<u8, Voice>,
    output: OutputChain,
}

impl<C: Clock> Instrument<C> {
    pub fn new(clock: C, patch: Patch) -> Self {
        let output = OutputChain::new(patch.master_gain as f32);
        Self {
            clock,
            patch,
            lookahead: 0.0,
            voices: BTreeMap::new(),
            output,
        }
    }

    /// Stamp note events this many seconds after the clock's current time.
    pub fn with_lookahead(mut self, seconds: f64) -> Self {
        self.lookahead = seconds.max(0.0);
        self
    }

    fn event_time(&self) -> f64 {
        self.clock.now() + self.lookahead
    }

    pub fn frequency(&self, note: u8) -> f64 {
        self.patch.tuning.frequency(note)
    }

    pub fn play_note(&mut self, note: u8) {
        let now = self.event_time();

        if let Some(voice) = self.voices.get_mut(&note) {
            if voice.is_sounding(now) {
                voice.retrigger(now, &self.patch);
                return;
            }
        }

        let frequency = self.frequency(note);
        let voice = Voice::start(note, frequency, &self.patch, now);
        if self.voices.insert(note, voice).is_some() {
            debug!(note, "replaced finished voice");
        }
    }

    pub fn stop_note(&mut self, note: u8) {
        let now = self.event_time();

        match self.voices.get_mut(&note) {
            Some(voice) => voice.release(now),
            None => warn!(note, "stop requested for a note with no voice"),
        }
    }

    pub fn stop_all_notes(&mut self) {
        let now = self.event_time();
        for voice in self.voices.values_mut() {
            voice.release(now);
        }
        debug!(voices = self.voices.len(), "stopped all notes");
    }

    /// Update the template used by future notes and by retriggers.
    ///
    /// Master gain also reaches the output chain at once.
    pub fn update_audio_param(&mut self, param: AudioParam) -> Result<(), SynthError> {
        self.patch.apply(param)?;

        if let AudioParam::MasterGain(gain) = param {
            self.output.set_master_gain(gain as f32);
        }
        debug!(param = param.name(), "updated audio param");
        Ok(())
    }

    pub fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { note } => self.play_note(note),
            SynthMessage::NoteOff { note } => self.stop_note(note),
            SynthMessage::AllNotesOff => self.stop_all_notes(),
            SynthMessage::Param(param) => {
                if let Err(err) = self.update_audio_param(param) {
                    warn!(%err, "ignored parameter update");
                }
            }
        }
    }

    /// Render one block starting at the clock's current time.
    ///
    /// The caller advances the clock after the block has been rendered.
    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        out.fill(0.0);

        let start = self.clock.now();
        for voice in self.voices.values_mut() {
            voice.render(out, start, sample_rate);
        }
        self.output.process(out, sample_rate);

        let end = start + out.len() as f64 / sample_rate as f64;
        self.voices.retain(|_, voice| !voice.is_finished(end));
    }

    pub fn voice(&self, note: u8) -> Option<&Voice> {
        self.voices.get(&note)
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.values()
    }

    /// Voices still audible at the clock's current time.
    pub fn active_voices(&self) -> usize {
        let now = self.clock.now();
        self.voices.values().filter(|v| v.is_sounding(now)).count()
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn master_gain(&self) -> f32 {
        self.output.master_gain()
    }

    pub fn lookahead(&self) -> f64 {
        self.lookahead
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
