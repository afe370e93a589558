//! Input sources that turn physical events into note calls.
//!
//! A controller is handed the instrument explicitly through
//! [`Controller::enable`]; there is no global instrument to look up. Switching
//! instruments (or switching which controller is active) stops every note on
//! the old one so nothing is left hanging.

use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::Clock;
use crate::synth::{Instrument, SynthMessage};

pub mod keyboard;
pub mod midi;

pub use keyboard::{note_for_key, KeyboardController};
pub use midi::{MidiController, MidiEvent};

/// One instrument shared by the audio callback and the controllers.
pub type SharedInstrument<C> = Arc<Mutex<Instrument<C>>>;

pub trait Controller<C: Clock> {
    /// Attach to `instrument`, first stopping all notes on the previous one.
    fn enable(&mut self, instrument: SharedInstrument<C>);

    /// Release anything held through this controller and detach.
    fn disable(&mut self);

    fn is_enabled(&self) -> bool;
}

/// Run `f` against the instrument under its lock. A poisoned lock is recovered.
pub fn with_instrument<C, R>(
    instrument: &SharedInstrument<C>,
    f: impl FnOnce(&mut Instrument<C>) -> R,
) -> R {
    let mut guard = instrument.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

/// Attachment shared by both controllers: the instrument handle plus the
/// notes this controller currently holds down.
pub(crate) struct Attachment<C> {
    instrument: Option<SharedInstrument<C>>,
    held: [bool; 128],
}

impl<C: Clock> Attachment<C> {
    pub(crate) fn new() -> Self {
        Self {
            instrument: None,
            held: [false; 128],
        }
    }

    pub(crate) fn attach(&mut self, instrument: SharedInstrument<C>) {
        if let Some(previous) = self.instrument.take() {
            with_instrument(&previous, |synth| synth.stop_all_notes());
        }
        self.held = [false; 128];
        self.instrument = Some(instrument);
    }

    pub(crate) fn detach(&mut self) {
        if let Some(instrument) = self.instrument.take() {
            with_instrument(&instrument, |synth| {
                for note in held_notes(&self.held) {
                    synth.stop_note(note);
                }
            });
        }
        self.held = [false; 128];
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.instrument.is_some()
    }

    /// Forward a message. Returns false when detached.
    pub(crate) fn send(&mut self, message: SynthMessage) -> bool {
        let Some(instrument) = &self.instrument else {
            return false;
        };

        match message {
            SynthMessage::NoteOn { note } => self.held[note as usize & 0x7F] = true,
            SynthMessage::NoteOff { note } => self.held[note as usize & 0x7F] = false,
            SynthMessage::AllNotesOff => self.held = [false; 128],
            SynthMessage::Param(_) => {}
        }
        with_instrument(instrument, |synth| synth.handle_message(message));
        true
    }

    pub(crate) fn is_held(&self, note: u8) -> bool {
        self.held[note as usize & 0x7F]
    }

    pub(crate) fn held(&self) -> impl Iterator<Item = u8> + '_ {
        held_notes(&self.held)
    }
}

fn held_notes(held: &[bool; 128]) -> impl Iterator<Item = u8> + '_ {
    held.iter()
        .enumerate()
        .filter(|(_, on)| **on)
        .map(|(note, _)| note as u8)
}
