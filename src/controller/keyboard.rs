use tracing::trace;

use super::{Attachment, Controller, SharedInstrument};
use crate::clock::Clock;
use crate::synth::SynthMessage;

/*
Computer Keyboard Layout
========================

Three rows of the QWERTY keyboard play consecutive notes, bottom row first:

  z x c v b n m , . /          45 .. 54    (v = 48, C3)
  a s d f g h j k l ; '        55 .. 65    (h = 60, middle C)
  q w e r t y u i o p [ ] \    66 .. 78    (u = 72, C5)

Keys are chromatic steps, not piano white keys: with a non-12 tuning every
key is still one step of the scale.
*/

const BOTTOM_ROW: &str = "zxcvbnm,./";
const HOME_ROW: &str = "asdfghjkl;'";
const TOP_ROW: &str = "qwertyuiop[]\\";

const BOTTOM_ROW_FIRST_NOTE: u8 = 45;

/// Note played by a key, if it is part of the layout. Letters are case-insensitive.
pub fn note_for_key(key: char) -> Option<u8> {
    let key = key.to_ascii_lowercase();
    BOTTOM_ROW
        .chars()
        .chain(HOME_ROW.chars())
        .chain(TOP_ROW.chars())
        .position(|k| k == key)
        .map(|offset| BOTTOM_ROW_FIRST_NOTE + offset as u8)
}

pub struct KeyboardController<C> {
    attachment: Attachment<C>,
}

impl<C: Clock> KeyboardController<C> {
    pub fn new() -> Self {
        Self {
            attachment: Attachment::new(),
        }
    }

    /// Returns true if the key is mapped. Auto-repeat of a held key is ignored.
    pub fn key_down(&mut self, key: char) -> bool {
        let Some(note) = note_for_key(key) else {
            return false;
        };

        if !self.attachment.is_held(note) {
            trace!(%key, note, "key down");
            self.attachment.send(SynthMessage::NoteOn { note });
        }
        true
    }

    pub fn key_up(&mut self, key: char) -> bool {
        let Some(note) = note_for_key(key) else {
            return false;
        };

        trace!(%key, note, "key up");
        self.attachment.send(SynthMessage::NoteOff { note });
        true
    }

    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.attachment.held()
    }
}

impl<C: Clock> Default for KeyboardController<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Controller<C> for KeyboardController<C> {
    fn enable(&mut self, instrument: SharedInstrument<C>) {
        self.attachment.attach(instrument);
    }

    fn disable(&mut self) {
        self.attachment.detach();
    }

    fn is_enabled(&self) -> bool {
        self.attachment.is_attached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::synth::{Instrument, Patch};
    use std::sync::{Arc, Mutex};

    #[test]
    fn rows_map_to_consecutive_notes() {
        assert_eq!(note_for_key('z'), Some(45));
        assert_eq!(note_for_key('v'), Some(48));
        assert_eq!(note_for_key('/'), Some(54));
        assert_eq!(note_for_key('a'), Some(55));
        assert_eq!(note_for_key('h'), Some(60));
        assert_eq!(note_for_key('\''), Some(65));
        assert_eq!(note_for_key('q'), Some(66));
        assert_eq!(note_for_key('u'), Some(72));
        assert_eq!(note_for_key('\\'), Some(78));
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert_eq!(note_for_key('1'), None);
        assert_eq!(note_for_key(' '), None);
        assert_eq!(note_for_key('H'), Some(60));
    }

    #[test]
    fn repeated_key_down_does_not_retrigger() {
        let clock = ManualClock::new();
        let instrument = Arc::new(Mutex::new(Instrument::new(clock.clone(), Patch::default())));
        let mut keyboard = KeyboardController::new();
        keyboard.enable(instrument.clone());

        assert!(keyboard.key_down('h'));
        clock.set(0.25);
        assert!(keyboard.key_down('h'));

        // A retrigger would have moved the attack anchor
        let synth = instrument.lock().unwrap();
        assert_eq!(synth.voice(60).unwrap().amp_envelope().gate_open_at(), 0.0);
        assert_eq!(keyboard.held_notes().collect::<Vec<_>>(), vec![60]);
    }

    #[test]
    fn key_up_releases_the_note() {
        let clock = ManualClock::new();
        let instrument = Arc::new(Mutex::new(Instrument::new(clock.clone(), Patch::default())));
        let mut keyboard = KeyboardController::new();
        keyboard.enable(instrument.clone());

        keyboard.key_down('u');
        clock.set(1.0);
        keyboard.key_up('u');

        let synth = instrument.lock().unwrap();
        assert!(!synth.voice(72).unwrap().amp_envelope().is_gate_open());
        assert_eq!(keyboard.held_notes().count(), 0);
    }

    #[test]
    fn disabled_keyboard_plays_nothing() {
        let clock = ManualClock::new();
        let instrument = Arc::new(Mutex::new(Instrument::new(clock, Patch::default())));
        let mut keyboard = KeyboardController::new();
        keyboard.enable(instrument.clone());
        keyboard.disable();

        assert!(keyboard.key_down('h'));
        assert!(!keyboard.is_enabled());
        assert!(instrument.lock().unwrap().voice(60).is_none());
    }
}
