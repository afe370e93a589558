#[cfg(feature = "rtrb")]
use rtrb::Consumer;
use tracing::{debug, trace};

use super::{Attachment, Controller, SharedInstrument};
use crate::clock::Clock;
use crate::synth::SynthMessage;

/// Control change number for "all notes off".
pub const ALL_NOTES_OFF: u8 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode one channel voice message. System messages and short
    /// messages decode to `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;
        let byte = |i: usize| data.get(i).map(|b| b & 0x7F);

        let event = match status & 0xF0 {
            0x80 => MidiEvent::NoteOff {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            },
            0x90 => {
                let (key, velocity) = (byte(0)?, byte(1)?);
                // Note-on with zero velocity means note-off
                if velocity == 0 {
                    MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity,
                    }
                } else {
                    MidiEvent::NoteOn {
                        channel,
                        key,
                        velocity,
                    }
                }
            }
            0xB0 => MidiEvent::ControlChange {
                channel,
                controller: byte(0)?,
                value: byte(1)?,
            },
            0xC0 => MidiEvent::ProgramChange {
                channel,
                program: byte(0)?,
            },
            0xE0 => {
                let raw = (byte(1)? as i16) << 7 | byte(0)? as i16;
                MidiEvent::PitchBend {
                    channel,
                    value: raw - 8192,
                }
            }
            _ => return None,
        };
        Some(event)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

/// Translate a MIDI event into an instrument message.
///
/// With a channel filter, events on other channels are dropped. Velocity is
/// not carried: every note plays at full envelope level.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: Option<u8>) -> Option<SynthMessage> {
    if channel_filter.is_some_and(|wanted| wanted != midi.channel()) {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { key, .. } => Some(SynthMessage::NoteOn { note: key }),
        MidiEvent::NoteOff { key, .. } => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::ControlChange {
            controller: ALL_NOTES_OFF,
            ..
        } => Some(SynthMessage::AllNotesOff),
        other => {
            debug!(event = ?other, "ignored midi event");
            None
        }
    }
}

pub struct MidiController<C> {
    attachment: Attachment<C>,
    channel: Option<u8>,
}

impl<C: Clock> MidiController<C> {
    /// `channel` is zero-based; `None` listens on all sixteen.
    pub fn new(channel: Option<u8>) -> Self {
        Self {
            attachment: Attachment::new(),
            channel: channel.map(|c| c & 0x0F),
        }
    }

    pub fn set_channel(&mut self, channel: Option<u8>) {
        self.channel = channel.map(|c| c & 0x0F);
    }

    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Handle one raw message as delivered by the MIDI driver.
    pub fn handle_bytes(&mut self, bytes: &[u8]) {
        match MidiEvent::parse(bytes) {
            Some(event) => self.handle_event(event),
            None => trace!(?bytes, "unparsed midi message"),
        }
    }

    pub fn handle_event(&mut self, event: MidiEvent) {
        trace!(?event, "midi event");
        if let Some(message) = midi_to_synth(event, self.channel) {
            self.attachment.send(message);
        }
    }

    /// Apply every event queued by the MIDI input thread. Returns how many
    /// events were taken off the queue.
    #[cfg(feature = "rtrb")]
    pub fn drain(&mut self, events: &mut Consumer<MidiEvent>) -> usize {
        let mut count = 0;
        while let Ok(event) = events.pop() {
            self.handle_event(event);
            count += 1;
        }
        count
    }

    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.attachment.held()
    }
}

impl<C: Clock> Controller<C> for MidiController<C> {
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
