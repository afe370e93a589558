use super::params::AudioParam;

/// Everything a controller can ask of an instrument.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { note: u8 },
    NoteOff { note: u8 },
    AllNotesOff,
    Param(AudioParam),
}
