// Voice management and the instrument that owns it.
// This layer sits above the envelopes and the dsp blocks.

pub mod instrument;
pub mod message;
pub mod params;
pub mod patch;
pub mod tuning;
pub mod voice;

pub use instrument::Instrument;
pub use message::SynthMessage;
pub use params::{AudioParam, EnvelopeParam};
pub use patch::{FilterSettings, Patch, FILTER_FLOOR_HZ};
pub use tuning::Tuning;
pub use voice::{Voice, OSCILLATOR_HOLD};
