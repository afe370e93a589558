pub mod clock; // Monotonic time sources driving note events
#[cfg(feature = "serde")]
pub mod config;
pub mod controller; // Keyboard and MIDI input adapters
pub mod dsp;
pub mod envelope; // ADSR scheduling onto automation targets
pub mod error;
pub mod param; // Time-schedulable parameter automation
pub mod synth; // Voice management and polyphony

pub use error::SynthError;

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Smallest level an exponential ramp may start from or aim at.
pub const MIN_LEVEL: f64 = 0.0001;
