//! Sample-level building blocks a voice renders through.
//!
//! These are deliberately small: the interesting part of the instrument is the
//! envelope schedule, and these blocks only need to turn that schedule into
//! sound. All of them are allocation-free after construction.

/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Band-limited-enough oscillator waveforms.
pub mod oscillator;
/// Shared post-processing: rolloff filters, limiter, master gain.
pub mod output;

pub use filter::{FilterType, SVFilter};
pub use oscillator::{Oscillator, Waveform};
pub use output::{Limiter, OutputChain};
