//! Time-schedulable parameters.
//!
//! An automation target is anything that accepts future-dated value changes:
//! a gain, a filter cutoff, an oscillator frequency. Envelopes never write a
//! value directly; they register steps and ramps on a target's timeline and
//! let the renderer evaluate it sample by sample.

/// Web Audio style timeline of scheduled values.
pub mod timeline;

pub use timeline::{Automation, ParamEvent, ParamTimeline};

/// A parameter that accepts scheduled value changes.
///
/// Ramps run from the previous scheduled event to `end_at`. Exponential ramps
/// need both endpoints strictly positive.
pub trait AutomationTarget {
    /// Jump to `value` at `at`.
    fn schedule_step(&mut self, value: f64, at: f64);

    /// Ramp linearly from the previous event, reaching `value` at `end_at`.
    fn schedule_linear_ramp(&mut self, value: f64, end_at: f64);

    /// Ramp exponentially from the previous event, reaching `value` at `end_at`.
    fn schedule_exponential_ramp(&mut self, value: f64, end_at: f64);

    /// Drop every scheduled event at or after `from`. Implementations may
    /// end a ramp in progress at `from` instead of dropping it outright.
    fn cancel_scheduled(&mut self, from: f64);

    /// The value the renderer most recently produced.
    fn current_value(&self) -> f64;
}
