use std::mem;

use tracing::{debug, warn};

use crate::{param::AutomationTarget, MIN_LEVEL};

mod settings;

pub use settings::{
    EnvelopeSettings, EnvelopeShape, DEFAULT_ATTACK_FINAL_LEVEL, DEFAULT_END_VALUE,
    DEFAULT_INITIAL_LEVEL,
};

/*
Scheduled ADSR Envelope
=======================

This envelope does not compute samples. It writes a schedule onto an
automation target (a gain or a filter cutoff) and keeps just enough
bookkeeping to answer one question analytically: "what value is the target
producing right now?" That answer is what makes mid-flight changes click-free.

Vocabulary
----------

  gate        Note on/off signal. Opening the gate schedules attack and
              decay; closing it schedules release from wherever we are.

  phase       Attack, Decay, Sustain or Release. Derived from the gate and
              the timestamps below, never stored.

  retrigger   A new note-on while the previous one is still audible. The
              target must continue from its current value, not restart.


The Shape
---------

  Level
   peak ┐      ╱╲
        │     ╱  ╲.
        │    ╱     `-.______________
    sus │   ╱                       \.
        │  ╱                          `-.
   init └─╱──────────────────────────────`──→ Time
          │ linear │   exp   │  hold  │  exp  │
          open   start     start    close    end
                 decay     sustain

Attack is LINEAR (initial → peak), decay and release are EXPONENTIAL. An
exponential ramp cannot start at or reach zero, so every level is floored at
MIN_LEVEL. Sustain is not scheduled at all: the target simply stays where the
decay ramp left it.


Where Is The Curve Right Now?
-----------------------------

  attack   init + (peak - init) * (t - open) / attack_time
  decay    peak * (sustain / peak) ^ ((t - start_decay) / decay_time)
  sustain  sustain
  release  v_close * (end / v_close) ^ ((t - close) / release_time)

These mirror exactly what the timeline ramps produce, so the value computed
here is the value the listener hears at time t.


Retriggering Without A Click
----------------------------

On retrigger we cancel the future schedule, pin the target to the current
value, then ask: if a fresh attack with the NEW settings had been running
all along, when would it have started so that it passes through the current
value right now?

    virtual_start = at - attack_time * (current - init) / (peak - init)

                 peak ┐        ╱
                      │      ╱
             current ─┼────●         ← we are here, at `at`
                      │  ╱
                 init └╱───┼─────
                virtual_start  at

The attack and decay ramps are then scheduled from virtual_start, so the new
shape resumes mid-attack with no jump. If the current value is already at or
above the peak (or the new attack is instantaneous) the attack ramp is skipped
and decay runs straight from the current value.
*/

/// Where an envelope is at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopePhase {
    Idle,     // Gate never opened
    Attack,   // Linear ramp toward the peak
    Decay,    // Exponential ramp toward sustain
    Sustain,  // Holding while the gate is open
    Release,  // Exponential ramp toward the end value
    Finished, // Release complete
}

pub struct Envelope<P> {
    shape: EnvelopeShape,
    target: P,

    started: bool,
    gate_open: bool,

    // Attack line: from (gate_open_at, attack_from) to (start_decay_at, peak)
    gate_open_at: f64,
    attack_from: f64,
    start_decay_at: f64,

    // Decay curve: from (start_decay_at, decay_from) to (start_sustain_at, sustain)
    decay_from: f64,
    start_sustain_at: f64,

    // Release bookkeeping, captured at gate close
    gate_closed_at: f64,
    value_at_gate_close: f64,
    end_at: f64,
}

impl<P: AutomationTarget> Envelope<P> {
    pub fn new(settings: EnvelopeSettings, target: P) -> Self {
        let shape = settings.resolve();
        Self {
            shape,
            target,
            started: false,
            gate_open: false,
            gate_open_at: 0.0,
            attack_from: shape.initial_level,
            start_decay_at: 0.0,
            decay_from: shape.attack_final_level,
            start_sustain_at: 0.0,
            gate_closed_at: 0.0,
            value_at_gate_close: shape.initial_level,
            end_at: f64::NEG_INFINITY,
        }
    }

    /// Bind a different automation target, returning the previous one.
    pub fn connect(&mut self, target: P) -> P {
        mem::replace(&mut self.target, target)
    }

    /// Start a new envelope instance at `at`.
    pub fn open_gate(&mut self, at: f64) {
        let s = self.shape;

        self.started = true;
        self.gate_open_at = at;
        self.attack_from = s.initial_level;
        self.start_decay_at = at + s.attack_time;
        self.decay_from = s.attack_final_level;
        self.start_sustain_at = self.start_decay_at + s.decay_time;

        self.target.cancel_scheduled(at);
        self.target.schedule_step(s.initial_level, at);
        self.target
            .schedule_linear_ramp(s.attack_final_level, self.start_decay_at);
        self.target
            .schedule_exponential_ramp(s.sustain_level, self.start_sustain_at);

        self.gate_open = true;
        self.end_at = f64::INFINITY;
    }

    /// Schedule the release from whatever level the envelope has reached.
    ///
    /// Does nothing if the gate is already closed.
    pub fn close_gate(&mut self, at: f64) {
        if !self.gate_open {
            return;
        }

        let value = floor_level(self.value_at(at));
        debug!(phase = ?self.phase_at(at), value, "closing gate");

        self.gate_closed_at = at;
        self.value_at_gate_close = value;
        self.end_at = at + self.shape.release_time;

        self.target.cancel_scheduled(at);
        self.target.schedule_step(value, at);
        self.target
            .schedule_exponential_ramp(self.shape.end_value, self.end_at);

        self.gate_open = false;
    }

    /// Re-open the envelope with new settings, continuing from its current value.
    pub fn retrigger(&mut self, at: f64, settings: EnvelopeSettings) {
        let current = if !self.started {
            None
        } else if self.gate_open {
            debug!(phase = ?self.phase_at(at), "retrigger with gate open");
            Some(self.value_at(at))
        } else if at <= self.end_at {
            debug!("retrigger in release phase");
            Some(self.release_value(at))
        } else {
            // Release is over; the target rests at the end value
            debug!("retrigger on a finished envelope");
            Some(self.shape.end_value)
        };

        match current {
            Some(value) => {
                self.reschedule(at, value, settings);
                self.gate_open = true;
                self.end_at = f64::INFINITY;
            }
            None => {
                self.shape = settings.resolve();
                self.open_gate(at);
            }
        }
    }

    fn reschedule(&mut self, at: f64, current: f64, settings: EnvelopeSettings) {
        let current = floor_level(current);

        self.target.cancel_scheduled(at);
        self.target.schedule_step(current, at);

        self.shape = settings.resolve();
        let s = self.shape;

        // How far along the new attack line the current value sits
        let span = s.attack_final_level - s.initial_level;
        let progress = if s.attack_time > 0.0 && span.abs() > f64::EPSILON {
            ((current - s.initial_level) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let virtual_start = at - s.attack_time * progress;
        self.start_decay_at = virtual_start + s.attack_time;
        self.start_sustain_at = self.start_decay_at + s.decay_time;

        if progress < 1.0 {
            if progress > 0.0 {
                self.gate_open_at = virtual_start;
                self.attack_from = s.initial_level;
            } else {
                // Below the attack start: climb from where we are
                self.gate_open_at = at;
                self.attack_from = current;
            }
            self.decay_from = s.attack_final_level;
            self.target
                .schedule_linear_ramp(s.attack_final_level, self.start_decay_at);
        } else {
            self.gate_open_at = virtual_start;
            self.attack_from = s.initial_level;
            self.decay_from = current;
        }

        self.target
            .schedule_exponential_ramp(s.sustain_level, self.start_sustain_at);

        debug!(
            current,
            virtual_start,
            start_decay_at = self.start_decay_at,
            "rescheduled envelope"
        );
    }

    /// The time the release completes. Infinite while the gate is open.
    pub fn end_time(&self) -> f64 {
        self.end_at
    }

    pub fn phase_at(&self, t: f64) -> EnvelopePhase {
        if !self.started {
            EnvelopePhase::Idle
        } else if self.gate_open {
            if t < self.start_decay_at {
                EnvelopePhase::Attack
            } else if t < self.start_sustain_at {
                EnvelopePhase::Decay
            } else {
                EnvelopePhase::Sustain
            }
        } else if t < self.end_at {
            EnvelopePhase::Release
        } else {
            EnvelopePhase::Finished
        }
    }

    /// Analytic value of the curve at `t`, matching what the target produces.
    pub fn value_at(&self, t: f64) -> f64 {
        match self.phase_at(t) {
            EnvelopePhase::Idle => self.shape.initial_level,
            EnvelopePhase::Attack => self.attack_value(t),
            EnvelopePhase::Decay => self.decay_value(t),
            EnvelopePhase::Sustain => self.shape.sustain_level,
            EnvelopePhase::Release => self.release_value(t),
            EnvelopePhase::Finished => self.shape.end_value,
        }
    }

    fn attack_value(&self, t: f64) -> f64 {
        let s = &self.shape;
        if s.attack_time <= 0.0 {
            return s.attack_final_level;
        }
        let progress = ((t - self.gate_open_at) / s.attack_time).clamp(0.0, 1.0);
        self.attack_from + (s.attack_final_level - self.attack_from) * progress
    }

    fn decay_value(&self, t: f64) -> f64 {
        let s = &self.shape;
        if s.decay_time <= 0.0 {
            return s.sustain_level;
        }
        let progress = ((t - self.start_decay_at) / s.decay_time).clamp(0.0, 1.0);
        self.decay_from * (s.sustain_level / self.decay_from).powf(progress)
    }

    fn release_value(&self, t: f64) -> f64 {
        let s = &self.shape;
        if s.release_time <= 0.0 {
            return s.end_value;
        }
        let progress = ((t - self.gate_closed_at) / s.release_time).clamp(0.0, 1.0);
        self.value_at_gate_close * (s.end_value / self.value_at_gate_close).powf(progress)
    }

    pub fn is_gate_open(&self) -> bool {
        self.gate_open
    }

    pub fn gate_open_at(&self) -> f64 {
        self.gate_open_at
    }

    pub fn start_decay_at(&self) -> f64 {
        self.start_decay_at
    }

    pub fn start_sustain_at(&self) -> f64 {
        self.start_sustain_at
    }

    pub fn gate_closed_at(&self) -> f64 {
        self.gate_closed_at
    }

    pub fn value_at_gate_close(&self) -> f64 {
        self.value_at_gate_close
    }

    pub fn shape(&self) -> &EnvelopeShape {
        &self.shape
    }

    pub fn target(&self) -> &P {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut P {
        &mut self.target
    }
}

/// Keep a captured level usable as the base of an exponential ramp.
fn floor_level(value: f64) -> f64 {
    if value > 0.0 && value.is_finite() {
        value
    } else {
        warn!(value, "non-positive envelope level, clamping");
        MIN_LEVEL
    }
}
