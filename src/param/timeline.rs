use super::AutomationTarget;

/*
Parameter Timeline
==================

A timeline is an ordered list of automation events. Each event names a time
and a value, plus how the parameter travels from the PREVIOUS event to it:

  Set          jump to the value at the event time
  Linear       straight line from the previous event
  Exponential  constant-ratio curve from the previous event

    value
      │          ╱‾‾‾‾╲
      │         ╱      ╲___________
      │        ╱                   ╲
      │  ●────╱                     ╲____
      └──┼─────┼──────┼────────────┼─────→ time
        Set  Linear  Exp         Exp
        (t0)  (t1)   (t2)        (t3)

Evaluating value_at(t):

  1. find the last event at or before t        → (t0, v0)
  2. look at the next event                    → (t1, v1, kind)
  3. if it is a ramp, interpolate:
       linear:      v0 + (v1 - v0) * (t - t0) / (t1 - t0)
       exponential: v0 * (v1 / v0) ^ ((t - t0) / (t1 - t0))
     otherwise hold v0.

Events scheduled at the same instant keep insertion order, so a Set followed
by a Linear ramp at an identical time resolves to the ramp's value. Before
any event the timeline reports its anchor value (the value it was created
with).

Cancellation removes every event at or after the cancel time. A ramp that
was in flight is cut short instead: it now ends AT the cancel time, on the
value it had reached there, so the curve before the cancel is untouched.

    before cancel(tc)               after cancel(tc)

      ●──────────╲                    ●──────────╲
                  ╲                               ●   (tc, value_at(tc))
                   ╲
                    ●  (t1)

Samples between the render cursor and the cancel time (stamped ahead by a
lookahead) therefore still follow the old curve. Envelopes follow a cancel
with a Set at the same instant to start their new segment.
*/

/// How the parameter travels from the previous event to this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Automation {
    Set,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamEvent {
    pub time: f64,
    pub value: f64,
    pub kind: Automation,
}

#[derive(Debug, Clone)]
pub struct ParamTimeline {
    anchor_time: f64,
    anchor_value: f64,
    events: Vec<ParamEvent>,
    cursor: f64, // last time the renderer asked for
}

impl ParamTimeline {
    pub fn new(initial_value: f64) -> Self {
        Self {
            anchor_time: 0.0,
            anchor_value: initial_value,
            events: Vec::new(),
            cursor: 0.0,
        }
    }

    /// Scheduled events, oldest first.
    pub fn events(&self) -> &[ParamEvent] {
        &self.events
    }

    /// Evaluate the timeline at an arbitrary instant.
    pub fn value_at(&self, t: f64) -> f64 {
        // First event strictly after t
        let next = self.events.partition_point(|e| e.time <= t);

        let (t0, v0) = match next.checked_sub(1) {
            Some(prev) => (self.events[prev].time, self.events[prev].value),
            None => (self.anchor_time, self.anchor_value),
        };

        match self.events.get(next) {
            Some(e) if e.kind != Automation::Set => interpolate(e.kind, t0, v0, e.time, e.value, t),
            _ => v0,
        }
    }

    /// Move the render cursor forward. `current_value` reports this instant.
    pub fn advance_to(&mut self, t: f64) {
        if t > self.cursor {
            self.cursor = t;
        }
    }

    /// Forget events that can no longer influence values at or after `t`.
    ///
    /// The last event at or before `t` is kept because a ramp after it still
    /// starts from there.
    pub fn prune_before(&mut self, t: f64) {
        let at_or_before = self.events.partition_point(|e| e.time <= t);
        if at_or_before > 1 {
            let keep_from = at_or_before - 1;
            let last_dropped = self.events[keep_from - 1];
            self.anchor_time = last_dropped.time;
            self.anchor_value = last_dropped.value;
            self.events.drain(..keep_from);
        }
    }

    fn insert(&mut self, event: ParamEvent) {
        let idx = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(idx, event);
    }
}

fn interpolate(kind: Automation, t0: f64, v0: f64, t1: f64, v1: f64, t: f64) -> f64 {
    let span = t1 - t0;
    if span <= 0.0 {
        return if t >= t1 { v1 } else { v0 };
    }
    let progress = ((t - t0) / span).clamp(0.0, 1.0);

    match kind {
        Automation::Set => v0,
        Automation::Linear => v0 + (v1 - v0) * progress,
        Automation::Exponential => {
            let ratio = v1 / v0;
            // Undefined through or at zero: hold the start value
            if !(ratio > 0.0) || !ratio.is_finite() {
                return v0;
            }
            v0 * ratio.powf(progress)
        }
    }
}

impl AutomationTarget for ParamTimeline {
    fn schedule_step(&mut self, value: f64, at: f64) {
        self.insert(ParamEvent {
            time: at,
            value,
            kind: Automation::Set,
        });
    }

    fn schedule_linear_ramp(&mut self, value: f64, end_at: f64) {
        self.insert(ParamEvent {
            time: end_at,
            value,
            kind: Automation::Linear,
        });
    }

    fn schedule_exponential_ramp(&mut self, value: f64, end_at: f64) {
        self.insert(ParamEvent {
            time: end_at,
            value,
            kind: Automation::Exponential,
        });
    }

    fn cancel_scheduled(&mut self, from: f64) {
        let keep = self.events.partition_point(|e| e.time < from);

        let in_flight = match self.events.get(keep) {
            Some(next) if next.kind != Automation::Set => Some(ParamEvent {
                time: from,
                value: self.value_at(from),
                kind: next.kind,
            }),
            _ => None,
        };

        self.events.truncate(keep);
        self.events.extend(in_flight);
    }

    fn current_value(&self) -> f64 {
        self.value_at(self.cursor)
    }
}
