//! Envelope schedules sampled the way the renderer samples them.

use luna::envelope::{Envelope, EnvelopeSettings, DEFAULT_INITIAL_LEVEL};
use luna::param::ParamTimeline;

const SAMPLE_RATE: f64 = 48_000.0;
const EPS: f64 = 1e-9;

fn envelope(settings: EnvelopeSettings) -> Envelope<ParamTimeline> {
    Envelope::new(settings, ParamTimeline::new(0.0))
}

/// Largest change between consecutive samples of the timeline over [from, to).
fn max_step(timeline: &ParamTimeline, from: f64, to: f64) -> f64 {
    let dt = 1.0 / SAMPLE_RATE;
    let samples = ((to - from) / dt) as usize;

    (1..samples)
        .map(|i| {
            let a = timeline.value_at(from + (i - 1) as f64 * dt);
            let b = timeline.value_at(from + i as f64 * dt);
            (b - a).abs()
        })
        .fold(0.0, f64::max)
}

#[test]
fn open_gate_reaches_each_level_on_time() {
    for settings in [
        EnvelopeSettings::adsr(0.1, 0.1, 0.5, 0.2),
        EnvelopeSettings::adsr(0.01, 1.0, 0.05, 2.0),
        EnvelopeSettings::adsr(2.0, 0.3, 0.9, 0.1).with_initial_level(0.2),
    ] {
        let mut env = envelope(settings);
        env.open_gate(3.0);
        let shape = *env.shape();
        let timeline = env.target();

        let attack_end = 3.0 + shape.attack_time;
        let decay_end = attack_end + shape.decay_time;
        assert!((timeline.value_at(3.0) - shape.initial_level).abs() < EPS);
        assert!((timeline.value_at(attack_end) - shape.attack_final_level).abs() < EPS);
        assert!((timeline.value_at(decay_end) - shape.sustain_level).abs() < EPS);
    }
}

#[test]
fn close_mid_attack_captures_half_way_value() {
    let mut env = envelope(EnvelopeSettings::adsr(0.1, 0.1, 0.5, 0.2));
    env.open_gate(0.0);
    env.close_gate(0.05);

    let expected = DEFAULT_INITIAL_LEVEL + (1.0 - DEFAULT_INITIAL_LEVEL) * 0.5;
    assert!((env.value_at_gate_close() - expected).abs() < EPS);
    assert!((env.end_time() - 0.25).abs() < EPS);
}

#[test]
fn end_time_tracks_every_close_time() {
    for close_at in [0.0, 0.03, 0.1, 0.17, 0.5, 12.0] {
        let mut env = envelope(EnvelopeSettings::adsr(0.1, 0.1, 0.5, 0.2));
        env.open_gate(0.0);
        env.close_gate(close_at);
        assert!((env.end_time() - (close_at + 0.2)).abs() < EPS);
    }
}

#[test]
fn close_twice_keeps_first_schedule() {
    let mut env = envelope(EnvelopeSettings::adsr(0.1, 0.1, 0.5, 0.2));
    env.open_gate(0.0);
    env.close_gate(0.3);
    let events = env.target().events().to_vec();

    env.close_gate(0.4);

    assert_eq!(env.target().events(), events.as_slice());
    assert!((env.end_time() - 0.5).abs() < EPS);
}

#[test]
fn rendered_gain_has_no_click_across_retriggers() {
    let first = EnvelopeSettings::adsr(0.1, 0.2, 0.5, 0.3);
    let second = EnvelopeSettings::adsr(0.05, 0.1, 0.8, 0.4);
    let mut env = envelope(first);

    // Open, retrigger mid-decay, release, retrigger mid-release, release again
    env.open_gate(0.0);
    env.retrigger(0.2, second);
    env.close_gate(0.6);
    env.retrigger(0.75, first);
    env.close_gate(1.2);

    // Steepest legitimate slope is the 50 ms attack: 1 / 0.05 per second
    let limit = 1.0 / 0.05 / SAMPLE_RATE * 1.5;
    let step = max_step(env.target(), 0.0, 2.0);
    assert!(step < limit, "largest per-sample step {} exceeds {}", step, limit);
}

#[test]
fn lookahead_retrigger_leaves_earlier_samples_alone() {
    let mut env = envelope(EnvelopeSettings::adsr(0.1, 0.2, 0.5, 0.3));
    env.open_gate(0.0);
    env.close_gate(1.0);

    // Samples between "now" (1.05) and the stamped event time (1.1) were
    // scheduled under the release and must still follow it
    let before: Vec<f64> = (0..10).map(|i| env.target().value_at(1.05 + i as f64 * 0.005)).collect();
    env.retrigger(1.1, EnvelopeSettings::adsr(0.1, 0.2, 0.5, 0.3));
    let after: Vec<f64> = (0..10).map(|i| env.target().value_at(1.05 + i as f64 * 0.005)).collect();

    for (b, a) in before.iter().zip(after.iter()) {
        assert!((b - a).abs() < 1e-12, "{} changed to {}", b, a);
    }
}

#[test]
fn filter_style_envelope_in_hz_is_continuous() {
    // Filter envelopes run between cutoff frequencies instead of gains
    let cutoff = EnvelopeSettings::adsr(0.1, 0.2, 500.0, 0.5)
        .with_attack_final_level(1000.0)
        .with_end_value(20.0);
    let mut env = Envelope::new(cutoff, ParamTimeline::new(1000.0));
    env.open_gate(0.0);
    env.close_gate(0.4);

    let retrigger_at = 0.6;
    let current = env.value_at(retrigger_at);
    env.retrigger(retrigger_at, cutoff);

    assert!((env.target().value_at(retrigger_at) - current).abs() < 1e-6);
    assert!((env.target().value_at(env.start_decay_at()) - 1000.0).abs() < 1e-6);
}
