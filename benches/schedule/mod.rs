//! Benchmarks for envelope scheduling and automation sampling.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use luna::envelope::{Envelope, EnvelopeSettings};
use luna::param::ParamTimeline;

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule/envelope");
    let settings = EnvelopeSettings::adsr(0.1, 0.2, 0.5, 0.3);

    group.bench_function("open_close", |b| {
        let mut env = Envelope::new(settings, ParamTimeline::new(0.0));
        let mut t = 0.0;
        b.iter(|| {
            env.open_gate(black_box(t));
            env.close_gate(black_box(t + 0.15));
            env.target_mut().prune_before(t);
            t += 1.0;
        })
    });

    // Retrigger during decay: the phase analysis plus virtual start
    group.bench_function("retrigger_decay", |b| {
        let mut env = Envelope::new(settings, ParamTimeline::new(0.0));
        let mut t = 0.0;
        env.open_gate(t);
        b.iter(|| {
            t += 0.15;
            env.retrigger(black_box(t), settings);
            env.target_mut().prune_before(t);
        })
    });

    group.bench_function("retrigger_release", |b| {
        let mut env = Envelope::new(settings, ParamTimeline::new(0.0));
        let mut t = 0.0;
        env.open_gate(t);
        b.iter(|| {
            t += 0.5;
            env.close_gate(t);
            env.retrigger(black_box(t + 0.1), settings);
            env.target_mut().prune_before(t);
        })
    });

    group.finish();
}

pub fn bench_timeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule/timeline");
    let dt = 1.0 / crate::SAMPLE_RATE as f64;

    for &size in BLOCK_SIZES {
        let mut env = Envelope::new(
            EnvelopeSettings::adsr(0.1, 0.2, 0.5, 0.3),
            ParamTimeline::new(0.0),
        );
        env.open_gate(0.0);
        let timeline = env.target();

        // Sampling inside the decay ramp, one lookup per sample
        group.bench_with_input(BenchmarkId::new("value_at", size), &size, |b, &size| {
            b.iter(|| {
                let mut acc = 0.0;
                for i in 0..size {
                    acc += timeline.value_at(black_box(0.15 + i as f64 * dt));
                }
                acc
            })
        });
    }

    group.finish();
}
