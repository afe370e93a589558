//! Benchmarks for whole instruments.
//!
//! Chords are held in sustain so every voice renders for the full block.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use luna::clock::ManualClock;
use luna::synth::{Instrument, Patch};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_instrument(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/instrument");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for voices in [1u8, 4, 16] {
            let clock = ManualClock::new();
            let mut synth = Instrument::new(clock.clone(), Patch::default());
            for note in 0..voices {
                synth.play_note(48 + note);
            }
            clock.set(2.0);

            let block = size as f64 / SAMPLE_RATE as f64;
            group.bench_with_input(
                BenchmarkId::new(format!("{}_voices", voices), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        synth.render(black_box(&mut buffer), SAMPLE_RATE);
                        clock.advance(block);
                    })
                },
            );
        }

        // Note churn: a retrigger per block while rendering
        let clock = ManualClock::new();
        let mut synth = Instrument::new(clock.clone(), Patch::default());
        synth.play_note(60);
        let block = size as f64 / SAMPLE_RATE as f64;
        group.bench_with_input(BenchmarkId::new("retrigger_per_block", size), &size, |b, _| {
            b.iter(|| {
                synth.play_note(black_box(60));
                synth.render(&mut buffer, SAMPLE_RATE);
                clock.advance(block);
            })
        });
    }

    group.finish();
}
