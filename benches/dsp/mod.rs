//! Benchmarks for the per-voice and shared rendering blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use luna::dsp::{FilterType, Oscillator, OutputChain, SVFilter, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in [("sine", Waveform::Sine), ("triangle", Waveform::Triangle)] {
            let mut osc = Oscillator::new(waveform, 440.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.next_sample(black_box(SAMPLE_RATE));
                    }
                })
            });
        }
    }

    group.finish();
}

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.5f32; size];

        let mut fixed = SVFilter::new(FilterType::LowPass, 1_000.0, 1.0);
        group.bench_with_input(BenchmarkId::new("fixed_cutoff", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = fixed.process(black_box(*sample), SAMPLE_RATE);
                }
            })
        });

        // Cutoff changes every sample, as under a filter envelope
        let mut swept = SVFilter::new(FilterType::LowPass, 1_000.0, 1.0);
        group.bench_with_input(BenchmarkId::new("swept_cutoff", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    swept.set_cutoff(200.0 + i as f32);
                    *sample = swept.process(black_box(*sample), SAMPLE_RATE);
                }
            })
        });
    }

    group.finish();
}

pub fn bench_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/output");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.8f32; size];
        let mut chain = OutputChain::new(0.3);

        group.bench_with_input(BenchmarkId::new("chain", size), &size, |b, _| {
            b.iter(|| chain.process(black_box(&mut buffer), SAMPLE_RATE))
        });
    }

    group.finish();
}
