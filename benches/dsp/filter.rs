//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use blitsynth::dsp::filter::SVFilter;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Fixed coefficients
        let mut filter = SVFilter::new(SAMPLE_RATE);
        filter.update_coefficients(1000.0, 0.707);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render_block(black_box(&mut buffer));
            })
        });

        // Coefficients recomputed every 32 samples, as the engine does on
        // each LFO tick
        let mut filter = SVFilter::new(SAMPLE_RATE);
        let mut buffer = input.clone();
        let mut sweep = 0.0f32;
        group.bench_with_input(BenchmarkId::new("swept", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for chunk in buffer.chunks_mut(32) {
                    sweep = (sweep + 0.1) % 6.0;
                    filter.update_coefficients(200.0 * sweep.exp(), 3.0);
                    filter.render_block(black_box(chunk));
                }
            })
        });
    }

    group.finish();
}
