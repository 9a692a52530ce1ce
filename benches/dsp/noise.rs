//! Benchmarks for the white noise source.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use blitsynth::dsp::noise::NoiseGenerator;

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // LCG plus float bit tricks
        let mut noise = NoiseGenerator::new();
        group.bench_with_input(BenchmarkId::new("white", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = noise.next_value();
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
