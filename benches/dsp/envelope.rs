//! Benchmarks for the exponential envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use blitsynth::dsp::envelope::{Envelope, EnvelopeParams};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let params = EnvelopeParams::from_times(0.05, 0.2, 0.7, 0.3, SAMPLE_RATE);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up, stage change pending)
        let mut env = Envelope::new();
        env.set_params(params);
        env.attack();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = env.next_value();
                }
                black_box(&mut buffer);
            })
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::new();
        env.set_params(params);
        env.attack();
        for _ in 0..(SAMPLE_RATE as usize) {
            env.next_value();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = env.next_value();
                }
                black_box(&mut buffer);
            })
        });

        // Release phase
        let mut env = Envelope::new();
        env.set_params(params);
        env.attack();
        env.release();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = env.next_value();
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
