//! Benchmarks for BLIT oscillator generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use blitsynth::dsp::oscillator::BlitOscillator;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn oscillator(freq: f32) -> BlitOscillator {
    let mut osc = BlitOscillator::new();
    osc.period = SAMPLE_RATE / freq;
    osc.amplitude = 0.5;
    osc
}

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Long period: the recursive sine runs for most samples
        let mut osc = oscillator(55.0);
        group.bench_with_input(BenchmarkId::new("impulses_55hz", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = osc.next_sample();
                }
                black_box(&mut buffer);
            })
        });

        // Short period: cycle starts (sin/cos setup) every few samples
        let mut osc = oscillator(3520.0);
        group.bench_with_input(BenchmarkId::new("impulses_3520hz", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = osc.next_sample();
                }
                black_box(&mut buffer);
            })
        });

        // Integrated into a sawtooth, as in a voice
        let mut osc = oscillator(220.0);
        let mut saw = 0.0f32;
        group.bench_with_input(BenchmarkId::new("sawtooth", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    saw = saw * 0.997 + osc.next_sample();
                    *out = saw;
                }
                black_box(&mut buffer);
            })
        });

        // Two oscillators subtracted: the pulse-wave path
        let mut osc1 = oscillator(220.0);
        let mut osc2 = oscillator(220.0);
        osc1.next_sample();
        osc2.square_wave(&osc1, osc1.period);
        let mut pulse = 0.0f32;
        group.bench_with_input(BenchmarkId::new("pulse", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    pulse = pulse * 0.997 + osc1.next_sample() - osc2.next_sample();
                    *out = pulse;
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
