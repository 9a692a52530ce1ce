//! Benchmarks for the full engine.
//!
//! Sustained notes keep the voices in their steady state, so the numbers
//! reflect a held chord rather than the cheaper release tail.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use blitsynth::{GlideMode, PolyMode, Synth, SynthParams, MAX_VOICES};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// Full sustain so nothing finishes while benchmarking.
fn held_params() -> SynthParams {
    let mut params = SynthParams::new(SAMPLE_RATE);
    params.amp_envelope.sustain = 1.0;
    params
}

fn engine(params: SynthParams, notes: &[u8]) -> Synth {
    let mut synth = Synth::new(params);
    synth
        .allocate_resources(SAMPLE_RATE, 512)
        .expect("valid configuration");
    for &note in notes {
        synth.note_on(note, 100);
    }
    synth
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    let chord: [u8; MAX_VOICES] = [36, 43, 48, 52, 55, 60, 64, 67];

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // === SINGLE VOICE ===
        // Baseline cost of one sawtooth voice plus the shared LFO and noise
        let mut synth = engine(held_params(), &chord[..1]);
        group.bench_with_input(BenchmarkId::new("one_voice", size), &size, |b, _| {
            b.iter(|| {
                synth.render(black_box(&mut left), Some(black_box(&mut right)));
            })
        });

        // === FULL POOL ===
        let mut synth = engine(held_params(), &chord);
        group.bench_with_input(BenchmarkId::new("eight_voices", size), &size, |b, _| {
            b.iter(|| {
                synth.render(black_box(&mut left), Some(black_box(&mut right)));
            })
        });

        // === DETUNED PAIR WITH NOISE AND VIBRATO ===
        // Both oscillators running, LFO modulation on every tick
        let mut params = held_params();
        params.osc_mix = 1.0;
        params.detune = 1.006;
        params.noise_mix = 0.1;
        params.vibrato = 0.01;
        params.filter_lfo_depth = 0.5;
        let mut synth = engine(params, &chord);
        group.bench_with_input(BenchmarkId::new("eight_voices_fat", size), &size, |b, _| {
            b.iter(|| {
                synth.render(black_box(&mut left), Some(black_box(&mut right)));
            })
        });

        // === MONO DOWNMIX ===
        let mut synth = engine(held_params(), &chord);
        group.bench_with_input(BenchmarkId::new("eight_voices_mono", size), &size, |b, _| {
            b.iter(|| {
                synth.render(black_box(&mut left), None);
            })
        });

        // === MONO LEAD WITH GLIDE ===
        // Legato retargeting every block keeps the glide running
        let mut params = held_params();
        params.poly_mode = PolyMode::Mono;
        params.glide_mode = GlideMode::Always;
        let mut synth = engine(params, &[48]);
        let mut flip = false;
        group.bench_with_input(BenchmarkId::new("mono_glide", size), &size, |b, _| {
            b.iter(|| {
                flip = !flip;
                synth.note_on(if flip { 60 } else { 48 }, 100);
                synth.render(black_box(&mut left), Some(black_box(&mut right)));
            })
        });
    }

    group.finish();
}
