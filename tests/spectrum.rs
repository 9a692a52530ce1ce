use std::f32::consts::PI;

use blitsynth::{Synth, SynthParams};
use rustfft::{num_complex::Complex, FftPlanner};

const SAMPLE_RATE: f32 = 44_100.0;
const FFT_SIZE: usize = 8192;

/// Equal-tempered pitch, A4 = 440 Hz.
fn note_hz(note: u8) -> f32 {
    440.0 * ((note as f32 - 69.0) / 12.0).exp2()
}

fn render_note(note: u8) -> Vec<f32> {
    let mut synth = Synth::new(SynthParams::new(SAMPLE_RATE));
    synth
        .allocate_resources(SAMPLE_RATE, 1024)
        .expect("valid configuration");
    synth.note_on(note, 100);

    // Skip the attack
    let mut warmup = vec![0.0; 2048];
    synth.render(&mut warmup, None);

    let mut out = vec![0.0; FFT_SIZE];
    for chunk in out.chunks_mut(512) {
        synth.render(chunk, None);
    }
    out
}

fn magnitudes(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let window = 0.5 - 0.5 * (2.0 * PI * i as f32 / (n - 1) as f32).cos();
            Complex::new(x * window, 0.0)
        })
        .collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    buffer[..n / 2].iter().map(|c| c.norm()).collect()
}

fn peak_frequency(samples: &[f32]) -> f32 {
    let bin_hz = SAMPLE_RATE / samples.len() as f32;
    let first_bin = (20.0 / bin_hz).ceil() as usize;

    let spectrum = magnitudes(samples);
    let (bin, _) = spectrum
        .iter()
        .enumerate()
        .skip(first_bin)
        .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best });

    bin as f32 * bin_hz
}

#[test]
fn a440_peaks_at_440() {
    let samples = render_note(69);
    let peak = peak_frequency(&samples);

    assert!((peak - 440.0).abs() < 6.0, "peak at {peak} Hz");
}

#[test]
fn fundamental_tracks_the_keyboard() {
    for note in [57u8, 64, 81] {
        let expected = note_hz(note);
        let peak = peak_frequency(&render_note(note));
        let bin_hz = SAMPLE_RATE / FFT_SIZE as f32;

        assert!(
            (peak - expected).abs() < bin_hz + expected * 0.01,
            "note {note}: peak at {peak} Hz, expected {expected}"
        );
    }
}

#[test]
fn sawtooth_has_harmonics() {
    let samples = render_note(57);
    let spectrum = magnitudes(&samples);
    let bin_hz = SAMPLE_RATE / FFT_SIZE as f32;

    let level_at = |hz: f32| {
        let center = (hz / bin_hz).round() as usize;
        spectrum[center - 2..=center + 2]
            .iter()
            .fold(0.0f32, |acc, &m| acc.max(m))
    };

    let fundamental = level_at(220.0);
    let second = level_at(440.0);
    let between = level_at(330.0);

    assert!(second > fundamental * 0.2, "second harmonic missing");
    assert!(second > between * 10.0, "energy between harmonics");
}
