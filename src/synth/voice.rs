use std::f32::consts::FRAC_PI_4;

use crate::dsp::{envelope::Envelope, filter::SVFilter, oscillator::BlitOscillator};

/*
Voice
=====

One playable note. Every voice in the pool is built once and reused for the
lifetime of the engine.

Signal Flow
-----------

    osc1 ──(+)──┐
                ├─► leaky integrator ─(+)─► SVF lowpass ─► × amp env ─► out
    osc2 ──(−)──┘        saw              │
                                        noise

Both oscillators emit band-limited pulse trains. The integrator turns their
difference into a sawtooth (osc 2 silent) or a pulse/square wave (osc 2
audible and offset). The 0.997 leak keeps the integrator from drifting off
to infinity on rounding errors.

Two Rates
---------

  audio rate   `render()` runs every sample: oscillators, integrator, filter,
               amplitude envelope.

  LFO rate     `update_lfo()` runs every 32 samples: glide, filter envelope,
               cutoff modulation and the filter's tan().

The filter envelope therefore advances once per LFO tick, which is why its
multipliers are computed for the tick rate rather than the sample rate.

Note Field
----------

    Idle          not playing anything
    Key(n)        sounding MIDI note n, key still held
    Sustained     key released but the sustain pedal keeps it sounding

A `Sustained` voice ignores ordinary note-offs. Only releasing the pedal
releases it.
*/

/// Integrator leak per sample.
const SAW_LEAK: f32 = 0.997;

/// Cutoff limits in Hz. Keeps tan() inside the filter well-behaved.
const MIN_CUTOFF: f32 = 30.0;
const MAX_CUTOFF: f32 = 20_000.0;

/// Constant-power center gain, sin(π/4).
const CENTER_PAN: f32 = 0.707;

/// Notes more than this many semitones away from middle C pan fully.
const PAN_WIDTH: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceNote {
    #[default]
    Idle,
    Key(u8),
    Sustained,
}

impl VoiceNote {
    /// The MIDI note, if a key is still holding this voice.
    pub fn key(self) -> Option<u8> {
        match self {
            VoiceNote::Key(note) => Some(note),
            _ => None,
        }
    }

    pub fn is_key_down(self) -> bool {
        matches!(self, VoiceNote::Key(_))
    }
}

#[derive(Debug, Clone)]
pub struct Voice {
    pub(crate) note: VoiceNote,

    /// Current period in samples, gliding towards `target`.
    pub(crate) period: f32,
    pub(crate) target: f32,

    pub(crate) osc1: BlitOscillator,
    pub(crate) osc2: BlitOscillator,
    saw: f32,

    pub(crate) env: Envelope,
    pub(crate) filter_env: Envelope,
    pub(crate) filter: SVFilter,

    /// Base cutoff from pitch and velocity, in Hz.
    pub(crate) cutoff: f32,

    // Copied in from the engine once per block or per LFO tick
    pub(crate) filter_q: f32,
    pub(crate) filter_mod: f32,
    pub(crate) glide_rate: f32,
    pub(crate) pitch_bend: f32,
    pub(crate) filter_env_depth: f32,

    pan_left: f32,
    pan_right: f32,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            note: VoiceNote::Idle,
            period: 0.0,
            target: 0.0,
            osc1: BlitOscillator::new(),
            osc2: BlitOscillator::new(),
            saw: 0.0,
            env: Envelope::new(),
            filter_env: Envelope::new(),
            filter: SVFilter::new(sample_rate),
            cutoff: 0.0,
            filter_q: 1.0,
            filter_mod: 0.0,
            glide_rate: 1.0,
            pitch_bend: 1.0,
            filter_env_depth: 0.0,
            pan_left: CENTER_PAN,
            pan_right: CENTER_PAN,
        }
    }

    /// Return to a clean, reusable state. The filter keeps its sample rate.
    pub fn reset(&mut self) {
        self.note = VoiceNote::Idle;
        self.saw = 0.0;

        self.osc1.reset();
        self.osc2.reset();
        self.env.reset();
        self.filter_env.reset();
        self.filter.reset();

        self.pan_left = CENTER_PAN;
        self.pan_right = CENTER_PAN;
    }

    /// One sample of this voice. `input` is mixed in before the filter.
    #[inline]
    pub fn render(&mut self, input: f32) -> f32 {
        let sample1 = self.osc1.next_sample();
        let sample2 = self.osc2.next_sample();

        self.saw = self.saw * SAW_LEAK + sample1 - sample2;

        let output = self.filter.render(self.saw + input);
        output * self.env.next_value()
    }

    /// Per-tick work: glide, filter envelope, new filter coefficients.
    pub fn update_lfo(&mut self) {
        self.period += self.glide_rate * (self.target - self.period);

        let filter_env = self.filter_env.next_value();

        let modulated_cutoff = self.cutoff
            * (self.filter_mod + self.filter_env_depth * filter_env).exp()
            / self.pitch_bend;
        let modulated_cutoff = modulated_cutoff.clamp(MIN_CUTOFF, MAX_CUTOFF);

        self.filter.update_coefficients(modulated_cutoff, self.filter_q);
    }

    /// Constant-power pan from the note number: middle C in the center,
    /// two octaves either side fully left or right.
    pub fn update_panning(&mut self) {
        let Some(note) = self.note.key() else {
            self.pan_left = CENTER_PAN;
            self.pan_right = CENTER_PAN;
            return;
        };

        let panning = ((note as f32 - 60.0) / PAN_WIDTH).clamp(-1.0, 1.0);
        self.pan_left = (FRAC_PI_4 * (1.0 - panning)).sin();
        self.pan_right = (FRAC_PI_4 * (1.0 + panning)).sin();
    }

    pub fn release(&mut self) {
        self.env.release();
        self.filter_env.release();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.env.is_active()
    }

    pub fn note(&self) -> VoiceNote {
        self.note
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn target_period(&self) -> f32 {
        self.target
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn saw(&self) -> f32 {
        self.saw
    }

    pub fn envelope(&self) -> &Envelope {
        &self.env
    }

    pub fn filter_envelope(&self) -> &Envelope {
        &self.filter_env
    }

    pub fn filter(&self) -> &SVFilter {
        &self.filter
    }

    pub fn oscillators(&self) -> (&BlitOscillator, &BlitOscillator) {
        (&self.osc1, &self.osc2)
    }

    /// `(left, right)` gains.
    pub fn pan(&self) -> (f32, f32) {
        (self.pan_left, self.pan_right)
    }
}
