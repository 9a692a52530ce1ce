use std::f32::consts::{FRAC_PI_4, PI};

/*
Band-Limited Impulse Train (BLIT)
=================================

A naive sawtooth (a ramp that snaps back every cycle) has infinitely many
harmonics. Everything above Nyquist folds back down as aliasing: inharmonic
whistles that get worse the higher the note. This oscillator avoids that by
never producing the sharp edge directly.

Instead it emits one band-limited pulse per cycle, a sinc, and lets the voice
integrate the pulses:

    pulses     │    │    │    │       sinc(x) = sin(x) / x
               ┴────┴────┴────┴──

    − dc       constant offset, so the area of one cycle sums to zero

    integrated ╱│  ╱│  ╱│  ╱│        (leaky integrator in the voice)
              ╱ │ ╱ │ ╱ │ ╱ │

A sinc sampled at integer positions contains nothing above Nyquist, so the
sawtooth built from it is band-limited too.

Vocabulary
----------

  period      Samples per cycle. May change at any time but is only picked up
              at the next cycle boundary, so a cycle is never torn.

  modulation  Multiplier on the period (1.0 = none). Vibrato and PWM land here.

  phase       Position inside the pulse in units of "samples × π", so the
              sinc is just sin(phase) / phase without extra multiplies.

  phase_max   Halfway point between two peaks. The pulse is symmetric, so the
              oscillator only computes one half and plays it back mirrored.

  dc          Per-sample offset subtracted from the pulse train. Integrating
              a train of unit pulses alone would ramp up forever.


Ping-Pong Phase
---------------

Instead of counting 0 → period and wrapping, the phase counts up from the peak
to phase_max, reflects, and counts back down to the next peak:

    phase_max ┤      ╱╲          ╱╲
              │     ╱  ╲        ╱  ╲
            0 ┼────╯    ╲──────╯    ╲──
                 peak   peak       peak

Each peak is where `phase <= π/4` becomes true again. At that moment the
oscillator reads the new period, recomputes phase_max, dc and the increment,
and reseeds the sine recursion below.


Sine Without sin()
------------------

Calling sin() every sample is expensive. For a fixed increment, consecutive
values of sin(phase) obey

    sin(x + inc) = 2·cos(inc)·sin(x) − sin(x − inc)

so after one sin()/cos() at each peak the oscillator only needs one multiply
and one subtract per sample. The reflection at phase_max keeps the recursion
valid: sin is symmetric around the reflected point in exactly the same way the
phase is, so the recursion carries straight through it.


Square Waves
------------

Two sawtooths subtracted from each other with a half-cycle offset make a pulse
wave. `square_wave()` seeds this oscillator's phase half a period away from
another oscillator so that the pair forms a square when the voice subtracts
them.
*/

/// Peaks closer to zero than this are treated as exactly on the sample.
const PEAK_EPSILON: f32 = 1e-9;

#[derive(Debug, Clone)]
pub struct BlitOscillator {
    /// Period in samples. Takes effect at the next cycle.
    pub period: f32,
    /// Multiplier applied to the period (1.0 = no modulation).
    pub modulation: f32,
    /// Output level.
    pub amplitude: f32,

    phase: f32,
    phase_max: f32,
    inc: f32,

    // Direct form sine oscillator
    sin0: f32,
    sin1: f32,
    dsin: f32,

    dc: f32,
}

impl BlitOscillator {
    pub fn new() -> Self {
        Self {
            period: 0.0,
            modulation: 1.0,
            amplitude: 1.0,
            phase: 0.0,
            phase_max: 0.0,
            inc: 0.0,
            sin0: 0.0,
            sin1: 0.0,
            dsin: 0.0,
            dc: 0.0,
        }
    }

    /// Clear the running phase. Period, modulation and amplitude are kept.
    pub fn reset(&mut self) {
        self.inc = 0.0;
        self.phase = 0.0;
        self.sin0 = 0.0;
        self.sin1 = 0.0;
        self.dsin = 0.0;
        self.dc = 0.0;
    }

    /// Next sample of the sinc pulse train, minus the DC offset.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let output;

        self.phase += self.inc;

        if self.phase <= FRAC_PI_4 {
            let half_period = (self.period / 2.0) * self.modulation;

            // Snap the halfway point to the middle between two samples
            self.phase_max = (0.5 + half_period).floor() - 0.5;
            self.dc = 0.5 * self.amplitude / self.phase_max;
            self.phase_max *= PI;

            // Close to π, fudged so the pulse ends exactly on phase_max
            self.inc = self.phase_max / half_period;

            self.phase = -self.phase;

            self.sin0 = self.amplitude * self.phase.sin();
            self.sin1 = self.amplitude * (self.phase - self.inc).sin();
            self.dsin = 2.0 * self.inc.cos();

            output = if self.phase * self.phase > PEAK_EPSILON {
                self.sin0 / self.phase
            } else {
                self.amplitude
            };
        } else {
            if self.phase > self.phase_max {
                self.phase = self.phase_max + self.phase_max - self.phase;
                self.inc = -self.inc;
            }

            let sinp = self.dsin * self.sin0 - self.sin1;
            self.sin1 = self.sin0;
            self.sin0 = sinp;

            output = sinp / self.phase;
        }

        output - self.dc
    }

    /// Put this oscillator half a cycle away from `other` so the two combine
    /// into a square wave. `new_period` is the period (in samples) of the
    /// note about to start.
    pub fn square_wave(&mut self, other: &BlitOscillator, new_period: f32) {
        self.reset();

        if other.inc > 0.0 {
            // Other is counting up: mirror its position around its phase_max
            self.phase = other.phase_max + other.phase_max - other.phase;
            self.inc = -other.inc;
        } else if other.inc < 0.0 {
            self.phase = other.phase;
            self.inc = other.inc;
        } else {
            // Other has not started yet; its increment will be close to π
            self.phase = -PI;
            self.inc = PI;
        }

        self.phase += PI * new_period / 2.0;
        self.phase_max = self.phase;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn increment(&self) -> f32 {
        self.inc
    }
}

impl Default for BlitOscillator {
    fn default() -> Self {
        Self::new()
    }
}
