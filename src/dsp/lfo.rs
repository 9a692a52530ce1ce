//! Low Frequency Oscillator (LFO) shared by all voices.

use std::f32::consts::{PI, TAU};

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running below the audible range. It does not make
sound; it moves other parameters around over time.

Vocabulary
----------

  audio-rate      Frequencies humans can hear: ~20 Hz to ~20,000 Hz.

  control-rate    Frequencies below hearing: ~0.01 Hz to ~20 Hz. "Control"
                  because the signal controls other things.

  tick            One LFO update. This LFO does not run every sample, it
                  advances once every LFO_MAX (32) samples.

  increment       Phase step per tick, in radians.

  bipolar         Output swings from -1.0 to +1.0. Vibrato wants this: the
                  pitch goes sharp AND flat around the played note.


Typical LFO Frequencies
-----------------------

    0.01 - 0.5 Hz   Slow sweeps, gradual filter movement
    0.5 - 2 Hz      Classic tremolo, auto-pan
    2 - 7 Hz        Vibrato sweet spot
    7 - 15 Hz       Fast tremolo
    > 15 Hz         Approaching audio rate (FM/AM territory)


Control-Rate Ticking
--------------------

Everything the LFO drives (vibrato, pulse width, filter cutoff) is expensive
to recompute: the filter needs a tan() and the oscillators pick up their new
period. Doing that every sample is wasted work for a 5 Hz wobble, so the
engine counts samples down and only ticks when the counter runs out:

    sample   0   1   2  ...  31  32  33  ...  63  64
    tick     ●                    ●                ●

At 44.1 kHz that is still ~1378 updates per second, far above anything the
ear can resolve as steps.

The counter starts at zero, so the very first sample of a fresh engine ticks
and every active voice gets valid filter coefficients before it renders.


Phase Wrapping
--------------

The phase lives in (-π, π]. Once it passes π it is pulled back by a full
turn, which keeps sin() accurate no matter how long the engine runs:

         π ┤    ╱    ╱    ╱
           │   ╱    ╱    ╱
        -π ┼──╯────╯────╯───
*/

/// Samples between two LFO ticks.
pub const LFO_MAX: u32 = 32;

#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f32,
    step: u32,
}

impl Lfo {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            step: 0,
        }
    }

    /// Phase increment per tick for a rate of `hz`.
    ///
    /// # Example
    /// ```
    /// use blitsynth::dsp::lfo::{Lfo, LFO_MAX};
    /// // 1 Hz at 32 kHz: 1000 ticks per second, so 1/1000 of a turn per tick
    /// let inc = Lfo::increment_for(1.0, 32_000.0);
    /// assert!((inc - std::f32::consts::TAU / 1000.0).abs() < 1e-6);
    /// assert_eq!(LFO_MAX, 32);
    /// ```
    pub fn increment_for(hz: f32, sample_rate: f32) -> f32 {
        hz * LFO_MAX as f32 * TAU / sample_rate
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.step = 0;
    }

    /// Count one sample. Returns the new sine value when the LFO ticks,
    /// `None` on every other sample.
    #[inline]
    pub fn tick(&mut self, increment: f32) -> Option<f32> {
        self.step = self.step.saturating_sub(1);
        if self.step > 0 {
            return None;
        }

        self.step = LFO_MAX;

        self.phase += increment;
        if self.phase > PI {
            self.phase -= TAU;
        }

        Some(self.phase.sin())
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new()
    }
}
