#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Analog-Style Exponential Envelope
=================================

This module implements the envelope generator used for both the amplitude and
the filter cutoff of every voice. Unlike a linear ADSR, each stage is a
one-pole lowpass chasing a target, which is how capacitor-based analog
envelopes behave.

Vocabulary
----------

  level       The envelope's current output value. Multiplies the voice
              signal (amplitude envelope) or scales the cutoff modulation
              (filter envelope).

  target      The value the current stage is chasing.

  multiplier  Per-sample one-pole coefficient in (0, 1). Closer to 1.0 means
              slower. Computed outside the envelope from a time constant and
              injected before every attack.

  SILENCE     Below this level a voice is considered finished (-80 dB).


The One-Pole Recurrence
-----------------------

Every stage runs the same update:

    level = multiplier × (level − target) + target

The distance to the target shrinks by `multiplier` every sample, so the level
approaches the target exponentially and never overshoots it.


The Attack Trick
----------------

An exponential curve that chases 1.0 only reaches 1.0 asymptotically, and it
starts steep and ends flat. Real attack stages sound punchier than that. So
the attack chases 2.0 instead, and the stage ends the moment the level crosses
1.0:

    Level
      2.0 ┤ - - - - - - - - - - - - - - - -   (attack target, never reached)
          │
      1.0 ┤        ╭╮___________              (crossing 1.0 ends attack)
          │       ╱   ╲_______  sustain
          │      ╱            ╲
      0.0 ┼─────╯              ╲________
            attack  decay        release

The crossing test is `level + target > 3.0`. While attacking, target is 2.0,
so this is "level > 1.0". In decay and release the target never exceeds 1.0
and the level never exceeds ~1.0, so the sum can never pass 3.0. One addition
tells the stages apart.

Sustain has no code path of its own: it is the decay stage after it has
converged on the sustain level.


Timing of Activity
------------------

`attack()` bumps the level by twice SILENCE first. Without that bump a voice
triggered from level 0.0 would fail `is_active()` until the first sample was
rendered, and the voice allocator would see it as free.
*/

/// Level below which an envelope (and its voice) counts as silent.
pub const SILENCE: f32 = 0.0001;

const ATTACK_TARGET: f32 = 2.0;
const ATTACK_END: f32 = 3.0;

/// One-pole multipliers and sustain level for one envelope.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeParams {
    /// Build multipliers from time constants in seconds.
    ///
    /// `update_rate` is how often `next_value()` is called per second: the
    /// sample rate for amplitude envelopes, the LFO tick rate for filter
    /// envelopes.
    pub fn from_times(
        attack_s: f32,
        decay_s: f32,
        sustain: f32,
        release_s: f32,
        update_rate: f32,
    ) -> Self {
        Self {
            attack: time_constant_multiplier(attack_s, update_rate),
            decay: time_constant_multiplier(decay_s, update_rate),
            sustain: sustain.clamp(0.0, 1.0),
            release: time_constant_multiplier(release_s, update_rate),
        }
    }
}

/// One-pole coefficient that shrinks the distance to the target by 1/e
/// every `seconds`.
pub fn time_constant_multiplier(seconds: f32, update_rate: f32) -> f32 {
    if seconds <= 0.0 || update_rate <= 0.0 {
        return 0.0;
    }
    (-1.0 / (seconds * update_rate)).exp()
}

/// The stage the envelope is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,    // Freshly reset, level = 0
    Attack,  // Chasing 2.0 until the level passes 1.0
    Decay,   // Chasing the sustain level (and then holding it)
    Release, // Chasing 0.0
}

#[derive(Debug, Clone)]
pub struct Envelope {
    params: EnvelopeParams,

    level: f32,
    target: f32,
    multiplier: f32,
    stage: EnvelopeStage,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            params: EnvelopeParams {
                attack: 0.0,
                decay: 0.0,
                sustain: 0.0,
                release: 0.0,
            },
            level: 0.0,
            target: 0.0,
            multiplier: 0.0,
            stage: EnvelopeStage::Idle,
        }
    }

    /// Install the coefficients for the next note.
    ///
    /// The same envelope is reused for every note its voice plays, so this is
    /// called right before each `attack()`.
    pub fn set_params(&mut self, params: EnvelopeParams) {
        self.params = params;
    }

    pub fn params(&self) -> EnvelopeParams {
        self.params
    }

    /// Advance one step and return the new level.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.level = self.multiplier * (self.level - self.target) + self.target;

        if self.level + self.target > ATTACK_END {
            self.multiplier = self.params.decay;
            self.target = self.params.sustain;
            self.stage = EnvelopeStage::Decay;
        }

        self.level
    }

    /// Gate high. Starts from the current level, so retriggering a sounding
    /// voice does not click.
    pub fn attack(&mut self) {
        self.keep_alive();
        self.target = ATTACK_TARGET;
        self.multiplier = self.params.attack;
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low: fade towards zero from wherever the level is.
    pub fn release(&mut self) {
        self.target = 0.0;
        self.multiplier = self.params.release;
        self.stage = EnvelopeStage::Release;
    }

    /// Lift the level just above the silence threshold without changing stage.
    ///
    /// Used when a mono voice is retargeted to a new note legato-style.
    pub fn keep_alive(&mut self) {
        self.level += SILENCE + SILENCE;
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
        self.target = 0.0;
        self.multiplier = 0.0;
        self.stage = EnvelopeStage::Idle;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.level > SILENCE
    }

    #[inline]
    pub fn is_in_attack(&self) -> bool {
        self.target >= ATTACK_TARGET
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
