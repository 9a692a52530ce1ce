#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{envelope::EnvelopeParams, lfo::Lfo},
    error::EngineError,
};

/*
Engine Tunables
===============

Everything the player can turn lives here, already converted into the units
the engine computes with. Mapping knob positions (percentages, cents, dB) onto
these numbers is the job of whatever parameter layer sits in front of the
engine.

Vocabulary
----------

  multiplier   Envelope coefficients are one-pole multipliers, not times.
               See `EnvelopeParams::from_times`.

  period       Pitches are expressed as periods in samples. `tune` is the
               period of MIDI note 0; each semitone up divides it by 2^(1/12).

  detune       Multiplier on osc 2's period. 1.0 = unison; above 1.0 is flat.

  trim         Fixed gain that keeps the level roughly constant across patch
               changes. `output_level` is the user-facing master gain.


Update Cadence
--------------

The engine reads these at block boundaries and at note starts. A change made
mid-block is picked up by the next `render()` call, a change to the
envelopes by the next note-on.
*/

/// Distance between semitones in the exponent of a period: ln(2) / 12.
pub(crate) const SEMITONE: f32 = 0.057_762_265;

/// Offset that puts MIDI note 69 on 440 Hz.
const A440_SEMITONES: f32 = -36.3763;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolyMode {
    /// One voice; new keys take over the sounding note legato-style.
    Mono,
    /// Every voice in the pool is available.
    #[default]
    Poly,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlideMode {
    /// Notes start at their own pitch (plus `glide_bend`).
    #[default]
    Off,
    /// Glide from the previous note only while another key is still held.
    Legato,
    /// Always glide from the previous note.
    Always,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthParams {
    /// Gain of the white noise mixed into every voice.
    pub noise_mix: f32,

    /// Amplitude envelope, per-sample multipliers.
    pub amp_envelope: EnvelopeParams,

    /// Level of osc 2 relative to osc 1. Osc 2 is subtracted, so with no
    /// detune the two cancel out.
    pub osc_mix: f32,
    /// Period multiplier for osc 2.
    pub detune: f32,
    /// Period in samples of MIDI note 0.
    pub tune: f32,

    pub poly_mode: PolyMode,

    pub volume_trim: f32,
    /// Master output gain. Changes are ramped over 50 ms.
    pub output_level: f32,

    /// How strongly velocity moves the filter cutoff.
    pub velocity_sensitivity: f32,
    /// Play every note at velocity 80.
    pub ignore_velocity: bool,

    /// LFO phase step per tick, see `Lfo::increment_for`.
    pub lfo_increment: f32,
    pub vibrato: f32,
    pub pwm_depth: f32,

    pub glide_mode: GlideMode,
    /// One-pole glide coefficient applied each LFO tick. 1.0 = no glide.
    pub glide_rate: f32,
    /// Semitones every new note bends in from. Applied even with glide off.
    pub glide_bend: f32,

    /// Cutoff shift, in the exponent, on top of the pitch-derived cutoff.
    pub filter_key_tracking: f32,
    pub filter_q: f32,
    pub filter_lfo_depth: f32,
    /// Filter envelope, per-LFO-tick multipliers.
    pub filter_envelope: EnvelopeParams,
    pub filter_env_depth: f32,
}

impl SynthParams {
    /// A plain sawtooth patch with a short filter sweep, tuned for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        let tick_rate = sample_rate / crate::dsp::lfo::LFO_MAX as f32;

        Self {
            noise_mix: 0.0,
            amp_envelope: EnvelopeParams::from_times(0.004, 0.17, 1.0, 0.04, sample_rate),
            osc_mix: 0.0,
            detune: 1.0,
            tune: Self::tune_for(sample_rate, 0.0),
            poly_mode: PolyMode::Poly,
            volume_trim: 0.0036,
            output_level: 1.0,
            velocity_sensitivity: 0.01,
            ignore_velocity: false,
            lfo_increment: Lfo::increment_for(5.3, sample_rate),
            vibrato: 0.0,
            pwm_depth: 0.0,
            glide_mode: GlideMode::Off,
            glide_rate: 0.015,
            glide_bend: 0.0,
            filter_key_tracking: 3.0,
            filter_q: 1.5,
            filter_lfo_depth: 0.0,
            filter_envelope: EnvelopeParams::from_times(0.01, 0.3, 0.0, 0.3, tick_rate),
            filter_env_depth: 1.5,
        }
    }

    /// Period of MIDI note 0 so that note 69 sounds at 440 Hz, shifted by
    /// `semitones` (positive is sharper).
    pub fn tune_for(sample_rate: f32, semitones: f32) -> f32 {
        sample_rate * (SEMITONE * (A440_SEMITONES - semitones)).exp()
    }

    /// Reject values the engine cannot render sensibly.
    pub fn validate(&self) -> Result<(), EngineError> {
        let finite = [
            ("noise_mix", self.noise_mix),
            ("amp_envelope.attack", self.amp_envelope.attack),
            ("amp_envelope.decay", self.amp_envelope.decay),
            ("amp_envelope.sustain", self.amp_envelope.sustain),
            ("amp_envelope.release", self.amp_envelope.release),
            ("osc_mix", self.osc_mix),
            ("volume_trim", self.volume_trim),
            ("output_level", self.output_level),
            ("velocity_sensitivity", self.velocity_sensitivity),
            ("lfo_increment", self.lfo_increment),
            ("vibrato", self.vibrato),
            ("pwm_depth", self.pwm_depth),
            ("glide_bend", self.glide_bend),
            ("filter_key_tracking", self.filter_key_tracking),
            ("filter_lfo_depth", self.filter_lfo_depth),
            ("filter_envelope.attack", self.filter_envelope.attack),
            ("filter_envelope.decay", self.filter_envelope.decay),
            ("filter_envelope.sustain", self.filter_envelope.sustain),
            ("filter_envelope.release", self.filter_envelope.release),
            ("filter_env_depth", self.filter_env_depth),
        ];
        if let Some(&(name, value)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(EngineError::InvalidParameter { name, value });
        }

        let positive = [
            ("tune", self.tune),
            ("detune", self.detune),
            ("filter_q", self.filter_q),
        ];
        if let Some(&(name, value)) = positive
            .iter()
            .find(|(_, value)| !(value.is_finite() && *value > 0.0))
        {
            return Err(EngineError::InvalidParameter { name, value });
        }

        if !(self.glide_rate > 0.0 && self.glide_rate <= 1.0) {
            return Err(EngineError::InvalidParameter {
                name: "glide_rate",
                value: self.glide_rate,
            });
        }

        Ok(())
    }
}

impl Default for SynthParams {
    fn default() -> Self {
        Self::new(44_100.0)
    }
}
