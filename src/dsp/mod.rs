//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; note handling and modulation routing live in
//! `synth`.

/// Exponential attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Resonant state-variable low-pass filter.
pub mod filter;
/// Output buffer clipping and fault silencing.
pub mod guard;
/// Control-rate sine LFO.
pub mod lfo;
/// Linear-congruential white noise.
pub mod noise;
/// Band-limited impulse train oscillator.
pub mod oscillator;
/// Linear ramps for de-zippering parameter changes.
pub mod smoother;

pub use envelope::{Envelope, EnvelopeParams, EnvelopeStage};
pub use filter::SVFilter;
pub use noise::NoiseGenerator;
pub use oscillator::BlitOscillator;
