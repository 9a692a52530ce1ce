pub mod dsp; // Allocation-free signal primitives
pub mod error;
pub mod io; // MIDI decoding and message conversion
pub mod synth; // Voice management and polyphony

pub use error::EngineError;
pub use synth::{
    message::{MessageReceiver, SynthMessage},
    params::{GlideMode, PolyMode, SynthParams},
    poly::Synth,
    voice::{Voice, VoiceNote},
};

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Size of the fixed voice pool.
pub const MAX_VOICES: usize = 8;
