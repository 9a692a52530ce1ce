// Purpose: Voice management, polyphony, MIDI handling
// This layer sits above the DSP primitives and manages the voice pool

pub mod held_notes;
pub mod message;
pub mod params;
pub mod poly;
pub mod voice;
