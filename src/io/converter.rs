use crate::{
    io::midi::MidiEvent,
    synth::message::{cc, SynthMessage},
};

/// Map a decoded MIDI event onto the engine's control vocabulary.
///
/// The engine is omni: the channel is ignored. Program changes have no
/// engine meaning and map to `None`.
pub fn midi_to_synth(midi: MidiEvent) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff { key, velocity, .. } => Some(SynthMessage::NoteOff {
            note: key,
            velocity,
        }),
        MidiEvent::ControlChange { controller, .. } if controller >= cc::ALL_NOTES_OFF_START => {
            Some(SynthMessage::AllNotesOff)
        }
        MidiEvent::ControlChange {
            controller, value, ..
        } => Some(SynthMessage::ControlChange { controller, value }),
        MidiEvent::ChannelPressure { pressure, .. } => {
            Some(SynthMessage::ChannelPressure { pressure })
        }
        MidiEvent::PitchBend { value, .. } => Some(SynthMessage::PitchBend { value }),
        MidiEvent::ProgramChange { .. } => None,
    }
}
