use midly::{live::LiveEvent, MidiMessage};

/// MIDI 1.0 channel-voice messages the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    /// 14-bit bend, 8192 = centered.
    PitchBend { channel: u8, value: u16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode a status byte and up to two data bytes.
    ///
    /// Data bytes are masked to 7 bits. A note-on with velocity 0 is a
    /// note-off, as running-status keyboards send it. Anything that is not a
    /// channel-voice message handled here decodes to `None`.
    pub fn from_bytes(status: u8, data1: u8, data2: u8) -> Option<Self> {
        let len = message_len(status)?;
        let raw = [status, data1 & 0x7F, data2 & 0x7F];
        Self::parse(&raw[..len])
    }

    /// Decode a raw message of at most three bytes. Longer messages (system
    /// exclusive and friends) and empty ones are rejected. Missing data bytes
    /// read as zero.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [status] => Self::from_bytes(status, 0, 0),
            [status, data1] => Self::from_bytes(status, data1, 0),
            [status, data1, data2] => Self::from_bytes(status, data1, data2),
            _ => None,
        }
    }

    fn parse(raw: &[u8]) -> Option<Self> {
        let LiveEvent::Midi { channel, message } = LiveEvent::parse(raw).ok()? else {
            return None;
        };
        let channel = channel.as_int();

        let event = match message {
            MidiMessage::NoteOff { key, vel } => MidiEvent::NoteOff {
                channel,
                key: key.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => MidiEvent::NoteOff {
                channel,
                key: key.as_int(),
                velocity: 0,
            },
            MidiMessage::NoteOn { key, vel } => MidiEvent::NoteOn {
                channel,
                key: key.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::Controller { controller, value } => MidiEvent::ControlChange {
                channel,
                controller: controller.as_int(),
                value: value.as_int(),
            },
            MidiMessage::ChannelAftertouch { vel } => MidiEvent::ChannelPressure {
                channel,
                pressure: vel.as_int(),
            },
            MidiMessage::PitchBend { bend } => MidiEvent::PitchBend {
                channel,
                value: bend.0.as_int(),
            },
            MidiMessage::ProgramChange { program } => MidiEvent::ProgramChange {
                channel,
                program: program.as_int(),
            },
            // Polyphonic aftertouch has no engine meaning
            MidiMessage::Aftertouch { .. } => return None,
        };

        Some(event)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::ChannelPressure { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

/// Length of the channel-voice message that starts with `status`.
fn message_len(status: u8) -> Option<usize> {
    match status & 0xF0 {
        0x80 | 0x90 | 0xA0 | 0xB0 | 0xE0 => Some(3),
        0xC0 | 0xD0 => Some(2),
        _ => None,
    }
}

/// A raw MIDI message positioned inside the block being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedMidi<'a> {
    /// Sample index inside the block at which the message applies.
    pub sample_offset: usize,
    pub bytes: &'a [u8],
}

impl<'a> TimedMidi<'a> {
    pub fn new(sample_offset: usize, bytes: &'a [u8]) -> Self {
        Self {
            sample_offset,
            bytes,
        }
    }
}
