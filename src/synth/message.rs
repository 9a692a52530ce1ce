#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Control events understood by the engine, already stripped of MIDI channel
/// and status-byte details. Data values are 7-bit unless noted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    ControlChange { controller: u8, value: u8 },
    ChannelPressure { pressure: u8 },
    /// 14-bit bend, 8192 = centered. Kept raw rather than in cents: the
    /// engine maps it straight to a period multiplier,
    /// `exp(-0.000014102 * (value - 8192))`, about two semitones each way.
    PitchBend { value: u16 },
    AllNotesOff,
}

impl SynthMessage {
    /// Bend value from the two 7-bit MIDI data bytes.
    pub fn pitch_bend(lsb: u8, msb: u8) -> Self {
        SynthMessage::PitchBend {
            value: (lsb & 0x7F) as u16 | (((msb & 0x7F) as u16) << 7),
        }
    }
}

/// Controller numbers the engine responds to.
pub mod cc {
    pub const MOD_WHEEL: u8 = 0x01;
    pub const FILTER_UP_ALT: u8 = 0x15;
    pub const FILTER_DOWN_ALT: u8 = 0x16;
    pub const RESONANCE_ALT: u8 = 0x17;
    pub const SUSTAIN_PEDAL: u8 = 0x40;
    pub const RESONANCE: u8 = 0x47;
    pub const FILTER_UP: u8 = 0x4A;
    pub const FILTER_DOWN: u8 = 0x4B;
    /// First channel-mode controller. This and everything above it stops
    /// all notes.
    pub const ALL_NOTES_OFF_START: u8 = 0x78;
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_bend_assembles_14_bits() {
        assert_eq!(
            SynthMessage::pitch_bend(0x00, 0x40),
            SynthMessage::PitchBend { value: 8192 }
        );
        assert_eq!(
            SynthMessage::pitch_bend(0x7F, 0x7F),
            SynthMessage::PitchBend { value: 16383 }
        );
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn test_rtrb_consumer_receives_in_order() {
        let (mut tx, mut rx) = rtrb::RingBuffer::<SynthMessage>::new(4);
        assert!(tx.push(SynthMessage::NoteOn { note: 60, velocity: 100 }).is_ok());
        assert!(tx.push(SynthMessage::AllNotesOff).is_ok());

        let receiver: &mut dyn MessageReceiver = &mut rx;
        assert_eq!(
            receiver.pop(),
            Some(SynthMessage::NoteOn { note: 60, velocity: 100 })
        );
        assert_eq!(receiver.pop(), Some(SynthMessage::AllNotesOff));
        assert_eq!(receiver.pop(), None);
    }
}
