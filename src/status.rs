use crate::constants::STATUS_TYPE_MASK;

/// The channel message types from Table I "Summary of Status Bytes" of the MIDI specification,
/// identified by the top four bits of a status byte.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum StatusType {
    /// `0x8`: a `Note Off` message.
    NoteOff = 0x8,

    /// `0x9`: a `Note On (a velocity of 0 = Note Off)` message.
    NoteOn = 0x9,

    /// `0xA`: a `Polyphonic key pressure/Aftertouch` message.
    PolyPressure = 0xA,

    /// `0xB`: a `Control change` message or a `Channel Mode` message. Channel Mode messages are
    /// sent under the same Status Byte as the Control Change messages (BnH).
    ControlOrSelectChannelMode = 0xB,

    /// `0xC`: a `Program change` message.
    Program = 0xC,

    /// `0xD`: a `Channel pressure/After touch` message.
    ChannelPressure = 0xD,

    /// `0xE`: a `Pitch bend change` message.
    PitchBend = 0xE,
}

impl StatusType {
    /// Returns the message type of a channel status byte, or `None` for data bytes and system
    /// messages (`0xF0` and above).
    pub fn from_status(status: u8) -> Option<Self> {
        match (status & STATUS_TYPE_MASK) >> 4 {
            0x8 => Some(StatusType::NoteOff),
            0x9 => Some(StatusType::NoteOn),
            0xA => Some(StatusType::PolyPressure),
            0xB => Some(StatusType::ControlOrSelectChannelMode),
            0xC => Some(StatusType::Program),
            0xD => Some(StatusType::ChannelPressure),
            0xE => Some(StatusType::PitchBend),
            _ => None,
        }
    }

    /// The number of data bytes that follow the status byte.
    pub fn data_len(self) -> usize {
        match self {
            StatusType::NoteOff
            | StatusType::NoteOn
            | StatusType::PolyPressure
            | StatusType::ControlOrSelectChannelMode
            | StatusType::PitchBend => 2,
            StatusType::Program | StatusType::ChannelPressure => 1,
        }
    }
}

#[test]
fn status_type_from_status() {
    assert_eq!(Some(StatusType::NoteOff), StatusType::from_status(0x80));
    assert_eq!(Some(StatusType::NoteOn), StatusType::from_status(0x9f));
    assert_eq!(Some(StatusType::Program), StatusType::from_status(0xc3));
    assert_eq!(Some(StatusType::PitchBend), StatusType::from_status(0xe0));
    assert_eq!(None, StatusType::from_status(0x40));
    assert_eq!(None, StatusType::from_status(0xf0));
    assert_eq!(None, StatusType::from_status(0xff));
}

#[test]
fn status_type_data_len() {
    assert_eq!(2, StatusType::NoteOn.data_len());
    assert_eq!(2, StatusType::ControlOrSelectChannelMode.data_len());
    assert_eq!(2, StatusType::PitchBend.data_len());
    assert_eq!(1, StatusType::Program.data_len());
    assert_eq!(1, StatusType::ChannelPressure.data_len());
}
