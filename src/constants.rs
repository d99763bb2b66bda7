//! Byte values from the MIDI and Standard MIDI File specifications.

/// `MThd`: the tag that starts every MIDI file.
pub const HEADER_MAGIC: u32 = 0x4D54_6864;

/// `MTrk`: the tag that starts a track chunk.
pub const TRACK_MAGIC: u32 = 0x4D54_726B;

/// The header chunk length is always 6.
pub const HEADER_LENGTH: u32 = 6;

/// If bit 15 of the division is set, the file uses SMPTE time code instead of ticks per quarter.
pub(crate) const DIVISION_TYPE_BIT: u16 = 0b1000_0000_0000_0000;

/// To extract the message type from a status byte. The left most four bits of a status byte
/// represent the message type.
pub(crate) const STATUS_TYPE_MASK: u8 = 0b1111_0000;

/// A status byte always has its highest bit set, a data byte never does.
pub(crate) const STATUS_BIT: u8 = 0b1000_0000;

/// `0xFF`: File Spec: All meta-events begin with FF, then have an event type byte (which is always
/// less than 128)
pub const FILE_META_EVENT: u8 = 0b1111_1111;

/// `0xF0`: File Spec: `F0 <length> <bytes to be transmitted after F0>`
pub const FILE_SYSEX_F0: u8 = 0b1111_0000;

/// `0xF7`: File Spec: `F7 <length> <all bytes to be transmitted>`
pub const FILE_SYSEX_F7: u8 = 0b1111_0111;

/// `FF 51 03 tttttt`: Set Tempo, in microseconds per MIDI quarter-note.
pub const META_SET_TEMPO: u8 = 0x51;

/// The number of payload bytes that carry the tempo in a Set Tempo event.
pub(crate) const LEN_META_SET_TEMPO: usize = 3;

/// `FF 2F 00`: End of Track.
pub const META_END_OF_TRACK: u8 = 0x2F;

/// The largest value a 24-bit unsigned integer can hold.
pub(crate) const MAX_24BIT_UINT_VALUE: u32 = 0x00FF_FFFF;

/// 120 beats per minute, the tempo a sequencer assumes when a file does not set one.
pub const DEFAULT_TEMPO: u32 = 500_000;

/// The General MIDI System On message. Sent when a player closes so that no note is left
/// sounding.
pub const GM_RESET: [u8; 6] = [0xF0, 0x7E, 0x7F, 0x09, 0x01, 0xF7];

/// The capacity of the message and meta buffers when nothing else is configured.
pub const DEFAULT_BUFFER_LEN: usize = 256;
