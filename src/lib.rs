/*!
Plays a Standard MIDI File (format 0, one track) by streaming its events, one at a time, to an
[`EventSink`]. The file is decoded incrementally while it plays, it is never loaded into memory.

The [`Player`] handles the file format: the header chunk, running status, system exclusive and meta
events, variable-length quantities, and tempo changes. The caller handles the clock: each
[`Player::step`] returns how long to wait before the next one.

```
use smf_player::{ErrorKind, Player};

let file: &[u8] = &[
    0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, // MThd, length 6
    0x00, 0x00, 0x00, 0x01, 0x00, 0x60,             // format 0, 1 track, 96 ticks per quarter
    0x4D, 0x54, 0x72, 0x6B, 0x00, 0x00, 0x00, 0x0C, // MTrk, length 12
    0x00, 0x90, 0x3C, 0x40,                         // note on
    0x60, 0x80, 0x3C, 0x00,                         // note off after 96 ticks
    0x00, 0xFF, 0x2F, 0x00,                         // end of track
];

let mut messages = Vec::new();
let mut player = Player::open(file, |message: &[u8]| messages.push(message.to_vec())).unwrap();
assert_eq!(96, player.step().unwrap().ticks());
assert_eq!(0, player.step().unwrap().ticks());
assert_eq!(ErrorKind::Eof, player.step().unwrap_err().kind());
drop(player.close());
assert_eq!(vec![0x90, 0x3C, 0x40], messages[0]);
assert_eq!(vec![0x80, 0x3C, 0x00], messages[1]);
// the end of track meta event arrives as its status byte alone
assert_eq!(vec![0xFF], messages[2]);
assert_eq!(vec![0xF0, 0x7E, 0x7F, 0x09, 0x01, 0xF7], messages[3]);
```
!*/

#[macro_use]
mod error;

mod byte_iter;
mod clock;
pub mod constants;
mod decoder;
mod header;
mod player;
mod sink;
mod status;
pub mod vlq;

pub use clock::{Clock, Delay};
pub use error::{Error, ErrorKind, Result};
pub use header::Header;
pub use player::{Player, PlayerSettings, PlayerState};
pub use sink::EventSink;
pub use status::StatusType;

// https://www.music.mcgill.ca/~gary/306/week9/smf.html
