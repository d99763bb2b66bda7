use crate::byte_iter::ByteIter;
use crate::clock::{Clock, Delay};
use crate::constants::{DEFAULT_BUFFER_LEN, GM_RESET};
use crate::decoder::{EventDecoder, EventKind};
use crate::error::{self, LibResult};
use crate::header::Header;
use crate::sink::EventSink;
use crate::Result;
use log::{debug, trace, warn};
use snafu::{ensure, ResultExt};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Settings for a [`Player`]. The defaults match the behavior of a small embedded player: 256 byte
/// buffers, no tempo until the file sets one, and every decoded event delivered to the sink.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PlayerSettings {
    /// Capacity of the message buffer, status byte included. Larger messages fail with
    /// [`ErrorKind::MessageTooLong`](crate::ErrorKind::MessageTooLong).
    pub max_message_len: usize,
    /// Capacity of the buffer that receives meta event payloads.
    pub max_meta_len: usize,
    /// When `true`, nothing past the length declared by the track chunk header is read.
    pub limit_to_track: bool,
    /// When `true`, every meta event is delivered to the sink as the single byte `FF`. Set it to
    /// `false` when the sink writes to a MIDI port, where `FF` means System Reset.
    pub forward_meta: bool,
    /// Microseconds per quarter note until the file sets a tempo. `0` means delays are `0` until
    /// then; [`DEFAULT_TEMPO`](crate::constants::DEFAULT_TEMPO) assumes 120 beats per minute.
    pub initial_tempo: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_BUFFER_LEN,
            max_meta_len: DEFAULT_BUFFER_LEN,
            limit_to_track: false,
            forward_meta: true,
            initial_tempo: 0,
        }
    }
}

/// Where a [`Player`] is in its lifecycle. A closed player no longer exists, see
/// [`Player::close`].
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum PlayerState {
    /// The file has been validated and no event has been played yet.
    Open,
    /// At least one step has been taken.
    Playing,
    /// The end of the track was reached, or a step failed. Every further step reports
    /// [`ErrorKind::Eof`](crate::ErrorKind::Eof).
    Ended,
}

/// Plays a format 0 MIDI file by decoding one event at a time from `R` and delivering it to `S`.
///
/// The player never sleeps. After each [`step`](Self::step) the caller waits for the returned
/// [`Delay`] and then steps again:
///
/// ```no_run
/// # fn main() -> smf_player::Result<()> {
/// use smf_player::Player;
///
/// let mut player = Player::load("song.mid", |message: &[u8]| println!("{:02X?}", message))?;
/// std::thread::sleep(player.pending_delay().as_duration());
/// loop {
///     match player.step() {
///         Ok(delay) => std::thread::sleep(delay.as_duration()),
///         Err(e) if e.is_eof() => break,
///         Err(e) => return Err(e),
///     }
/// }
/// drop(player.close());
/// # Ok(())
/// # }
/// ```
pub struct Player<R: Read, S: EventSink> {
    iter: ByteIter<R>,
    sink: S,
    header: Header,
    decoder: EventDecoder,
    settings: PlayerSettings,
    state: PlayerState,
    /// The delta-time before the next event, always read one event ahead.
    pending_delta: u32,
    message: Vec<u8>,
}

impl<S: EventSink> Player<BufReader<File>, S> {
    /// Opens the file at `path` and validates it.
    pub fn load<P: AsRef<Path>>(path: P, sink: S) -> Result<Self> {
        Self::load_with_settings(path, sink, PlayerSettings::default())
    }

    pub fn load_with_settings<P: AsRef<Path>>(
        path: P,
        sink: S,
        settings: PlayerSettings,
    ) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening '{}'", path.display());
        let iter = ByteIter::open_file(path).context(error::FileNotFoundSnafu {
            site: site!(),
            path,
        })?;
        Ok(Self::open_inner(iter, sink, settings)?)
    }
}

impl<R: Read, S: EventSink> Player<R, S> {
    /// Validates the header chunk and track chunk header read from `reader` and reads the first
    /// delta-time. On error `reader` is dropped.
    pub fn open(reader: R, sink: S) -> Result<Self> {
        Self::open_with_settings(reader, sink, PlayerSettings::default())
    }

    pub fn open_with_settings(reader: R, sink: S, settings: PlayerSettings) -> Result<Self> {
        Ok(Self::open_inner(ByteIter::new(reader), sink, settings)?)
    }

    fn open_inner(mut iter: ByteIter<R>, sink: S, settings: PlayerSettings) -> LibResult<Self> {
        let header = Header::parse(&mut iter)?;
        if settings.limit_to_track {
            iter.set_size_limit(u64::from(header.track_length()));
        }
        let pending_delta = iter.read_vlq_u32().context(io!())?;
        debug!("first delta-time: {}", pending_delta);
        let clock = Clock::new(header.resolution(), settings.initial_tempo);
        Ok(Self {
            iter,
            sink,
            header,
            decoder: EventDecoder::new(clock, settings.max_message_len, settings.max_meta_len),
            settings,
            state: PlayerState::Open,
            pending_delta,
            message: Vec::with_capacity(settings.max_message_len),
        })
    }

    /// Plays the next event and every event that follows it with a delta-time of zero, then
    /// returns the delay before the event after those. Returns an error of kind
    /// [`ErrorKind::Eof`](crate::ErrorKind::Eof) when there is nothing left to play.
    ///
    /// An End of Track event ends playback: the step returns a zero delay and the next step reports
    /// the end of the stream.
    pub fn step(&mut self) -> Result<Delay> {
        let result = self.step_inner();
        if let Err(e) = &result {
            if self.state != PlayerState::Ended {
                debug!("playback ended: {}", e);
            }
            self.state = PlayerState::Ended;
        }
        Ok(result?)
    }

    fn step_inner(&mut self) -> LibResult<Delay> {
        ensure!(
            self.state != PlayerState::Ended,
            error::EndSnafu { site: site!() }
        );
        self.state = PlayerState::Playing;
        loop {
            let kind = self.decoder.decode(&mut self.iter, &mut self.message)?;
            self.deliver(kind);
            if kind.is_end_of_track() {
                debug!("end of track at byte {}", self.iter.position());
                if self.settings.limit_to_track && !self.iter.is_end() {
                    warn!("end of track event before the end of the track bytes");
                }
                self.state = PlayerState::Ended;
                self.pending_delta = 0;
                return Ok(Delay::default());
            }
            self.pending_delta = self.iter.read_vlq_u32().context(io!())?;
            trace!("delta_time {}", self.pending_delta);
            if self.pending_delta != 0 {
                return Ok(self.pending_delay());
            }
        }
    }

    fn deliver(&mut self, kind: EventKind) {
        let forward = match kind {
            EventKind::Channel(_) | EventKind::Sysex => true,
            EventKind::Escape => !self.message.is_empty(),
            EventKind::Meta(_) => self.settings.forward_meta,
        };
        if forward {
            self.sink.deliver(&self.message);
        }
    }

    /// Sends the General MIDI reset sysex (`F0 7E 7F 09 01 F7`) to the sink, closes the byte source
    /// and hands the sink back.
    pub fn close(mut self) -> S {
        debug!("closing after {} bytes", self.iter.position());
        self.sink.deliver(&GM_RESET);
        let Self { iter, sink, .. } = self;
        drop(iter);
        sink
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn clock(&self) -> &Clock {
        self.decoder.clock()
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// The delta-time, in ticks, that precedes the next event.
    pub fn pending_delta(&self) -> u32 {
        self.pending_delta
    }

    /// How long to wait before the next step. Right after opening this is the delay before the
    /// first event.
    pub fn pending_delay(&self) -> Delay {
        self.clock().delay(self.pending_delta)
    }

    /// The number of bytes of the file consumed so far.
    pub fn position(&self) -> u64 {
        self.iter.position()
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
