use log::LevelFilter;
use smf_player::vlq;
use smf_player::EventSink;
use std::io::Write;
use std::sync::Once;

static LOGGER: Once = Once::new();

pub fn enable_logging() {
    LOGGER.call_once(logger_init)
}

fn logger_init() {
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Trace)
        .is_test(true)
        .init();
}

pub const GM_RESET: [u8; 6] = [0xF0, 0x7E, 0x7F, 0x09, 0x01, 0xF7];

/// A sink that remembers every message it receives.
#[derive(Debug, Default)]
pub struct Recorder {
    pub messages: Vec<Vec<u8>>,
}

impl EventSink for Recorder {
    fn deliver(&mut self, message: &[u8]) {
        self.messages.push(message.to_vec())
    }
}

/// Builds the bytes of a format 0 file in memory.
pub struct SmfBuilder {
    format: u16,
    tracks: u16,
    division: u16,
    track: Vec<u8>,
    track_length: Option<u32>,
}

impl SmfBuilder {
    pub fn new(division: u16) -> Self {
        Self {
            format: 0,
            tracks: 1,
            division,
            track: Vec::new(),
            track_length: None,
        }
    }

    pub fn format(mut self, format: u16) -> Self {
        self.format = format;
        self
    }

    pub fn tracks(mut self, tracks: u16) -> Self {
        self.tracks = tracks;
        self
    }

    /// Overrides the track length written in the track chunk header.
    pub fn track_length(mut self, length: u32) -> Self {
        self.track_length = Some(length);
        self
    }

    pub fn delta(mut self, ticks: u32) -> Self {
        self.track.extend(vlq::to_bytes(&[ticks]));
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.track.extend_from_slice(bytes);
        self
    }

    /// A delta-time followed by an event.
    pub fn event(self, ticks: u32, bytes: &[u8]) -> Self {
        self.delta(ticks).raw(bytes)
    }

    pub fn tempo(self, ticks: u32, micros_per_quarter: u32) -> Self {
        let b = micros_per_quarter.to_be_bytes();
        self.event(ticks, &[0xFF, 0x51, 0x03, b[1], b[2], b[3]])
    }

    pub fn sysex(self, ticks: u32, payload: &[u8]) -> Self {
        let mut bytes = vec![0xF0];
        bytes.extend(vlq::to_bytes(&[payload.len() as u32]));
        bytes.extend_from_slice(payload);
        self.event(ticks, &bytes)
    }

    pub fn end_of_track(self, ticks: u32) -> Self {
        self.event(ticks, &[0xFF, 0x2F, 0x00])
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&6u32.to_be_bytes());
        bytes.extend_from_slice(&self.format.to_be_bytes());
        bytes.extend_from_slice(&self.tracks.to_be_bytes());
        bytes.extend_from_slice(&self.division.to_be_bytes());
        bytes.extend_from_slice(b"MTrk");
        let length = self.track_length.unwrap_or(self.track.len() as u32);
        bytes.extend_from_slice(&length.to_be_bytes());
        bytes.extend_from_slice(&self.track);
        bytes
    }
}
