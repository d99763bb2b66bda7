use snafu::Snafu;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// The public Error type for this library.
#[derive(Debug, Snafu)]
pub struct Error(LibError);

/// The public Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// The internal Result type for this library.
pub(crate) type LibResult<T> = std::result::Result<T, LibError>;

/// The kinds of failure a [`Player`](crate::Player) can report. Every [`Error`] belongs to exactly
/// one of these.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum ErrorKind {
    /// The file could not be opened.
    FileNotFound,
    /// The stream ended, was truncated, or could not be decoded any further. During playback this
    /// means "no more events".
    Eof,
    /// The file does not start with `MThd`.
    BadMagic,
    /// The header chunk length is not 6.
    BadHeaderLength,
    /// The file is not format 0.
    UnsupportedFormat,
    /// The file does not hold exactly one track.
    UnsupportedTrackCount,
    /// The division is zero or uses SMPTE time code.
    UnsupportedResolution,
    /// The header chunk is not followed by `MTrk`.
    TrackNotFound,
    /// The track chunk declares a length of zero.
    BadTrackLength,
    /// A message or meta payload is larger than the configured buffer.
    MessageTooLong,
}

impl Error {
    /// The kind of failure, for callers that need to branch on it.
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }

    /// Returns `true` if this is the end of the stream, i.e. playback is over.
    pub fn is_eof(&self) -> bool {
        self.kind() == ErrorKind::Eof
    }
}

/// The internal Error type for this library.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum LibError {
    #[snafu(display("{} Unable to open '{}': {}", site, path.display(), source))]
    FileNotFound {
        site: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{} Error while reading data: {}", site, source))]
    Read {
        site: String,
        source: crate::byte_iter::ByteError,
    },

    #[snafu(display("{} The track has no more events", site))]
    End { site: String },

    #[snafu(display(
        "{} Data byte {:#04X} found with no usable running status {:#04X} near position {}",
        site,
        byte,
        running_status,
        position
    ))]
    MissingStatus {
        site: String,
        byte: u8,
        running_status: u8,
        position: u64,
    },

    #[snafu(display(
        "{} Status byte {:#04X} cannot appear in a MIDI file, near position {}",
        site,
        status,
        position
    ))]
    UnexpectedStatus {
        site: String,
        status: u8,
        position: u64,
    },

    #[snafu(display("{} Expected tag 'MThd' but found {}", site, found))]
    BadMagic { site: String, found: Found },

    #[snafu(display("{} Header chunk length must be 6, found {}", site, found))]
    BadHeaderLength { site: String, found: Found },

    #[snafu(display("{} Only format 0 files are supported, found {}", site, found))]
    UnsupportedFormat { site: String, found: Found },

    #[snafu(display("{} Exactly one track is supported, found {}", site, found))]
    UnsupportedTrackCount { site: String, found: Found },

    #[snafu(display(
        "{} The division must be a nonzero ticks-per-quarter value, found {}",
        site,
        found
    ))]
    UnsupportedResolution { site: String, found: Found },

    #[snafu(display("{} Expected tag 'MTrk' but found {}", site, found))]
    TrackNotFound { site: String, found: Found },

    #[snafu(display("{} The track chunk length must be nonzero, found {}", site, found))]
    BadTrackLength { site: String, found: Found },

    #[snafu(display(
        "{} A message of {} bytes does not fit in a buffer of {} bytes",
        site,
        len,
        capacity
    ))]
    MessageTooLong {
        site: String,
        len: u64,
        capacity: usize,
    },
}

impl LibError {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            LibError::FileNotFound { .. } => ErrorKind::FileNotFound,
            LibError::Read { .. }
            | LibError::End { .. }
            | LibError::MissingStatus { .. }
            | LibError::UnexpectedStatus { .. } => ErrorKind::Eof,
            LibError::BadMagic { .. } => ErrorKind::BadMagic,
            LibError::BadHeaderLength { .. } => ErrorKind::BadHeaderLength,
            LibError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            LibError::UnsupportedTrackCount { .. } => ErrorKind::UnsupportedTrackCount,
            LibError::UnsupportedResolution { .. } => ErrorKind::UnsupportedResolution,
            LibError::TrackNotFound { .. } => ErrorKind::TrackNotFound,
            LibError::BadTrackLength { .. } => ErrorKind::BadTrackLength,
            LibError::MessageTooLong { .. } => ErrorKind::MessageTooLong,
        }
    }
}

/// The value found in a header field, or nothing if the stream ended before the field was
/// complete.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Found(pub(crate) Option<u32>);

impl Display for Found {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:#X}", value),
            None => f.write_str("the end of the stream"),
        }
    }
}

macro_rules! site {
    () => {
        format!("{}:{}", file!(), line!())
    };
}

macro_rules! io {
    () => {
        crate::error::ReadSnafu { site: site!() }
    };
}

#[test]
fn site_test() {
    let line = line!() + 1;
    let site = site!();
    assert!(site.contains("error.rs"));
    assert!(site.contains(format!("{}", line).as_str()));
}

#[test]
fn kind_of_read_error_is_eof() {
    use snafu::ResultExt;
    fn foo() -> LibResult<u8> {
        let result: std::result::Result<u8, crate::byte_iter::ByteError> =
            crate::byte_iter::EndSnafu { position: 7u64 }.fail();
        result.context(io!())
    }
    let e = Error::from(foo().err().unwrap());
    assert_eq!(ErrorKind::Eof, e.kind());
    assert!(e.is_eof());
    let message = format!("{}", e);
    assert!(message.contains("byte 7"));
}

#[test]
fn found_display() {
    let e: LibError = BadMagicSnafu {
        site: site!(),
        found: Found(Some(0x4D54_6865)),
    }
    .build();
    assert_eq!(ErrorKind::BadMagic, e.kind());
    assert!(format!("{}", e).contains("0x4D546865"));
    let e: LibError = BadHeaderLengthSnafu {
        site: site!(),
        found: Found(None),
    }
    .build();
    assert!(format!("{}", e).contains("the end of the stream"));
}
