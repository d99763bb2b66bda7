use crate::byte_iter::{ByteError, ByteIter, ByteResult};
use crate::constants::{DIVISION_TYPE_BIT, HEADER_LENGTH, HEADER_MAGIC, TRACK_MAGIC};
use crate::error::{self, Found, LibResult};
use log::debug;
use snafu::{ensure, ResultExt};
use std::io::Read;

/// What the header chunk and the track chunk header of a format 0 file say about it.
///
/// ```text
/// Header chunk: "MThd" u32 | length=6 u32 | format=0 u16 | trackCount=1 u16 | resolution u16
/// Track chunk:  "MTrk" u32 | length u32 | (delta:VLQ, event)*
/// ```
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Header {
    /// Ticks per quarter note.
    resolution: u16,
    /// The declared length of the track chunk, in bytes.
    track_length: u32,
}

impl Header {
    /// Ticks per quarter note. Always nonzero.
    pub fn resolution(&self) -> u16 {
        self.resolution
    }

    /// The number of bytes the track chunk declares, counted from the first delta-time.
    pub fn track_length(&self) -> u32 {
        self.track_length
    }

    /// Validates the header chunk and the track chunk header, leaving `iter` at the first
    /// delta-time of the track. A field that cannot be read in full is reported as that field's
    /// error.
    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        let magic = field(iter.read_u32())?;
        ensure!(
            magic == Some(HEADER_MAGIC),
            error::BadMagicSnafu {
                site: site!(),
                found: Found(magic)
            }
        );

        let chunk_length = field(iter.read_u32())?;
        ensure!(
            chunk_length == Some(HEADER_LENGTH),
            error::BadHeaderLengthSnafu {
                site: site!(),
                found: Found(chunk_length)
            }
        );

        let format = field(iter.read_u16())?;
        ensure!(
            format == Some(0),
            error::UnsupportedFormatSnafu {
                site: site!(),
                found: Found(format.map(u32::from))
            }
        );

        let track_count = field(iter.read_u16())?;
        ensure!(
            track_count == Some(1),
            error::UnsupportedTrackCountSnafu {
                site: site!(),
                found: Found(track_count.map(u32::from))
            }
        );

        let division = field(iter.read_u16())?;
        let resolution = match division {
            Some(value) if value != 0 && value & DIVISION_TYPE_BIT == 0 => value,
            _ => {
                return error::UnsupportedResolutionSnafu {
                    site: site!(),
                    found: Found(division.map(u32::from)),
                }
                .fail()
            }
        };
        debug!(
            "header chunk: format 0, 1 track, resolution {} ticks per quarter",
            resolution
        );

        let magic = field(iter.read_u32())?;
        ensure!(
            magic == Some(TRACK_MAGIC),
            error::TrackNotFoundSnafu {
                site: site!(),
                found: Found(magic)
            }
        );

        let track_length = match field(iter.read_u32())? {
            Some(value) if value != 0 => value,
            found => {
                return error::BadTrackLengthSnafu {
                    site: site!(),
                    found: Found(found),
                }
                .fail()
            }
        };
        debug!("track chunk: length {}", track_length);

        Ok(Self {
            resolution,
            track_length,
        })
    }
}

/// A header field that runs out of bytes is `None`, so the caller reports it as that field's error.
/// Any other read failure is passed on as is.
fn field<T>(result: ByteResult<T>) -> LibResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ByteError::End { .. }) => Ok(None),
        Err(e) => Err(e).context(io!()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, LibError};
    use std::io::{self, Cursor, Read};

    fn header_bytes(
        magic: &[u8; 4],
        length: u32,
        format: u16,
        tracks: u16,
        division: u16,
        track_magic: &[u8; 4],
        track_length: u32,
    ) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(magic);
        bytes.extend_from_slice(&length.to_be_bytes());
        bytes.extend_from_slice(&format.to_be_bytes());
        bytes.extend_from_slice(&tracks.to_be_bytes());
        bytes.extend_from_slice(&division.to_be_bytes());
        bytes.extend_from_slice(track_magic);
        bytes.extend_from_slice(&track_length.to_be_bytes());
        bytes
    }

    fn valid() -> Vec<u8> {
        header_bytes(b"MThd", 6, 0, 1, 480, b"MTrk", 4)
    }

    fn parse(bytes: Vec<u8>) -> LibResult<Header> {
        let mut iter = ByteIter::new(Cursor::new(bytes));
        Header::parse(&mut iter)
    }

    fn kind(bytes: Vec<u8>) -> ErrorKind {
        parse(bytes).err().unwrap().kind()
    }

    #[test]
    fn valid_header() {
        let mut iter = ByteIter::new(Cursor::new(valid()));
        let header = Header::parse(&mut iter).unwrap();
        assert_eq!(480, header.resolution());
        assert_eq!(4, header.track_length());
        assert_eq!(22, iter.position());
    }

    #[test]
    fn each_field_has_its_own_error() {
        let cases = vec![
            (
                header_bytes(b"MThe", 6, 0, 1, 480, b"MTrk", 4),
                ErrorKind::BadMagic,
            ),
            (
                header_bytes(b"MThd", 7, 0, 1, 480, b"MTrk", 4),
                ErrorKind::BadHeaderLength,
            ),
            (
                header_bytes(b"MThd", 6, 1, 1, 480, b"MTrk", 4),
                ErrorKind::UnsupportedFormat,
            ),
            (
                header_bytes(b"MThd", 6, 0, 2, 480, b"MTrk", 4),
                ErrorKind::UnsupportedTrackCount,
            ),
            (
                header_bytes(b"MThd", 6, 0, 0, 480, b"MTrk", 4),
                ErrorKind::UnsupportedTrackCount,
            ),
            (
                header_bytes(b"MThd", 6, 0, 1, 0, b"MTrk", 4),
                ErrorKind::UnsupportedResolution,
            ),
            (
                header_bytes(b"MThd", 6, 0, 1, 0xE250, b"MTrk", 4),
                ErrorKind::UnsupportedResolution,
            ),
            (
                header_bytes(b"MThd", 6, 0, 1, 480, b"MThd", 4),
                ErrorKind::TrackNotFound,
            ),
            (
                header_bytes(b"MThd", 6, 0, 1, 480, b"MTrk", 0),
                ErrorKind::BadTrackLength,
            ),
        ];
        for (bytes, expected) in cases {
            assert_eq!(expected, kind(bytes));
        }
    }

    #[test]
    fn largest_resolution() {
        let header = parse(header_bytes(b"MThd", 6, 0, 1, 0x7fff, b"MTrk", 1)).unwrap();
        assert_eq!(0x7fff, header.resolution());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device unplugged"))
        }
    }

    #[test]
    fn io_errors_are_not_field_errors() {
        let mut iter = ByteIter::new(FailingReader);
        let e = Header::parse(&mut iter).err().unwrap();
        assert!(matches!(
            e,
            LibError::Read {
                source: ByteError::Io { position: 0, .. },
                ..
            }
        ));

        // the cause survives after some fields were read
        let reader = Cursor::new(valid()[..8].to_vec()).chain(FailingReader);
        let mut iter = ByteIter::new(reader);
        let e = Header::parse(&mut iter).err().unwrap();
        assert_eq!(ErrorKind::Eof, e.kind());
        assert!(format!("{}", e).contains("device unplugged"));
    }

    #[test]
    fn truncation_reports_the_field_being_read() {
        let bytes = valid();
        assert_eq!(ErrorKind::BadMagic, kind(Vec::new()));
        assert_eq!(ErrorKind::BadMagic, kind(bytes[..3].to_vec()));
        assert_eq!(ErrorKind::BadHeaderLength, kind(bytes[..6].to_vec()));
        assert_eq!(ErrorKind::UnsupportedFormat, kind(bytes[..9].to_vec()));
        assert_eq!(ErrorKind::UnsupportedTrackCount, kind(bytes[..11].to_vec()));
        assert_eq!(ErrorKind::UnsupportedResolution, kind(bytes[..13].to_vec()));
        assert_eq!(ErrorKind::TrackNotFound, kind(bytes[..16].to_vec()));
        assert_eq!(ErrorKind::BadTrackLength, kind(bytes[..21].to_vec()));
    }
}
