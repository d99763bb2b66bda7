use crate::vlq::{decode_slice, VlqError, CONTINUE};
use log::trace;
use snafu::{ensure, OptionExt, ResultExt, Snafu};
use std::fs::File;
use std::io::{BufReader, Bytes, ErrorKind, Read};
use std::path::Path;

/// The most bytes a VLQ can take and still fit in a `u32`.
const MAX_VLQ_BYTES: usize = 5;

const KB: usize = 1024;

/// Read buffer used when the player opens a file itself. Small, since events are decoded one at a
/// time.
const FILE_BUFFER_SIZE: usize = 8 * KB;

/// A forward-only cursor over the bytes of a MIDI file. It owns the underlying reader, so dropping
/// it closes the byte source.
pub(crate) struct ByteIter<R: Read> {
    iter: Bytes<R>,
    /// The number of bytes consumed so far.
    position: u64,
    position_limit: Option<u64>,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum ByteError {
    #[snafu(display("io error around byte {}: {}", position, source))]
    Io {
        position: u64,
        source: std::io::Error,
    },

    #[snafu(display("unexpected end reached around byte {}", position))]
    End { position: u64 },

    #[snafu(display("too many bytes while reading vlq around {}", position))]
    VlqTooBig { position: u64 },

    #[snafu(display("problem decoding vlq around {}: {}", position, source))]
    VlqDecode { position: u64, source: VlqError },
}

pub(crate) type ByteResult<T> = std::result::Result<T, ByteError>;

impl ByteIter<BufReader<File>> {
    pub(crate) fn open_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let f = File::open(path.as_ref())?;
        let buf = BufReader::with_capacity(FILE_BUFFER_SIZE, f);
        Ok(Self::new(buf))
    }
}

impl<R: Read> ByteIter<R> {
    pub(crate) fn new(r: R) -> Self {
        Self {
            iter: r.bytes(),
            position: 0,
            position_limit: None,
        }
    }

    /// Read a single byte and advance the iter. Returns `None` at the end of the stream, or when
    /// the size limit has been reached.
    pub(crate) fn read(&mut self) -> ByteResult<Option<u8>> {
        if let Some(position_limit) = self.position_limit {
            if self.position >= position_limit {
                return Ok(None);
            }
        }
        match self.iter.next() {
            None => Ok(None),
            Some(Ok(value)) => {
                trace!("read {:#x} at position {}", value, self.position);
                self.position += 1;
                Ok(Some(value))
            }
            Some(Err(ref e)) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Some(Err(e)) => Err(e).context(IoSnafu {
                position: self.position,
            }),
        }
    }

    pub(crate) fn read_or_die(&mut self) -> ByteResult<u8> {
        self.read()?.context(EndSnafu {
            position: self.position,
        })
    }

    pub(crate) fn read2(&mut self) -> ByteResult<[u8; 2]> {
        let mut retval = [0u8; 2];
        for byte in retval.iter_mut() {
            *byte = self.read_or_die()?;
        }
        Ok(retval)
    }

    pub(crate) fn read4(&mut self) -> ByteResult<[u8; 4]> {
        let mut retval = [0u8; 4];
        for byte in retval.iter_mut() {
            *byte = self.read_or_die()?;
        }
        Ok(retval)
    }

    pub(crate) fn read_u16(&mut self) -> ByteResult<u16> {
        let bytes: [u8; 2] = self.read2()?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub(crate) fn read_u32(&mut self) -> ByteResult<u32> {
        let bytes = self.read4()?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Reads the bytes of one VLQ into `buf`, returning how many were read. Gives up after
    /// [`MAX_VLQ_BYTES`] so that a run of continuation bytes cannot go on forever.
    fn read_vlq_bytes(&mut self, buf: &mut [u8; MAX_VLQ_BYTES]) -> ByteResult<usize> {
        // initialize with the continue bit set
        let mut current_byte = CONTINUE;
        let mut byte_count = 0usize;
        while current_byte & CONTINUE == CONTINUE {
            ensure!(
                byte_count < MAX_VLQ_BYTES,
                VlqTooBigSnafu {
                    position: self.position
                }
            );
            current_byte = self.read_or_die()?;
            buf[byte_count] = current_byte;
            byte_count += 1;
        }
        Ok(byte_count)
    }

    pub(crate) fn read_vlq_u32(&mut self) -> ByteResult<u32> {
        let mut buf = [0u8; MAX_VLQ_BYTES];
        let len = self.read_vlq_bytes(&mut buf)?;
        let decoded = decode_slice(&buf[..len]).context(VlqDecodeSnafu {
            position: self.position,
        })?;
        trace!("decoded vlq value {} from {} bytes", decoded, len);
        Ok(decoded)
    }

    /// Reads `num_bytes` bytes, appending them to `bytes`.
    pub(crate) fn read_n_into(&mut self, num_bytes: usize, bytes: &mut Vec<u8>) -> ByteResult<()> {
        let start = bytes.len();
        for _ in 0..num_bytes {
            bytes.push(self.read_or_die()?)
        }
        debug_assert_eq!(num_bytes, bytes.len() - start);
        Ok(())
    }

    /// The number of bytes consumed so far.
    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    /// When this is set, the ByteIter will report that it is at the end when `size` more bytes
    /// have been read.
    pub(crate) fn set_size_limit(&mut self, size: u64) {
        self.position_limit = Some(self.position + size)
    }

    pub(crate) fn is_end(&self) -> bool {
        match self.position_limit {
            Some(limit) => self.position >= limit,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn byte_iter_test() {
        let bytes = [0x00u8, 0x01, 0x02, 0x03, 0x04, 0x10, 0x20, 0x30, 0x40];
        let mut iter = ByteIter::new(Cursor::new(bytes));
        assert_eq!(0, iter.position());
        assert_eq!(0x00, iter.read().unwrap().unwrap());
        assert_eq!(1, iter.position());
        assert_eq!([0x01, 0x02], iter.read2().unwrap());
        assert_eq!(3, iter.position());
        iter.set_size_limit(2);
        assert!(!iter.is_end());
        assert_eq!(0x03, iter.read().unwrap().unwrap());
        assert_eq!(0x04, iter.read().unwrap().unwrap());
        assert!(iter.is_end());
        assert!(iter.read().unwrap().is_none());
        assert!(matches!(iter.read_or_die(), Err(ByteError::End { position: 5 })));
        iter.set_size_limit(3);
        assert_eq!(0x10, iter.read().unwrap().unwrap());
        assert_eq!(0x2030, iter.read_u16().unwrap());
        assert!(iter.read().unwrap().is_none());
    }

    #[test]
    fn big_endian() {
        let bytes = [0x4du8, 0x54, 0x68, 0x64, 0x01, 0xe0];
        let mut iter = ByteIter::new(Cursor::new(bytes));
        assert_eq!(0x4d54_6864, iter.read_u32().unwrap());
        assert_eq!(480, iter.read_u16().unwrap());
        assert!(iter.read().unwrap().is_none());
    }

    #[test]
    fn short_read() {
        let mut iter = ByteIter::new(Cursor::new([0x00u8, 0x00, 0x01]));
        let e = iter.read_u32().err().unwrap();
        assert!(matches!(e, ByteError::End { position: 3 }));
    }

    #[test]
    fn vlq_values() {
        let bytes = [0x00u8, 0x7f, 0x81, 0x00, 0xff, 0xff, 0xff, 0x7f];
        let mut iter = ByteIter::new(Cursor::new(bytes));
        assert_eq!(0, iter.read_vlq_u32().unwrap());
        assert_eq!(0x7f, iter.read_vlq_u32().unwrap());
        assert_eq!(0x80, iter.read_vlq_u32().unwrap());
        assert_eq!(0x0fff_ffff, iter.read_vlq_u32().unwrap());
    }

    #[test]
    fn vlq_sweep() {
        let values: Vec<u32> = (0..=0x0fff_ffffu32)
            .step_by(4099)
            .chain(std::iter::once(0x0fff_ffff))
            .collect();
        let bytes = crate::vlq::to_bytes(&values);
        let mut iter = ByteIter::new(Cursor::new(bytes));
        for value in values {
            assert_eq!(value, iter.read_vlq_u32().unwrap());
        }
        assert!(iter.read().unwrap().is_none());
    }

    #[test]
    fn vlq_too_many_bytes() {
        let bytes = [0x80u8; 16];
        let mut iter = ByteIter::new(Cursor::new(bytes));
        let e = iter.read_vlq_u32().err().unwrap();
        assert!(matches!(e, ByteError::VlqTooBig { position: 5 }));
    }

    #[test]
    fn vlq_overflow() {
        let bytes = [0xffu8, 0xff, 0xff, 0xff, 0x7f];
        let mut iter = ByteIter::new(Cursor::new(bytes));
        let e = iter.read_vlq_u32().err().unwrap();
        assert!(matches!(e, ByteError::VlqDecode { .. }));
    }

    #[test]
    fn vlq_truncated() {
        let mut iter = ByteIter::new(Cursor::new([0x81u8, 0x80]));
        let e = iter.read_vlq_u32().err().unwrap();
        assert!(matches!(e, ByteError::End { position: 2 }));
    }

    #[test]
    fn read_n_into_appends() {
        let mut iter = ByteIter::new(Cursor::new([0x01u8, 0x02, 0x03]));
        let mut buf = vec![0xf0];
        iter.read_n_into(2, &mut buf).unwrap();
        assert_eq!(vec![0xf0, 0x01, 0x02], buf);
        assert!(iter.read_n_into(2, &mut buf).is_err());
    }
}
