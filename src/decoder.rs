use crate::byte_iter::ByteIter;
use crate::clock::Clock;
use crate::constants::{
    FILE_META_EVENT, FILE_SYSEX_F0, FILE_SYSEX_F7, LEN_META_SET_TEMPO, META_END_OF_TRACK,
    META_SET_TEMPO, STATUS_BIT,
};
use crate::error::{self, LibResult};
use crate::status::StatusType;
use log::{trace, warn};
use snafu::{ensure, ResultExt};
use std::io::Read;

/// What kind of event the decoder just put into the message buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum EventKind {
    /// A channel voice or mode message, status and data bytes.
    Channel(StatusType),
    /// `F0 <payload>`.
    Sysex,
    /// An `F7` escape. The buffer holds the payload only, which is sent as-is.
    Escape,
    /// A meta event of the given type. The buffer holds only `FF`.
    Meta(u8),
}

impl EventKind {
    pub(crate) fn is_end_of_track(self) -> bool {
        self == EventKind::Meta(META_END_OF_TRACK)
    }
}

/// Decodes one event at a time, carrying running status and the tempo from one event to the next.
pub(crate) struct EventDecoder {
    /// The most recent status byte, `0` until the first one is read.
    running_status: u8,
    clock: Clock,
    /// Scratch space for meta event payloads, which are never delivered.
    meta: Vec<u8>,
    max_message_len: usize,
    max_meta_len: usize,
}

impl EventDecoder {
    pub(crate) fn new(clock: Clock, max_message_len: usize, max_meta_len: usize) -> Self {
        Self {
            running_status: 0,
            clock,
            meta: Vec::with_capacity(max_meta_len),
            max_message_len,
            max_meta_len,
        }
    }

    pub(crate) fn clock(&self) -> &Clock {
        &self.clock
    }

    #[cfg(test)]
    pub(crate) fn running_status(&self) -> u8 {
        self.running_status
    }

    /// Decodes the next event into `message`, which is cleared first. On error `message` is left
    /// empty, nothing partial survives.
    pub(crate) fn decode<R: Read>(
        &mut self,
        iter: &mut ByteIter<R>,
        message: &mut Vec<u8>,
    ) -> LibResult<EventKind> {
        message.clear();
        let result = self.decode_inner(iter, message);
        match &result {
            Ok(kind) => trace!("decoded {:?}: {:02X?}", kind, message),
            Err(_) => message.clear(),
        }
        result
    }

    fn decode_inner<R: Read>(
        &mut self,
        iter: &mut ByteIter<R>,
        message: &mut Vec<u8>,
    ) -> LibResult<EventKind> {
        let byte = iter.read_or_die().context(io!())?;
        let first_data_byte = if byte & STATUS_BIT == STATUS_BIT {
            self.running_status = byte;
            None
        } else {
            Some(byte)
        };
        let status = self.running_status;

        match status {
            FILE_SYSEX_F0 | FILE_SYSEX_F7 | FILE_META_EVENT => {
                // running status only ever applies to channel messages
                if let Some(byte) = first_data_byte {
                    return error::MissingStatusSnafu {
                        site: site!(),
                        byte,
                        running_status: status,
                        position: iter.position(),
                    }
                    .fail();
                }
                if status == FILE_META_EVENT {
                    message.push(status);
                    self.decode_meta(iter)
                } else {
                    self.decode_sysex(iter, status, message)
                }
            }
            _ => match StatusType::from_status(status) {
                Some(status_type) => {
                    self.decode_channel(iter, status, status_type, first_data_byte, message)
                }
                None if status & STATUS_BIT == 0 => error::MissingStatusSnafu {
                    site: site!(),
                    byte,
                    running_status: status,
                    position: iter.position(),
                }
                .fail(),
                None => error::UnexpectedStatusSnafu {
                    site: site!(),
                    status,
                    position: iter.position(),
                }
                .fail(),
            },
        }
    }

    fn decode_channel<R: Read>(
        &mut self,
        iter: &mut ByteIter<R>,
        status: u8,
        status_type: StatusType,
        first_data_byte: Option<u8>,
        message: &mut Vec<u8>,
    ) -> LibResult<EventKind> {
        let len = status_type.data_len();
        self.ensure_message_fits(1 + len as u64)?;
        message.push(status);
        let remaining = match first_data_byte {
            Some(byte) => {
                message.push(byte);
                len - 1
            }
            None => len,
        };
        iter.read_n_into(remaining, message).context(io!())?;
        Ok(EventKind::Channel(status_type))
    }

    /// `F0 <length> <bytes>` is delivered as `F0 <bytes>`. `F7 <length> <bytes>` is delivered as
    /// `<bytes>`.
    fn decode_sysex<R: Read>(
        &mut self,
        iter: &mut ByteIter<R>,
        status: u8,
        message: &mut Vec<u8>,
    ) -> LibResult<EventKind> {
        let len = iter.read_vlq_u32().context(io!())?;
        let (kind, total) = if status == FILE_SYSEX_F0 {
            message.push(status);
            (EventKind::Sysex, u64::from(len) + 1)
        } else {
            (EventKind::Escape, u64::from(len))
        };
        self.ensure_message_fits(total)?;
        iter.read_n_into(len as usize, message).context(io!())?;
        Ok(kind)
    }

    fn decode_meta<R: Read>(&mut self, iter: &mut ByteIter<R>) -> LibResult<EventKind> {
        let meta_type = iter.read_or_die().context(io!())?;
        let len = iter.read_vlq_u32().context(io!())?;
        ensure!(
            u64::from(len) <= self.max_meta_len as u64,
            error::MessageTooLongSnafu {
                site: site!(),
                len,
                capacity: self.max_meta_len,
            }
        );
        self.meta.clear();
        iter.read_n_into(len as usize, &mut self.meta)
            .context(io!())?;
        trace!("meta event {:#04X} with {} bytes", meta_type, len);

        if meta_type == META_SET_TEMPO {
            if self.meta.len() >= LEN_META_SET_TEMPO {
                self.clock
                    .set_tempo_bytes([self.meta[0], self.meta[1], self.meta[2]]);
            } else {
                warn!("ignoring a set tempo event with only {} bytes", len);
            }
        }
        Ok(EventKind::Meta(meta_type))
    }

    fn ensure_message_fits(&self, len: u64) -> LibResult<()> {
        ensure!(
            len <= self.max_message_len as u64,
            error::MessageTooLongSnafu {
                site: site!(),
                len,
                capacity: self.max_message_len,
            }
        );
        Ok(())
    }
}
