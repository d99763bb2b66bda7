//! MIDI variable-length quantities: big-endian base-128 numbers where every byte but the last has
//! its high bit set.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, PartialEq)]
pub enum VlqError {
    IncompleteNumber,
    Overflow,
}

impl Display for VlqError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for VlqError {}

/// 0x7f, 127: The largest 7 bit number.
const MAX_7BIT: u8 = 0b0111_1111;

/// 0x80, 128: The highest bit is set, this bit indicates that more bytes follow.
pub(crate) const CONTINUE: u8 = 0b1000_0000;

/// Convert a list of numbers to a stream of bytes encoded with variable length encoding.
pub fn to_bytes(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|x| encode_u32(*x)).collect()
}

fn encode_u32(mut value: u32) -> Vec<u8> {
    if value == 0 {
        return vec![0];
    }

    let mut result = Vec::new();
    while value > 0 {
        // the right-most seven bits
        let mut v = (value & MAX_7BIT as u32) as u8;

        // every byte except the last one (which is pushed first) gets the continue bit
        if !result.is_empty() {
            v |= CONTINUE;
        }

        result.push(v);
        value >>= 7;
    }
    result.reverse();
    result
}

/// Given a stream of bytes, extract all numbers which are encoded in there.
pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Vec<u32>, VlqError> {
    let mut current = Vec::new();
    let mut result = Vec::new();
    for b in bytes {
        current.push(*b);
        if b & CONTINUE == 0 {
            result.push(decode_slice(&current)?);
            current.clear();
        }
    }
    if result.is_empty() || !current.is_empty() {
        return Err(VlqError::IncompleteNumber);
    }
    Ok(result)
}

/// Decodes exactly one number. `bytes` must end with the byte that has the continue bit clear.
pub(crate) fn decode_slice(bytes: &[u8]) -> std::result::Result<u32, VlqError> {
    let mut result: u32 = 0;

    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            if (result.rotate_left(7)) & 0x7F > 0 {
                return Err(VlqError::Overflow);
            }
            result <<= 7;
        }
        result |= (b & MAX_7BIT) as u32;

        if i == bytes.len() - 1 && b & CONTINUE != 0 {
            return Err(VlqError::IncompleteNumber);
        }
    }

    if bytes.is_empty() {
        return Err(VlqError::IncompleteNumber);
    }
    Ok(result)
}
