//! Entry codec.
//!
//! An entry is laid out as `[previous-length][length/encoding][payload]`:
//!
//! - previous-length: one byte for values below 254, otherwise the escape byte
//!   `0xFE` followed by the value as a little-endian `u32`.
//! - length/encoding: `11xxxxxx` for payloads shorter than 64 bytes,
//!   `10xxxxxx xxxxxxxx` (big-endian 14 bits) for 256..16384 bytes, and `0x80`
//!   followed by a little-endian `u32` for everything else.
//!
//! A 14-bit length below 256 would start with `0x80` and be indistinguishable
//! from the 5-byte form, so payloads of 64..256 bytes use the 5-byte form.
//!
//! Readers take the list region up to (not including) the terminator and an
//! absolute offset, so errors report positions in the list.

use crate::error::{Result, ZipListError};

/// Terminator byte written after the last entry.
pub const END: u8 = 0xFF;
/// Escape byte announcing a 4-byte previous-length.
pub const PREVLEN_ESCAPE: u8 = 0xFE;
/// Smallest previous-length that needs the 5-byte form.
pub const PREVLEN_THRESHOLD: usize = 254;

const ENC_MASK: u8 = 0xC0;
const ENC_6BIT: u8 = 0xC0;
const ENC_14BIT: u8 = 0x80;
const ENC_32BIT: u8 = 0x80;

const MAX_6BIT: usize = 0x3F;
const MIN_14BIT: usize = 0x100;
const MAX_14BIT: usize = 0x3FFF;

/// Width of the previous-length field for a predecessor of `prev_len` bytes.
#[must_use]
pub fn prevlen_size(prev_len: usize) -> usize {
    if prev_len < PREVLEN_THRESHOLD {
        1
    } else {
        5
    }
}

/// Width of the length/encoding field for a payload of `payload_len` bytes.
#[must_use]
pub fn payload_len_size(payload_len: usize) -> usize {
    match payload_len {
        0..=MAX_6BIT => 1,
        MIN_14BIT..=MAX_14BIT => 2,
        _ => 5,
    }
}

/// Total encoded length of an entry.
#[must_use]
pub fn entry_len(prev_len: usize, payload_len: usize) -> usize {
    prevlen_size(prev_len) + payload_len_size(payload_len) + payload_len
}

/// Writes the previous-length field at the start of `dst`.
///
/// Returns the number of bytes written. The caller guarantees that `dst` holds
/// at least `prevlen_size(prev_len)` bytes and that `prev_len` fits in `u32`.
#[allow(clippy::cast_possible_truncation, clippy::indexing_slicing)]
pub fn write_prevlen(dst: &mut [u8], prev_len: usize) -> usize {
    if prev_len < PREVLEN_THRESHOLD {
        dst[0] = prev_len as u8;
        1
    } else {
        dst[0] = PREVLEN_ESCAPE;
        dst[1..5].copy_from_slice(&(prev_len as u32).to_le_bytes());
        5
    }
}

/// Writes the length/encoding field at the start of `dst`.
///
/// Returns the number of bytes written. Same contract as [`write_prevlen`].
#[allow(clippy::cast_possible_truncation, clippy::indexing_slicing)]
pub fn write_payload_len(dst: &mut [u8], payload_len: usize) -> usize {
    match payload_len_size(payload_len) {
        1 => {
            dst[0] = ENC_6BIT | payload_len as u8;
            1
        }
        2 => {
            dst[0] = ENC_14BIT | (payload_len >> 8) as u8;
            dst[1] = payload_len as u8;
            2
        }
        _ => {
            dst[0] = ENC_32BIT;
            dst[1..5].copy_from_slice(&(payload_len as u32).to_le_bytes());
            5
        }
    }
}

fn byte_at(buf: &[u8], offset: usize) -> Result<u8> {
    buf.get(offset)
        .copied()
        .ok_or(ZipListError::Truncated { offset })
}

#[allow(clippy::indexing_slicing)] // length checked by `get`
fn u32_at(buf: &[u8], offset: usize) -> Result<usize> {
    let bytes = buf
        .get(offset..offset + 4)
        .ok_or(ZipListError::Truncated { offset })?;
    let value = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    Ok(value as usize)
}

/// Decodes the previous-length field at `offset`.
///
/// Returns `(bytes consumed, previous length)`.
///
/// # Errors
///
/// `InvalidEncoding` if the first byte is the terminator, `Truncated` if the
/// field runs past `buf`.
pub fn read_prevlen(buf: &[u8], offset: usize) -> Result<(usize, usize)> {
    match byte_at(buf, offset)? {
        PREVLEN_ESCAPE => Ok((5, u32_at(buf, offset + 1)?)),
        END => Err(ZipListError::InvalidEncoding {
            offset,
            byte: END,
        }),
        byte => Ok((1, usize::from(byte))),
    }
}

/// Decodes the length/encoding field at `offset`.
///
/// Returns `(bytes consumed, payload length)`.
///
/// # Errors
///
/// `InvalidEncoding` if the top bit of the first byte is clear, `Truncated` if
/// the field runs past `buf`.
pub fn read_payload_len(buf: &[u8], offset: usize) -> Result<(usize, usize)> {
    let byte = byte_at(buf, offset)?;
    if byte & ENC_MASK == ENC_6BIT {
        Ok((1, usize::from(byte & 0x3F)))
    } else if byte == ENC_32BIT {
        Ok((5, u32_at(buf, offset + 1)?))
    } else if byte & ENC_MASK == ENC_14BIT {
        let low = byte_at(buf, offset + 1)?;
        Ok((2, (usize::from(byte & 0x3F) << 8) | usize::from(low)))
    } else {
        Err(ZipListError::InvalidEncoding { offset, byte })
    }
}

/// Decoded shape of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    /// Width of the previous-length field
    pub prevlen_size: usize,
    /// Encoded length of the preceding entry
    pub prevlen: usize,
    /// Width of the length/encoding field
    pub encoding_size: usize,
    /// Payload length in bytes
    pub payload_len: usize,
}

impl EntryHeader {
    /// Bytes before the payload.
    #[must_use]
    pub fn header_size(&self) -> usize {
        self.prevlen_size + self.encoding_size
    }

    /// Encoded length of the whole entry.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.header_size() + self.payload_len
    }
}

/// Decodes the entry starting at `offset` and checks that its payload lies
/// within `buf`.
///
/// # Errors
///
/// `InvalidEncoding` or `Truncated`, see [`read_prevlen`] and [`read_payload_len`].
pub fn read_entry_header(buf: &[u8], offset: usize) -> Result<EntryHeader> {
    let (prevlen_size, prevlen) = read_prevlen(buf, offset)?;
    let (encoding_size, payload_len) = read_payload_len(buf, offset + prevlen_size)?;
    let header = EntryHeader {
        prevlen_size,
        prevlen,
        encoding_size,
        payload_len,
    };
    if offset + header.total_len() > buf.len() {
        return Err(ZipListError::Truncated {
            offset: offset + header.header_size(),
        });
    }
    Ok(header)
}
