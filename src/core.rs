use alloc::vec::Vec;

use log::{debug, trace};

use crate::config::{ZipListConfig, EMPTY_SIZE, HEADER_SIZE, MAX_ENTRIES};
use crate::encoding::{self, EntryHeader, END};
use crate::error::{Result, ZipListError};
use crate::iter::{ZipListIter, ZipListRevIter};
use crate::source::{BufferSource, Heap};

const TOTAL_SIZE_OFFSET: usize = 0;
const TAIL_OFFSET_OFFSET: usize = 4;
const COUNT_OFFSET: usize = 8;

/// A packed list of byte payloads stored in one growable region.
///
/// Offsets into the region are call-scoped: any `push`, `delete` or growth
/// invalidates them.
#[derive(Debug)]
pub struct ZipList<S: BufferSource = Heap> {
    region: Option<Vec<u8>>,
    used: usize,
    max_entry_size: usize,
    source: S,
}

impl ZipList<Heap> {
    /// Creates an empty list with the default configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_config(ZipListConfig::default()).expect("Default configuration is valid")
    }

    /// Creates an empty list on the heap.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::InvalidConfiguration` if `config` is invalid.
    pub fn with_config(config: ZipListConfig) -> Result<Self> {
        Self::with_source(config, Heap)
    }

    /// Loads a list from its binary layout.
    ///
    /// # Errors
    ///
    /// See [`ZipList::from_bytes_in`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_in(bytes, ZipListConfig::default(), Heap)
    }
}

impl Default for ZipList<Heap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BufferSource> ZipList<S> {
    /// Creates an empty list whose regions come from `source`.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::InvalidConfiguration` if `config` is invalid.
    pub fn with_source(config: ZipListConfig, mut source: S) -> Result<Self> {
        config.validate()?;
        let mut region = acquire_at_least(&mut source, config.initial_capacity());
        write_u32(&mut region, TOTAL_SIZE_OFFSET, EMPTY_SIZE);
        write_u32(&mut region, TAIL_OFFSET_OFFSET, 0);
        write_i16(&mut region, COUNT_OFFSET, 0);
        set_byte(&mut region, HEADER_SIZE, END);
        Ok(Self {
            region: Some(region),
            used: EMPTY_SIZE,
            max_entry_size: config.max_entry_size(),
            source,
        })
    }

    /// Loads a list from its binary layout into a region from `source`.
    ///
    /// Every header field, entry encoding, previous-length value and the
    /// terminator are validated before the region is accepted.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `config` is invalid
    /// - `InvalidLayout` if a header field disagrees with the entries
    /// - `InvalidEncoding` or `Truncated` if an entry cannot be decoded
    pub fn from_bytes_in(bytes: &[u8], config: ZipListConfig, mut source: S) -> Result<Self> {
        config.validate()?;
        validate_layout(bytes).inspect_err(|err| debug!("Rejected ziplist region: {err}"))?;

        let capacity = config.initial_capacity().max(bytes.len());
        let mut region = acquire_at_least(&mut source, capacity);
        copy_prefix(&mut region, bytes);
        Ok(Self {
            region: Some(region),
            used: bytes.len(),
            max_entry_size: config.max_entry_size(),
            source,
        })
    }

    fn region(&self) -> Result<&[u8]> {
        self.region.as_deref().ok_or(ZipListError::Disposed)
    }

    fn region_mut(&mut self) -> Result<&mut [u8]> {
        self.region.as_deref_mut().ok_or(ZipListError::Disposed)
    }

    /// The region up to, not including, the terminator.
    #[allow(clippy::indexing_slicing)] // `used` never exceeds the region
    fn entries(&self) -> Result<&[u8]> {
        Ok(&self.region()?[..self.used - 1])
    }

    fn header_at(&self, offset: usize) -> Result<EntryHeader> {
        encoding::read_entry_header(self.entries()?, offset)
    }

    #[allow(clippy::cast_sign_loss)]
    fn header_count(&self) -> Result<usize> {
        Ok(read_i16(self.region()?, COUNT_OFFSET) as usize)
    }

    fn set_headers(&mut self, tail: usize, count: usize) -> Result<()> {
        let used = self.used;
        let region = self.region_mut()?;
        write_u32(region, TOTAL_SIZE_OFFSET, used);
        write_u32(region, TAIL_OFFSET_OFFSET, tail);
        write_i16(region, COUNT_OFFSET, count);
        Ok(())
    }

    /// Number of entries.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::Disposed` after `release`.
    pub fn len(&self) -> Result<usize> {
        self.header_count()
    }

    /// # Errors
    ///
    /// Returns `ZipListError::Disposed` after `release`.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.header_count()? == 0)
    }

    /// The total-size header field: used bytes including header and terminator.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::Disposed` after `release`.
    pub fn total_size(&self) -> Result<usize> {
        Ok(read_u32(self.region()?, TOTAL_SIZE_OFFSET) as usize)
    }

    /// The tail-offset header field: offset of the last entry, 0 when empty.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::Disposed` after `release`.
    pub fn tail_offset(&self) -> Result<usize> {
        Ok(read_u32(self.region()?, TAIL_OFFSET_OFFSET) as usize)
    }

    /// Size of the backing region.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::Disposed` after `release`.
    pub fn capacity(&self) -> Result<usize> {
        Ok(self.region()?.len())
    }

    /// Largest payload accepted by `push`.
    #[must_use]
    pub fn max_entry_size(&self) -> usize {
        self.max_entry_size
    }

    /// The used region in its binary layout, header through terminator.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::Disposed` after `release`.
    #[allow(clippy::indexing_slicing)]
    pub fn as_bytes(&self) -> Result<&[u8]> {
        Ok(&self.region()?[..self.used])
    }

    /// Whether `release` has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.region.is_none()
    }

    /// Makes room for `additional` more used bytes.
    ///
    /// Grows to the larger of twice the capacity and the exact requirement,
    /// copying the live prefix and returning the old region to the source.
    #[allow(clippy::indexing_slicing)]
    fn ensure_capacity(&mut self, additional: usize) -> Result<()> {
        let required = self.used + additional;
        let capacity = self.capacity()?;
        if required <= capacity {
            return Ok(());
        }

        let new_capacity = (capacity * 2).max(required);
        let mut grown = acquire_at_least(&mut self.source, new_capacity);
        let old = self.region.take().ok_or(ZipListError::Disposed)?;
        copy_prefix(&mut grown, &old[..self.used]);
        self.source.release(old);
        debug!(
            "Grew ziplist region from {capacity} to {} bytes",
            grown.len()
        );
        self.region = Some(grown);
        Ok(())
    }

    fn entry_offset(&self, index: usize) -> Result<usize> {
        let mut offset = HEADER_SIZE;
        for _ in 0..index {
            offset += self.header_at(offset)?.total_len();
        }
        Ok(offset)
    }

    fn check_index(&self, index: usize) -> Result<usize> {
        let length = self.header_count()?;
        if index >= length {
            return Err(ZipListError::IndexOutOfRange { index, length });
        }
        Ok(length)
    }

    /// Appends a payload after the last entry.
    ///
    /// # Errors
    ///
    /// - `Disposed` after `release`
    /// - `PayloadTooLarge` if the payload exceeds the maximum entry size
    /// - `EntryLimitExceeded` if the entry counter is full
    ///
    /// The list is unchanged on error.
    #[allow(clippy::indexing_slicing)] // capacity ensured before writing
    pub fn push(&mut self, payload: &[u8]) -> Result<()> {
        let count = self.header_count()?;
        if payload.len() > self.max_entry_size {
            return Err(ZipListError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_entry_size,
            });
        }
        if count >= MAX_ENTRIES {
            return Err(ZipListError::EntryLimitExceeded {
                max_entries: MAX_ENTRIES,
            });
        }

        let prev_len = if count == 0 {
            0
        } else {
            self.header_at(self.tail_offset()?)?.total_len()
        };
        self.ensure_capacity(encoding::entry_len(prev_len, payload.len()))?;

        // The new entry replaces the terminator.
        let offset = self.used - 1;
        let region = self.region_mut()?;
        let mut pos = offset;
        pos += encoding::write_prevlen(&mut region[pos..], prev_len);
        pos += encoding::write_payload_len(&mut region[pos..], payload.len());
        region[pos..pos + payload.len()].copy_from_slice(payload);
        pos += payload.len();
        region[pos] = END;

        self.used = pos + 1;
        self.set_headers(offset, count + 1)
    }

    /// Returns the payload at `index`.
    ///
    /// Walks the entries from the start: O(index).
    ///
    /// # Errors
    ///
    /// - `Disposed` after `release`
    /// - `IndexOutOfRange` if `index >= len`
    /// - `InvalidEncoding` or `Truncated` if the region is corrupt
    pub fn get(&self, index: usize) -> Result<&[u8]> {
        self.check_index(index)?;
        self.payload_at(self.entry_offset(index)?)
    }

    /// Returns the last payload through the tail offset.
    ///
    /// # Errors
    ///
    /// - `Disposed` after `release`
    /// - `IndexOutOfRange` if the list is empty
    pub fn last(&self) -> Result<&[u8]> {
        let length = self.header_count()?;
        if length == 0 {
            return Err(ZipListError::IndexOutOfRange { index: 0, length });
        }
        self.payload_at(self.tail_offset()?)
    }

    fn payload_at(&self, offset: usize) -> Result<&[u8]> {
        let header = self.header_at(offset)?;
        let entries = self.entries()?;
        entries
            .get(offset + header.header_size()..offset + header.total_len())
            .ok_or(ZipListError::Truncated { offset })
    }

    /// Removes the entry at `index`, closing the gap and fixing up the
    /// previous-length fields that follow.
    ///
    /// # Errors
    ///
    /// - `Disposed` after `release`
    /// - `IndexOutOfRange` if `index >= len`
    /// - `InvalidEncoding` or `Truncated` if the region is corrupt
    pub fn delete(&mut self, index: usize) -> Result<()> {
        let count = self.check_index(index)?;
        let offset = self.entry_offset(index)?;
        let removed = self.header_at(offset)?;
        let removed_len = removed.total_len();
        let tail = self.tail_offset()?;

        let used = self.used;
        self.region_mut()?
            .copy_within(offset + removed_len..used, offset);
        self.used -= removed_len;

        let new_count = count - 1;
        let new_tail = if new_count == 0 {
            0
        } else if index == new_count {
            // The predecessor became the tail; its length is in our prevlen.
            offset - removed.prevlen
        } else {
            tail - removed_len
        };
        self.set_headers(new_tail, new_count)?;

        if index < new_count {
            self.cascade_update(offset, removed.prevlen)?;
        }
        Ok(())
    }

    /// Removes the last entry and returns its payload.
    ///
    /// # Errors
    ///
    /// - `Disposed` after `release`
    /// - `IndexOutOfRange` if the list is empty
    pub fn pop(&mut self) -> Result<Vec<u8>> {
        let payload = self.last()?.to_vec();
        let count = self.header_count()?;
        self.delete(count - 1)?;
        Ok(payload)
    }

    /// Removes every entry, keeping the region.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::Disposed` after `release`.
    #[allow(clippy::indexing_slicing)]
    pub fn clear(&mut self) -> Result<()> {
        self.region_mut()?[HEADER_SIZE] = END;
        self.used = EMPTY_SIZE;
        self.set_headers(0, 0)
    }

    /// Rewrites previous-length fields from `offset` onward.
    ///
    /// `prev_len` is the encoded length of the entry before `offset` (0 if
    /// none). When a field keeps its width the value is patched in place and
    /// the walk stops. When the width changes the entry is resized, which
    /// changes its own length, so the next entry is checked too.
    ///
    /// Each step is O(n) for the byte shift; a run of entries sitting right at
    /// the 254-byte threshold makes the whole update quadratic.
    #[allow(clippy::indexing_slicing)] // offsets come from decoded headers
    fn cascade_update(&mut self, mut offset: usize, mut prev_len: usize) -> Result<()> {
        while offset < self.used - 1 {
            let header = self.header_at(offset)?;
            let required = encoding::prevlen_size(prev_len);

            if required == header.prevlen_size {
                if header.prevlen != prev_len {
                    encoding::write_prevlen(&mut self.region_mut()?[offset..], prev_len);
                }
                break;
            }

            trace!(
                "Cascade at offset {offset}: prevlen width {} -> {required}",
                header.prevlen_size
            );
            if required > header.prevlen_size {
                self.ensure_capacity(required - header.prevlen_size)?;
            }
            let used = self.used;
            let region = self.region_mut()?;
            region.copy_within(offset + header.prevlen_size..used, offset + required);
            encoding::write_prevlen(&mut region[offset..], prev_len);
            self.used = used + required - header.prevlen_size;

            let new_len = header.total_len() + required - header.prevlen_size;
            let tail = self.tail_offset()?;
            let new_tail = if offset < tail {
                tail + new_len - header.total_len()
            } else {
                tail
            };
            let count = self.header_count()?;
            self.set_headers(new_tail, count)?;

            prev_len = new_len;
            offset += new_len;
        }
        Ok(())
    }

    /// Returns an iterator over the payloads, front to back.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::Disposed` after `release`.
    pub fn iter(&self) -> Result<ZipListIter<'_>> {
        Ok(ZipListIter::new(
            self.entries()?,
            HEADER_SIZE,
            self.header_count()?,
        ))
    }

    /// Returns an iterator over the payloads, back to front, following the
    /// previous-length fields from the tail.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::Disposed` after `release`.
    pub fn iter_rev(&self) -> Result<ZipListRevIter<'_>> {
        Ok(ZipListRevIter::new(
            self.entries()?,
            self.tail_offset()?,
            self.header_count()?,
        ))
    }

    /// Returns the region to its source. Every later call fails with
    /// `ZipListError::Disposed`; releasing twice is a no-op.
    pub fn release(&mut self) {
        if let Some(region) = self.region.take() {
            debug!("Released ziplist region of {} bytes", region.len());
            self.source.release(region);
            self.used = 0;
        }
    }
}

impl<S: BufferSource> Drop for ZipList<S> {
    fn drop(&mut self) {
        self.release();
    }
}

fn acquire_at_least<S: BufferSource>(source: &mut S, min_len: usize) -> Vec<u8> {
    let mut region = source.acquire(min_len);
    if region.len() < min_len {
        region.resize(min_len, 0);
    }
    region
}

#[allow(clippy::indexing_slicing)] // destination sized by the caller
fn copy_prefix(dst: &mut [u8], src: &[u8]) {
    dst[..src.len()].copy_from_slice(src);
}

#[allow(clippy::indexing_slicing)]
fn set_byte(region: &mut [u8], offset: usize, byte: u8) {
    region[offset] = byte;
}

#[allow(clippy::indexing_slicing)]
fn read_u32(region: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        region[offset],
        region[offset + 1],
        region[offset + 2],
        region[offset + 3],
    ])
}

#[allow(clippy::indexing_slicing)]
fn read_i16(region: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([region[offset], region[offset + 1]])
}

#[allow(clippy::cast_possible_truncation, clippy::indexing_slicing)]
fn write_u32(region: &mut [u8], offset: usize, value: usize) {
    region[offset..offset + 4].copy_from_slice(&(value as u32).to_le_bytes());
}

#[allow(clippy::cast_possible_truncation, clippy::indexing_slicing)]
fn write_i16(region: &mut [u8], offset: usize, value: usize) {
    region[offset..offset + 2].copy_from_slice(&(value as i16).to_le_bytes());
}

/// Checks a foreign region against the header invariants and requires every
/// field to use the width `push` would have written.
#[allow(clippy::cast_sign_loss, clippy::indexing_slicing)]
fn validate_layout(bytes: &[u8]) -> Result<()> {
    if bytes.len() < EMPTY_SIZE {
        return Err(ZipListError::InvalidLayout {
            reason: "region is shorter than an empty list",
        });
    }
    if read_u32(bytes, TOTAL_SIZE_OFFSET) as usize != bytes.len() {
        return Err(ZipListError::InvalidLayout {
            reason: "total-size does not match the region length",
        });
    }
    if bytes[bytes.len() - 1] != END {
        return Err(ZipListError::InvalidLayout {
            reason: "missing terminator",
        });
    }
    let count = read_i16(bytes, COUNT_OFFSET);
    let tail = i32::from_le_bytes([
        bytes[TAIL_OFFSET_OFFSET],
        bytes[TAIL_OFFSET_OFFSET + 1],
        bytes[TAIL_OFFSET_OFFSET + 2],
        bytes[TAIL_OFFSET_OFFSET + 3],
    ]);
    if count < 0 || tail < 0 {
        return Err(ZipListError::InvalidLayout {
            reason: "negative header field",
        });
    }

    let entries = &bytes[..bytes.len() - 1];
    let mut offset = HEADER_SIZE;
    let mut prev_len = 0;
    let mut last = 0;
    let mut seen = 0usize;
    while offset < entries.len() {
        let header = encoding::read_entry_header(entries, offset)?;
        if header.prevlen != prev_len {
            return Err(ZipListError::InvalidLayout {
                reason: "previous-length does not match the preceding entry",
            });
        }
        if header.prevlen_size != encoding::prevlen_size(header.prevlen) {
            return Err(ZipListError::InvalidLayout {
                reason: "previous-length uses a non-canonical width",
            });
        }
        if header.encoding_size != encoding::payload_len_size(header.payload_len) {
            return Err(ZipListError::InvalidLayout {
                reason: "length encoding uses a non-canonical width",
            });
        }
        last = offset;
        prev_len = header.total_len();
        offset += prev_len;
        seen += 1;
    }
    if seen != count as usize {
        return Err(ZipListError::InvalidLayout {
            reason: "entry-count does not match the entries",
        });
    }
    if last != tail as usize {
        return Err(ZipListError::InvalidLayout {
            reason: "tail-offset does not point at the last entry",
        });
    }
    Ok(())
}
