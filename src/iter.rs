use log::debug;

use crate::core::ZipList;
use crate::encoding::{self, EntryHeader};
use crate::source::BufferSource;

fn payload<'a>(entries: &'a [u8], offset: usize, header: &EntryHeader) -> Option<&'a [u8]> {
    entries.get(offset + header.header_size()..offset + header.total_len())
}

/// Iterator over payloads in a `ZipList`, front to back.
///
/// The list cannot be mutated while the iterator borrows it.
///
/// Entries are only decoded from regions that were built by `push` or checked
/// by `from_bytes`, so decoding does not fail in practice. If it does, the
/// error is logged at debug level, the iteration ends and `len()` drops to 0;
/// use [`ZipList::get`](crate::ZipList::get) to surface the error itself.
///
/// This iterator implements `Clone`.
#[derive(Clone, Debug)]
pub struct ZipListIter<'a> {
    entries: &'a [u8],
    offset: usize,
    remaining: usize,
}

impl<'a> ZipListIter<'a> {
    pub(crate) fn new(entries: &'a [u8], offset: usize, remaining: usize) -> Self {
        Self {
            entries,
            offset,
            remaining,
        }
    }
}

impl<'a> Iterator for ZipListIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let header = match encoding::read_entry_header(self.entries, self.offset) {
            Ok(header) => header,
            Err(err) => {
                debug!("Stopped ziplist iteration with {} entries left: {err}", self.remaining);
                self.remaining = 0;
                return None;
            }
        };
        let item = payload(self.entries, self.offset, &header);
        self.offset += header.total_len();
        self.remaining -= 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ZipListIter<'_> {}

/// Iterator over payloads in a `ZipList`, back to front.
///
/// Starts at the tail offset and steps back by each entry's previous-length.
/// Decode failures end the iteration the same way as in [`ZipListIter`].
///
/// This iterator implements `Clone`.
#[derive(Clone, Debug)]
pub struct ZipListRevIter<'a> {
    entries: &'a [u8],
    offset: usize,
    remaining: usize,
}

impl<'a> ZipListRevIter<'a> {
    pub(crate) fn new(entries: &'a [u8], tail: usize, remaining: usize) -> Self {
        Self {
            entries,
            offset: tail,
            remaining,
        }
    }
}

impl<'a> Iterator for ZipListRevIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let header = match encoding::read_entry_header(self.entries, self.offset) {
            Ok(header) => header,
            Err(err) => {
                debug!("Stopped ziplist iteration with {} entries left: {err}", self.remaining);
                self.remaining = 0;
                return None;
            }
        };
        let item = payload(self.entries, self.offset, &header);
        self.remaining -= 1;
        if self.remaining > 0 {
            match self.offset.checked_sub(header.prevlen) {
                Some(offset) if header.prevlen > 0 => self.offset = offset,
                _ => self.remaining = 0,
            }
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ZipListRevIter<'_> {}

/// Iterates an empty sequence if the list has been released.
impl<'a, S: BufferSource> IntoIterator for &'a ZipList<S> {
    type Item = &'a [u8];
    type IntoIter = ZipListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
            .unwrap_or_else(|_| ZipListIter::new(&[], 0, 0))
    }
}
