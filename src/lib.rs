#![no_std]

//! `ZipList`: a packed list of byte payloads.
//!
//! All entries live back-to-back in one growable region, each prefixed by the
//! encoded length of its predecessor and its own payload length, instead of
//! one allocation per element.
//!
//! Region layout:
//!
//! ```text
//! offset 0..3   total-size      (u32, little-endian)
//! offset 4..7   tail-offset     (i32, little-endian)
//! offset 8..9   entry-count     (i16, little-endian)
//! offset 10..N  entries
//! offset N      terminator      (0xFF)
//! ```
//!
//! See [`encoding`] for the entry layout.
//!
//! # Performance Characteristics
//!
//! - `push()`: amortized O(1), O(n) when the region grows
//! - `get()`: O(index) - entries are found by walking from the start
//! - `last()`: O(1) via the tail offset
//! - `delete()`: O(n) byte shift plus the cascade update
//! - Iterator operations: O(n) - linear traversal
//!
//! Deleting an entry can change the width of the next entry's previous-length
//! field, which changes that entry's length, and so on. A run of entries sized
//! right around the 254-byte threshold makes a single delete quadratic.
//!
//! # Example
//!
//! ```
//! # use ziplist::ZipList;
//! let mut list = ZipList::new();
//! list.push(&[0x01, 0x02]).unwrap();
//! list.push(&[0x03]).unwrap();
//!
//! assert_eq!(list.len().unwrap(), 2);
//! assert_eq!(list.get(0).unwrap(), &[0x01, 0x02]);
//!
//! list.delete(0).unwrap();
//! assert_eq!(list.get(0).unwrap(), &[0x03]);
//!
//! for payload in &list {
//!     println!("{:?}", payload);
//! }
//! ```
//!
//! # Threading
//!
//! A `ZipList` has no internal synchronization. Give each instance a single
//! owner, or serialize access to it externally.
//!
//! # Buffer Sources
//!
//! Regions come from a [`BufferSource`]. The default [`Heap`] source allocates
//! per request; a [`BufferPool`] keeps released regions for reuse and can be
//! shared between lists of one thread:
//!
//! ```
//! # use ziplist::{BufferPool, ZipList, ZipListConfig};
//! let pool = BufferPool::shared(4);
//! let mut list = ZipList::with_source(ZipListConfig::default(), pool.clone()).unwrap();
//! list.push(b"pooled").unwrap();
//! list.release();
//!
//! assert_eq!(pool.borrow().retained(), 1);
//! assert!(list.get(0).is_err());
//! ```

extern crate alloc;

mod config;
mod core;
pub mod encoding;
mod error;
mod iter;
mod source;

pub use config::{ZipListConfig, EMPTY_SIZE, HEADER_SIZE, MAX_ENTRIES, MAX_ENTRY_SIZE_LIMIT};
pub use crate::core::ZipList;
pub use error::{Result, ZipListError};
pub use iter::{ZipListIter, ZipListRevIter};
pub use source::{BufferPool, BufferSource, Heap, SharedPool};
