//! Where a `ZipList` gets its backing regions from and returns them to.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

/// Allocation source for backing regions.
///
/// A region's length is the list's capacity. `Heap` and `BufferPool` hand out
/// zero-filled regions; the list itself overwrites every byte before reading
/// it, so custom sources may return regions with stale contents.
pub trait BufferSource {
    /// Hands out a region of at least `min_len` bytes.
    fn acquire(&mut self, min_len: usize) -> Vec<u8>;

    /// Takes back a region previously handed out by `acquire`.
    fn release(&mut self, region: Vec<u8>);
}

/// Plain heap allocation, one region per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct Heap;

impl BufferSource for Heap {
    fn acquire(&mut self, min_len: usize) -> Vec<u8> {
        vec![0; min_len]
    }

    fn release(&mut self, _region: Vec<u8>) {}
}

const DEFAULT_MAX_RETAINED: usize = 16;

/// Keeps released regions around for reuse.
///
/// `acquire` returns the smallest retained region that is large enough, so a
/// list may end up with more capacity than it asked for.
#[derive(Debug)]
pub struct BufferPool {
    free: Vec<Vec<u8>>,
    max_retained: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETAINED)
    }
}

impl BufferPool {
    /// Creates a pool that holds at most `max_retained` idle regions.
    #[must_use]
    pub fn new(max_retained: usize) -> Self {
        Self {
            free: Vec::new(),
            max_retained,
        }
    }

    /// Creates a pool that can be shared by several lists on one thread.
    #[must_use]
    pub fn shared(max_retained: usize) -> SharedPool {
        Rc::new(RefCell::new(Self::new(max_retained)))
    }

    /// Number of idle regions currently held.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.free.len()
    }
}

impl BufferSource for BufferPool {
    fn acquire(&mut self, min_len: usize) -> Vec<u8> {
        let best = self
            .free
            .iter()
            .enumerate()
            .filter(|(_, region)| region.len() >= min_len)
            .min_by_key(|(_, region)| region.len())
            .map(|(index, _)| index);
        match best {
            Some(index) => {
                let mut region = self.free.swap_remove(index);
                region.fill(0);
                region
            }
            None => vec![0; min_len],
        }
    }

    fn release(&mut self, region: Vec<u8>) {
        if self.free.len() < self.max_retained {
            self.free.push(region);
        }
    }
}

/// A `BufferPool` shared between lists owned by the same thread.
pub type SharedPool = Rc<RefCell<BufferPool>>;

impl BufferSource for SharedPool {
    fn acquire(&mut self, min_len: usize) -> Vec<u8> {
        self.borrow_mut().acquire(min_len)
    }

    fn release(&mut self, region: Vec<u8>) {
        self.borrow_mut().release(region);
    }
}
