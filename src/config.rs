use crate::error::{Result, ZipListError};

/// Header bytes: total-size (4) + tail-offset (4) + entry-count (2).
pub const HEADER_SIZE: usize = 10;
/// Used length of an empty list: header plus terminator.
pub const EMPTY_SIZE: usize = HEADER_SIZE + 1;
/// Largest count the signed 16-bit entry-count field can hold.
pub const MAX_ENTRIES: usize = i16::MAX as usize;
/// Largest `max_entry_size` that keeps a full list addressable by the signed
/// 32-bit tail-offset field.
pub const MAX_ENTRY_SIZE_LIMIT: usize = (i32::MAX as usize - EMPTY_SIZE) / MAX_ENTRIES - 10;

const DEFAULT_INITIAL_CAPACITY: usize = 128;
const DEFAULT_MAX_ENTRY_SIZE: usize = 64;

/// Construction parameters for a `ZipList`.
///
/// ```
/// # use ziplist::ZipListConfig;
/// let config = ZipListConfig::default()
///     .with_initial_capacity(1024)
///     .with_max_entry_size(512);
/// assert_eq!(config.initial_capacity(), 1024);
/// assert_eq!(config.max_entry_size(), 512);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZipListConfig {
    initial_capacity: usize,
    max_entry_size: usize,
}

impl Default for ZipListConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        }
    }
}

impl ZipListConfig {
    #[must_use]
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    #[must_use]
    pub fn with_max_entry_size(mut self, max_entry_size: usize) -> Self {
        self.max_entry_size = max_entry_size;
        self
    }

    #[must_use]
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Largest payload accepted by `push`.
    #[must_use]
    pub fn max_entry_size(&self) -> usize {
        self.max_entry_size
    }

    /// Checks the parameters against the binary layout limits.
    ///
    /// # Errors
    ///
    /// Returns `ZipListError::InvalidConfiguration` if:
    /// - `initial_capacity` cannot hold an empty list
    /// - `max_entry_size` is 0 or above `MAX_ENTRY_SIZE_LIMIT`
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity < EMPTY_SIZE {
            return Err(ZipListError::InvalidConfiguration {
                parameter: "initial_capacity",
                value: self.initial_capacity,
            });
        }
        if self.max_entry_size == 0 || self.max_entry_size > MAX_ENTRY_SIZE_LIMIT {
            return Err(ZipListError::InvalidConfiguration {
                parameter: "max_entry_size",
                value: self.max_entry_size,
            });
        }
        Ok(())
    }
}
