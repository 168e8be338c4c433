use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, ZipListError>;

/// Error types for `ZipList` operations
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ZipListError {
    /// Payload is larger than the configured maximum entry size
    #[error("Payload too large: {size} bytes exceeds maximum entry size of {max}")]
    PayloadTooLarge {
        /// Length of the rejected payload
        size: usize,
        /// Maximum accepted payload length
        max: usize,
    },
    /// Index is outside `[0, length)`
    #[error("Index out of range: index {index} is beyond list length {length}")]
    IndexOutOfRange {
        /// Index that was accessed
        index: usize,
        /// Current number of entries
        length: usize,
    },
    /// The first byte of a length field matches none of the defined encodings.
    ///
    /// The list that produced this error can no longer be trusted.
    #[error("Invalid encoding: byte {byte:#04x} at offset {offset}")]
    InvalidEncoding {
        /// Offset of the offending byte
        offset: usize,
        /// The offending byte
        byte: u8,
    },
    /// An entry or header field extends past the used region
    #[error("Truncated entry at offset {offset}")]
    Truncated {
        /// Offset where decoding ran out of bytes
        offset: usize,
    },
    /// The list has been released
    #[error("ZipList has been released")]
    Disposed,
    /// The 16-bit entry counter cannot hold another entry
    #[error("Entry limit exceeded: maximum {max_entries} entries allowed")]
    EntryLimitExceeded {
        /// Maximum number of entries
        max_entries: usize,
    },
    /// A raw region violates the header invariants
    #[error("Invalid layout: {reason}")]
    InvalidLayout {
        /// Description of the violated invariant
        reason: &'static str,
    },
    /// Invalid parameter in `ZipListConfig`
    #[error("Invalid configuration: {parameter} = {value}")]
    InvalidConfiguration {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value
        value: usize,
    },
}
