//! Binary column adapter.
//!
//! Storage clients that bind application types to binary columns (a `bytea`
//! column in PostgreSQL, a `blob` in CQL, ...) only need two operations: turn a
//! value into raw bytes on write, and rebuild it from raw bytes on read.
//! [`BinaryColumn`] is that narrow interface, so a client can bind to it
//! without this crate depending on the client.

use crate::{BYTE_LEN, Ksuid, Result};

/// A value that round-trips through an arbitrary-length binary column.
pub trait BinaryColumn: Sized {
    /// The encoded representation handed to the storage client.
    type Bytes: AsRef<[u8]>;

    /// Encodes the value for writing. Infallible.
    fn marshal(&self) -> Self::Bytes;

    /// Decodes a value read from the column.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a valid encoding; the storage client
    /// surfaces it as a column-decode error.
    fn unmarshal(data: &[u8]) -> Result<Self>;
}

/// KSUIDs are stored as their 20 raw bytes with no transformation.
///
/// # Example
/// ```
/// use ksuid::{BinaryColumn, Ksuid};
///
/// let id = Ksuid::decode("0ujtsYcgvSTl8PAuAdqWYSMnLOv").unwrap();
/// let cell = id.marshal();
/// assert_eq!(cell.len(), 20);
/// assert_eq!(Ksuid::unmarshal(&cell).unwrap(), id);
/// ```
impl BinaryColumn for Ksuid {
    type Bytes = [u8; BYTE_LEN];

    fn marshal(&self) -> Self::Bytes {
        self.to_bytes()
    }

    fn unmarshal(data: &[u8]) -> Result<Self> {
        Self::try_from_slice(data)
    }
}
