use crate::base62::EncodingError;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All possible errors that `ksuid` can produce.
///
/// Every fallible constructor either returns a fully formed [`crate::Ksuid`]
/// or one of these; there is no partially initialized state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Binary input was not exactly [`crate::BYTE_LEN`] bytes.
    #[error("invalid ksuid length: expected 20 bytes, got {len}")]
    InvalidLength { len: usize },

    /// Text input was not a well-formed 27-character base62 string.
    #[error("invalid ksuid encoding: {0}")]
    InvalidEncoding(#[from] EncodingError),

    /// An explicit payload was not exactly [`crate::PAYLOAD_LEN`] bytes.
    #[error("invalid payload length: expected 16 bytes, got {len}")]
    InvalidPayloadLength { len: usize },

    /// The requested time cannot be represented in the 32-bit timestamp field.
    ///
    /// `unix_seconds` is `None` when the time precedes the Unix epoch itself.
    #[error("timestamp out of range: {unix_seconds:?}")]
    TimestampOutOfRange { unix_seconds: Option<u64> },

    /// The random source failed to produce a payload.
    #[error("random source failed to produce entropy")]
    RandomSource,
}
