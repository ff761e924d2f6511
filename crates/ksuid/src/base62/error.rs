/// Reasons a string fails to decode as a base62 [`crate::Ksuid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum EncodingError {
    /// The input was not exactly [`crate::ENCODED_LEN`] characters long.
    #[error("invalid length: expected 27 characters, got {len}")]
    InvalidLength { len: usize },

    /// The input contained a byte outside `[0-9A-Za-z]`.
    #[error("invalid ascii byte {byte:#04x} at index {index}")]
    InvalidAscii { byte: u8, index: usize },

    /// The decoded magnitude does not fit in 160 bits.
    #[error("decoded value overflows 20 bytes")]
    Overflow,
}
