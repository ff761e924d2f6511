use core::{fmt, str::FromStr};

use crate::{
    Base62Formatter, Base62FormatterRef, Error, Result, base62::decode_base62, time::KSUID_EPOCH,
};

/// Size of the binary form in bytes.
pub const BYTE_LEN: usize = 20;

/// Size of the big-endian timestamp prefix in bytes.
pub const TIMESTAMP_LEN: usize = 4;

/// Size of the random payload in bytes.
pub const PAYLOAD_LEN: usize = BYTE_LEN - TIMESTAMP_LEN;

/// Length of the base62 text form: `ceil(160 * log(2) / log(62))`.
pub const ENCODED_LEN: usize = 27;

/// A K-Sortable Unique IDentifier.
///
/// Stored as exactly 20 bytes: a big-endian `u32` count of seconds since
/// [`KSUID_EPOCH`] followed by a 16-byte payload. The derived [`Ord`] is the
/// unsigned byte-wise order of that array, which is also the lexicographic
/// order of [`Ksuid::encode`].
///
/// Values are immutable. Anything that looks like a conversion returns a new
/// `Ksuid`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Ksuid {
    bytes: [u8; BYTE_LEN],
}

impl Ksuid {
    /// The zero value, `000000000000000000000000000`.
    pub const NIL: Self = Self::from_bytes([0x00; BYTE_LEN]);

    /// The largest value, `aWgEPTl1tmebfsQzFP4bxwgy80V`.
    pub const MAX: Self = Self::from_bytes([0xFF; BYTE_LEN]);

    /// Wraps 20 raw bytes without validation; every bit pattern is a valid
    /// KSUID.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; BYTE_LEN]) -> Self {
        Self { bytes }
    }

    /// Builds a KSUID from an uncorrected timestamp (seconds since
    /// [`KSUID_EPOCH`]) and a payload.
    #[must_use]
    pub const fn from_components(raw_timestamp: u32, payload: [u8; PAYLOAD_LEN]) -> Self {
        let ts = raw_timestamp.to_be_bytes();
        let mut bytes = [0_u8; BYTE_LEN];
        let mut i = 0;
        while i < TIMESTAMP_LEN {
            bytes[i] = ts[i];
            i += 1;
        }
        while i < BYTE_LEN {
            bytes[i] = payload[i - TIMESTAMP_LEN];
            i += 1;
        }
        Self { bytes }
    }

    /// Parses the binary form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`] unless `data` is exactly
    /// [`BYTE_LEN`] bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use ksuid::{Error, Ksuid};
    ///
    /// let id = Ksuid::try_from_slice(&[0u8; 20]).unwrap();
    /// assert_eq!(id, Ksuid::NIL);
    ///
    /// assert_eq!(
    ///     Ksuid::try_from_slice(&[0u8; 19]),
    ///     Err(Error::InvalidLength { len: 19 })
    /// );
    /// ```
    pub fn try_from_slice(data: &[u8]) -> Result<Self> {
        let bytes: [u8; BYTE_LEN] = data
            .try_into()
            .map_err(|_| Error::InvalidLength { len: data.len() })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Parses the 27-character base62 text form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if the input is the wrong length,
    /// contains a character outside `[0-9A-Za-z]`, or encodes a value larger
    /// than [`Ksuid::MAX`].
    ///
    /// # Example
    ///
    /// ```
    /// use ksuid::Ksuid;
    ///
    /// let id = Ksuid::decode("0ujtsYcgvSTl8PAuAdqWYSMnLOv").unwrap();
    /// assert_eq!(id.timestamp(), 1_507_608_047);
    /// assert!(Ksuid::decode("0ujtsYcgvSTl8PAuAdqWYSMnLO!").is_err());
    /// ```
    pub fn decode(s: impl AsRef<[u8]>) -> Result<Self> {
        Ok(Self::from_bytes(decode_base62(s.as_ref())?))
    }

    /// Returns a stack-allocated base62 rendering of this KSUID.
    pub fn encode(&self) -> Base62Formatter {
        Base62Formatter::new(self)
    }

    /// Encodes into `buf` and returns a view over it.
    pub fn encode_to_buf<'buf>(&self, buf: &'buf mut [u8; ENCODED_LEN]) -> Base62FormatterRef<'buf> {
        Base62FormatterRef::new(self, buf)
    }

    /// Returns a reference to the underlying 20 bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BYTE_LEN] {
        &self.bytes
    }

    /// Returns a copy of the underlying 20 bytes.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; BYTE_LEN] {
        self.bytes
    }

    /// Seconds since [`KSUID_EPOCH`], exactly as stored.
    #[must_use]
    pub const fn raw_timestamp(&self) -> u32 {
        u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    /// Seconds since the Unix epoch, i.e. [`Self::raw_timestamp`] plus
    /// [`KSUID_EPOCH`].
    ///
    /// Widened to `u64` so timestamps past 2106 do not wrap.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.raw_timestamp() as u64 + KSUID_EPOCH
    }

    /// Returns the 16-byte payload.
    #[must_use]
    pub fn payload(&self) -> [u8; PAYLOAD_LEN] {
        let mut payload = [0_u8; PAYLOAD_LEN];
        payload.copy_from_slice(&self.bytes[TIMESTAMP_LEN..]);
        payload
    }

    /// Returns `true` if every byte is zero.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        let mut i = 0;
        while i < BYTE_LEN {
            if self.bytes[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Returns the immediately following KSUID.
    ///
    /// The payload is incremented as a 128-bit integer; on overflow the
    /// timestamp is incremented. [`Ksuid::MAX`] wraps to [`Ksuid::NIL`].
    #[must_use]
    pub fn next(&self) -> Self {
        let (payload, carry) = self.payload_u128().overflowing_add(1);
        let ts = self.raw_timestamp().wrapping_add(u32::from(carry));
        Self::from_components(ts, payload.to_be_bytes())
    }

    /// Returns the immediately preceding KSUID.
    ///
    /// The payload is decremented as a 128-bit integer; on underflow the
    /// timestamp is decremented. [`Ksuid::NIL`] wraps to [`Ksuid::MAX`].
    #[must_use]
    pub fn prev(&self) -> Self {
        let (payload, borrow) = self.payload_u128().overflowing_sub(1);
        let ts = self.raw_timestamp().wrapping_sub(u32::from(borrow));
        Self::from_components(ts, payload.to_be_bytes())
    }

    fn payload_u128(&self) -> u128 {
        u128::from_be_bytes(self.payload())
    }
}

#[cfg(feature = "std")]
impl Ksuid {
    /// Generates a KSUID for the current second using the operating system's
    /// secure random source.
    ///
    /// This is a stateless convenience wrapper over [`crate::KsuidGenerator`]
    /// with [`crate::SystemClock`] and [`crate::OsRandom`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::RandomSource`] if the OS cannot supply entropy.
    pub fn new() -> Result<Self> {
        crate::KsuidGenerator::new(crate::SystemClock, crate::OsRandom).generate()
    }

    /// Generates a KSUID for `datetime` (truncated to whole seconds) with a
    /// fresh random payload.
    ///
    /// # Errors
    ///
    /// - [`Error::TimestampOutOfRange`] if `datetime` precedes
    ///   [`KSUID_EPOCH`] or lies beyond the 32-bit range after it
    /// - [`Error::RandomSource`] if the OS cannot supply entropy
    pub fn from_datetime(datetime: std::time::SystemTime) -> Result<Self> {
        crate::KsuidGenerator::new(crate::SystemClock, crate::OsRandom).generate_at(datetime)
    }

    /// Builds a KSUID from `datetime` (truncated to whole seconds) and an
    /// explicit payload.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPayloadLength`] unless `payload` is 16 bytes
    /// - [`Error::TimestampOutOfRange`] as for [`Ksuid::from_datetime`]
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::{Duration, UNIX_EPOCH};
    /// use ksuid::Ksuid;
    ///
    /// let t = UNIX_EPOCH + Duration::from_secs(1_507_608_047);
    /// let payload = [0xB5, 0xA1, 0xCD, 0x34, 0xB5, 0xF9, 0x9D, 0x11, 0x54, 0xFB, 0x68, 0x53, 0x34, 0x5C, 0x97, 0x35];
    /// let id = Ksuid::from_parts(t, &payload).unwrap();
    /// assert_eq!(id.encode(), "0ujtsYcgvSTl8PAuAdqWYSMnLOv");
    /// ```
    pub fn from_parts(datetime: std::time::SystemTime, payload: &[u8]) -> Result<Self> {
        Self::from_unix_parts(crate::time::unix_seconds(datetime)?, payload)
    }

    /// Returns the corrected timestamp as a [`std::time::SystemTime`].
    ///
    /// Precision is whole seconds.
    #[must_use]
    pub fn datetime(&self) -> std::time::SystemTime {
        std::time::UNIX_EPOCH + core::time::Duration::from_secs(self.timestamp())
    }
}

impl Ksuid {
    /// Builds a KSUID from whole seconds since the Unix epoch and an explicit
    /// payload.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPayloadLength`] unless `payload` is 16 bytes
    /// - [`Error::TimestampOutOfRange`] if `unix_seconds` is outside
    ///   `KSUID_EPOCH..=KSUID_EPOCH + u32::MAX`
    pub fn from_unix_parts(unix_seconds: u64, payload: &[u8]) -> Result<Self> {
        let payload: [u8; PAYLOAD_LEN] = payload
            .try_into()
            .map_err(|_| Error::InvalidPayloadLength { len: payload.len() })?;
        let raw = crate::time::to_raw_timestamp(unix_seconds)?;
        Ok(Self::from_components(raw, payload))
    }
}

impl fmt::Display for Ksuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Ksuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ksuid")
            .field("id", &self.encode().as_str())
            .field("timestamp", &self.timestamp())
            .finish()
    }
}

impl FromStr for Ksuid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl TryFrom<&[u8]> for Ksuid {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self> {
        Self::try_from_slice(data)
    }
}

impl TryFrom<&str> for Ksuid {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl From<[u8; BYTE_LEN]> for Ksuid {
    fn from(bytes: [u8; BYTE_LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Ksuid> for [u8; BYTE_LEN] {
    fn from(id: Ksuid) -> Self {
        id.to_bytes()
    }
}

impl AsRef<[u8]> for Ksuid {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(feature = "alloc")]
impl From<Ksuid> for alloc::string::String {
    fn from(id: Ksuid) -> Self {
        id.encode().as_string()
    }
}

#[cfg(feature = "alloc")]
impl TryFrom<alloc::string::String> for Ksuid {
    type Error = Error;

    fn try_from(s: alloc::string::String) -> Result<Self> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EncodingError;

    const PAYLOAD: [u8; PAYLOAD_LEN] = [
        0xB5, 0xA1, 0xCD, 0x34, 0xB5, 0xF9, 0x9D, 0x11, 0x54, 0xFB, 0x68, 0x53, 0x34, 0x5C, 0x97,
        0x35,
    ];

    #[test]
    fn components_round_trip() {
        let id = Ksuid::from_components(107_608_047, PAYLOAD);
        assert_eq!(id.raw_timestamp(), 107_608_047);
        assert_eq!(id.timestamp(), 1_507_608_047);
        assert_eq!(id.payload(), PAYLOAD);
        assert_eq!(&id.as_bytes()[..4], &[0x06, 0x69, 0xF7, 0xEF]);
        assert_eq!(id.encode(), "0ujtsYcgvSTl8PAuAdqWYSMnLOv");
    }

    #[test]
    fn layout_is_big_endian_timestamp_then_payload() {
        let id = Ksuid::from_components(0x0102_0304, [0xAA; PAYLOAD_LEN]);
        let bytes = id.to_bytes();
        assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
        assert!(bytes[4..].iter().all(|&b| b == 0xAA));
        assert_eq!(core::mem::size_of::<Ksuid>(), BYTE_LEN);
    }

    #[test]
    fn nil_and_max() {
        assert!(Ksuid::NIL.is_nil());
        assert!(!Ksuid::MAX.is_nil());
        assert_eq!(Ksuid::default(), Ksuid::NIL);
        assert_eq!(Ksuid::NIL.encode(), "000000000000000000000000000");
        assert_eq!(Ksuid::MAX.encode(), "aWgEPTl1tmebfsQzFP4bxwgy80V");
        assert_eq!(Ksuid::NIL.timestamp(), KSUID_EPOCH);
        assert_eq!(Ksuid::MAX.raw_timestamp(), u32::MAX);
        assert_eq!(Ksuid::MAX.timestamp(), u64::from(u32::MAX) + KSUID_EPOCH);
    }

    #[test]
    fn binary_form_requires_exactly_twenty_bytes() {
        let id = Ksuid::from_components(42, PAYLOAD);
        assert_eq!(Ksuid::try_from_slice(id.as_bytes()), Ok(id));
        assert_eq!(
            Ksuid::try_from_slice(&[0; 19]),
            Err(Error::InvalidLength { len: 19 })
        );
        assert_eq!(
            Ksuid::try_from_slice(&[0; 21]),
            Err(Error::InvalidLength { len: 21 })
        );
        assert_eq!(
            Ksuid::try_from(&b"invalid"[..]),
            Err(Error::InvalidLength { len: 7 })
        );
    }

    #[test]
    fn text_form_rejects_malformed_input() {
        assert_eq!(
            Ksuid::decode("0ujtsYcgvSTl8PAuAdqWYSMnLO"),
            Err(Error::InvalidEncoding(EncodingError::InvalidLength { len: 26 }))
        );
        assert_eq!(
            Ksuid::decode("0ujtsYcgvSTl8PAuAdqWYSMnLOvv"),
            Err(Error::InvalidEncoding(EncodingError::InvalidLength { len: 28 }))
        );
        assert_eq!(
            Ksuid::decode("0ujtsYcgvSTl8PAu!dqWYSMnLOv"),
            Err(Error::InvalidEncoding(EncodingError::InvalidAscii {
                byte: b'!',
                index: 16,
            }))
        );
        assert_eq!(
            "aWgEPTl1tmebfsQzFP4bxwgy80W".parse::<Ksuid>(),
            Err(Error::InvalidEncoding(EncodingError::Overflow))
        );
        assert!(Ksuid::try_from("invalid").is_err());
    }

    #[test]
    fn explicit_parts_validate_payload_and_range() {
        let id = Ksuid::from_unix_parts(1_507_608_047, &PAYLOAD).unwrap();
        assert_eq!(id.encode(), "0ujtsYcgvSTl8PAuAdqWYSMnLOv");

        assert_eq!(
            Ksuid::from_unix_parts(1_507_608_047, &PAYLOAD[..15]),
            Err(Error::InvalidPayloadLength { len: 15 })
        );
        assert_eq!(
            Ksuid::from_unix_parts(KSUID_EPOCH - 1, &PAYLOAD),
            Err(Error::TimestampOutOfRange {
                unix_seconds: Some(KSUID_EPOCH - 1)
            })
        );
        let last = KSUID_EPOCH + u64::from(u32::MAX);
        assert_eq!(
            Ksuid::from_unix_parts(last, &PAYLOAD).unwrap().raw_timestamp(),
            u32::MAX
        );
        assert_eq!(
            Ksuid::from_unix_parts(last + 1, &PAYLOAD),
            Err(Error::TimestampOutOfRange {
                unix_seconds: Some(last + 1)
            })
        );
    }

    #[test]
    fn epoch_start_has_zero_raw_timestamp() {
        let id = Ksuid::from_unix_parts(KSUID_EPOCH, &PAYLOAD).unwrap();
        assert_eq!(id.raw_timestamp(), 0);
        assert_eq!(id.timestamp(), 1_400_000_000);
    }

    #[test]
    fn same_parts_reproduce_the_same_id() {
        let a = Ksuid::from_unix_parts(1_700_000_000, &PAYLOAD).unwrap();
        let b = Ksuid::from_unix_parts(1_700_000_000, &PAYLOAD).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.payload(), PAYLOAD);

        let other = Ksuid::from_unix_parts(1_700_000_000, &[7; PAYLOAD_LEN]).unwrap();
        assert_ne!(a, other);
        assert_eq!(a.raw_timestamp(), other.raw_timestamp());
        assert_eq!(&a.as_bytes()[..TIMESTAMP_LEN], &other.as_bytes()[..TIMESTAMP_LEN]);
    }

    #[test]
    fn next_and_prev_step_by_one() {
        let id = Ksuid::from_components(10, [0; PAYLOAD_LEN]);
        assert_eq!(id.next().payload()[PAYLOAD_LEN - 1], 1);
        assert_eq!(id.next().prev(), id);
        assert!(id < id.next());
        assert!(id.prev() < id);
    }

    #[test]
    fn next_and_prev_carry_into_timestamp() {
        let end = Ksuid::from_components(10, [0xFF; PAYLOAD_LEN]);
        assert_eq!(end.next(), Ksuid::from_components(11, [0; PAYLOAD_LEN]));

        let start = Ksuid::from_components(11, [0; PAYLOAD_LEN]);
        assert_eq!(start.prev(), end);

        assert_eq!(Ksuid::MAX.next(), Ksuid::NIL);
        assert_eq!(Ksuid::NIL.prev(), Ksuid::MAX);
    }

    #[test]
    fn byte_and_text_order_agree() {
        let ids = [
            Ksuid::NIL,
            Ksuid::from_components(0, [1; PAYLOAD_LEN]),
            Ksuid::from_components(1, [0; PAYLOAD_LEN]),
            Ksuid::from_components(107_608_047, PAYLOAD),
            Ksuid::from_components(u32::MAX, [0; PAYLOAD_LEN]),
            Ksuid::MAX,
        ];
        for a in &ids {
            for b in &ids {
                assert_eq!(a.cmp(b), a.encode().as_str().cmp(b.encode().as_str()));
            }
        }
    }

    #[cfg(feature = "std")]
    #[test]
    fn display_parse_and_datetime() {
        use std::time::{Duration, UNIX_EPOCH};

        let id = Ksuid::from_components(107_608_047, PAYLOAD);
        let text = id.to_string();
        assert_eq!(text, "0ujtsYcgvSTl8PAuAdqWYSMnLOv");
        assert_eq!(text.parse::<Ksuid>(), Ok(id));
        assert_eq!(Ksuid::try_from(text.clone()), Ok(id));
        assert_eq!(String::from(id), text);
        assert_eq!(
            id.datetime(),
            UNIX_EPOCH + Duration::from_secs(1_507_608_047)
        );
        assert!(format!("{id:?}").contains("0ujtsYcgvSTl8PAuAdqWYSMnLOv"));
    }

    #[cfg(feature = "std")]
    #[test]
    fn from_parts_truncates_sub_second_precision() {
        use std::time::{Duration, UNIX_EPOCH};

        let t = UNIX_EPOCH + Duration::from_millis(1_507_608_047_999);
        let id = Ksuid::from_parts(t, &PAYLOAD).unwrap();
        assert_eq!(id.timestamp(), 1_507_608_047);
        assert_eq!(id.payload(), PAYLOAD);

        let before = UNIX_EPOCH - Duration::from_secs(1);
        assert_eq!(
            Ksuid::from_parts(before, &PAYLOAD),
            Err(Error::TimestampOutOfRange { unix_seconds: None })
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn new_ids_round_trip() {
        for _ in 0..64 {
            let id = Ksuid::new().unwrap();
            assert_eq!(Ksuid::try_from_slice(id.as_bytes()), Ok(id));
            assert_eq!(Ksuid::decode(id.encode()), Ok(id));
            assert!(!id.is_nil());
        }
    }
}
