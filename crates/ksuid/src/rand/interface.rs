use crate::{PAYLOAD_LEN, Result};

/// A trait for sources of KSUID payload entropy.
///
/// This abstraction allows you to plug in the OS random source, a faster
/// thread-local CSPRNG, or a fixed payload in tests.
///
/// # Example
/// ```
/// use ksuid::{PAYLOAD_LEN, RandSource, Result};
///
/// struct FixedRand;
/// impl RandSource for FixedRand {
///     fn try_payload(&self) -> Result<[u8; PAYLOAD_LEN]> {
///         Ok([7; PAYLOAD_LEN])
///     }
/// }
///
/// assert_eq!(FixedRand.try_payload().unwrap(), [7; PAYLOAD_LEN]);
/// ```
pub trait RandSource {
    /// Returns 16 fresh random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RandomSource`] if entropy cannot be obtained.
    fn try_payload(&self) -> Result<[u8; PAYLOAD_LEN]>;
}

impl<R: RandSource + ?Sized> RandSource for &R {
    fn try_payload(&self) -> Result<[u8; PAYLOAD_LEN]> {
        (**self).try_payload()
    }
}
