use crate::{Error, Result};

/// KSUID epoch: Tuesday, May 13, 2014 16:53:20 UTC, in seconds since the Unix
/// epoch.
///
/// Stored timestamps count from here, which moves the end of the 32-bit range
/// out to the year 2150. This is the only epoch correction applied anywhere in
/// the crate: [`crate::Ksuid::raw_timestamp`] is relative to it and
/// [`crate::Ksuid::timestamp`] adds it back exactly once.
pub const KSUID_EPOCH: u64 = 1_400_000_000;

/// The last Unix second a KSUID can represent.
pub const MAX_UNIX_SECONDS: u64 = KSUID_EPOCH + u32::MAX as u64;

/// A trait for wall-clock sources.
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests.
///
/// # Example
///
/// ```
/// use ksuid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_seconds(&self) -> u64 {
///         1_700_000_000
///     }
/// }
///
/// assert_eq!(FixedTime.current_seconds(), 1_700_000_000);
/// ```
pub trait TimeSource {
    /// Returns whole seconds since the Unix epoch (not [`KSUID_EPOCH`]).
    fn current_seconds(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_seconds(&self) -> u64 {
        (**self).current_seconds()
    }
}

/// Converts Unix seconds into the 32-bit field stored in a KSUID.
///
/// # Errors
///
/// Returns [`Error::TimestampOutOfRange`] outside
/// `KSUID_EPOCH..=MAX_UNIX_SECONDS`.
pub fn to_raw_timestamp(unix_seconds: u64) -> Result<u32> {
    unix_seconds
        .checked_sub(KSUID_EPOCH)
        .and_then(|raw| u32::try_from(raw).ok())
        .ok_or(Error::TimestampOutOfRange {
            unix_seconds: Some(unix_seconds),
        })
}

/// Converts Unix seconds into the 32-bit field, clamping to `0..=u32::MAX`.
///
/// Used for clock readings, where a skewed clock should still yield an ID.
#[must_use]
pub fn clamp_raw_timestamp(unix_seconds: u64) -> u32 {
    u32::try_from(unix_seconds.saturating_sub(KSUID_EPOCH)).unwrap_or(u32::MAX)
}

/// Whole seconds between the Unix epoch and `datetime`.
///
/// # Errors
///
/// Returns [`Error::TimestampOutOfRange`] if `datetime` precedes the Unix
/// epoch.
#[cfg(feature = "std")]
pub fn unix_seconds(datetime: std::time::SystemTime) -> Result<u64> {
    datetime
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| Error::TimestampOutOfRange { unix_seconds: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_timestamp_bounds() {
        assert_eq!(to_raw_timestamp(KSUID_EPOCH), Ok(0));
        assert_eq!(to_raw_timestamp(MAX_UNIX_SECONDS), Ok(u32::MAX));
        assert_eq!(to_raw_timestamp(1_507_608_047), Ok(107_608_047));
        assert!(to_raw_timestamp(0).is_err());
        assert!(to_raw_timestamp(MAX_UNIX_SECONDS + 1).is_err());
    }

    #[test]
    fn clamping_saturates_both_ends() {
        assert_eq!(clamp_raw_timestamp(0), 0);
        assert_eq!(clamp_raw_timestamp(KSUID_EPOCH + 5), 5);
        assert_eq!(clamp_raw_timestamp(u64::MAX), u32::MAX);
    }
}
