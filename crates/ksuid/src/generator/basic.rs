#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Ksuid, Result,
    rand::RandSource,
    time::{TimeSource, clamp_raw_timestamp, to_raw_timestamp},
};

/// A stateless KSUID generator over an injected clock and random source.
///
/// Every call reads the clock once and draws one 16-byte payload; there is no
/// shared mutable state, so a generator can be used from many threads at once
/// when `T` and `R` are `Sync`. IDs created within the same second are ordered
/// only by their random payloads.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Probabilistically unique (128 random bits per second)
/// - ✅ Time-ordered at one-second granularity
///
/// # Example
/// ```
/// use ksuid::{KsuidGenerator, OsRandom, SystemClock};
///
/// let generator = KsuidGenerator::new(SystemClock, OsRandom);
/// let a = generator.generate().unwrap();
/// let b = generator.generate().unwrap();
/// assert_ne!(a, b);
/// ```
#[derive(Clone, Debug, Default)]
pub struct KsuidGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    time: T,
    rng: R,
}

impl<T, R> KsuidGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    /// Creates a new [`KsuidGenerator`] with the provided time source and RNG.
    ///
    /// # Parameters
    /// - `time`: A [`TimeSource`] used to retrieve the current second
    /// - `rng`: A [`RandSource`] used to fill the payload
    pub const fn new(time: T, rng: R) -> Self {
        Self { time, rng }
    }

    /// Generates a KSUID for the current second.
    ///
    /// Clock readings outside the representable range are clamped into the
    /// 32-bit field rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RandomSource`] if the random source fails.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self) -> Result<Ksuid> {
        let raw = clamp_raw_timestamp(self.time.current_seconds());
        let payload = self.rng.try_payload()?;
        Ok(Ksuid::from_components(raw, payload))
    }

    /// Generates a KSUID for the given Unix second with a fresh payload.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::TimestampOutOfRange`] if `unix_seconds` is outside
    ///   `KSUID_EPOCH..=MAX_UNIX_SECONDS`
    /// - [`crate::Error::RandomSource`] if the random source fails
    ///
    /// [`KSUID_EPOCH`]: crate::KSUID_EPOCH
    /// [`MAX_UNIX_SECONDS`]: crate::MAX_UNIX_SECONDS
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate_at_unix(&self, unix_seconds: u64) -> Result<Ksuid> {
        let raw = to_raw_timestamp(unix_seconds)?;
        let payload = self.rng.try_payload()?;
        Ok(Ksuid::from_components(raw, payload))
    }

    /// Generates a KSUID for `datetime`, truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// As for [`Self::generate_at_unix`]; times before the Unix epoch are also
    /// [`crate::Error::TimestampOutOfRange`].
    #[cfg(feature = "std")]
    pub fn generate_at(&self, datetime: std::time::SystemTime) -> Result<Ksuid> {
        self.generate_at_unix(crate::time::unix_seconds(datetime)?)
    }

    /// Returns the time source.
    pub const fn time_source(&self) -> &T {
        &self.time
    }

    /// Returns the random source.
    pub const fn rand_source(&self) -> &R {
        &self.rng
    }
}
