use ::rand::{TryRngCore, rngs::OsRng};

use crate::{Error, PAYLOAD_LEN, RandSource, Result};

/// A `RandSource` that reads directly from the operating system (`getrandom`).
///
/// Every call is a syscall, which makes it slower than [`crate::ThreadRandom`],
/// but failures are reported instead of panicking.
#[derive(Default, Clone, Copy, Debug)]
pub struct OsRandom;

impl RandSource for OsRandom {
    fn try_payload(&self) -> Result<[u8; PAYLOAD_LEN]> {
        let mut payload = [0_u8; PAYLOAD_LEN];
        OsRng.try_fill_bytes(&mut payload).map_err(|_e| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "os random source failed");
            Error::RandomSource
        })?;
        Ok(payload)
    }
}
