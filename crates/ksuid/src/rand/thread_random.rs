use ::rand::{RngCore, rng};

use crate::{PAYLOAD_LEN, RandSource, Result};

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// This RNG is fast, cryptographically secure (ChaCha-based), and reseeded
/// from the OS periodically. It never fails once seeded.
///
/// This type does not store the RNG itself; it accesses the thread-local
/// generator on each call, so it is `Send + Sync` and may be shared freely.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn try_payload(&self) -> Result<[u8; PAYLOAD_LEN]> {
        let mut payload = [0_u8; PAYLOAD_LEN];
        rng().fill_bytes(&mut payload);
        Ok(payload)
    }
}
