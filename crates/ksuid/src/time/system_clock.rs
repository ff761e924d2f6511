use crate::TimeSource;

/// A [`TimeSource`] backed by the system wall clock.
///
/// Readings before the Unix epoch are reported as `0`; the generator clamps
/// them into the representable range.
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_seconds(&self) -> u64 {
        #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
        let now = web_time::SystemTime::now().duration_since(web_time::UNIX_EPOCH);
        #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
        let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH);

        now.map(|d| d.as_secs()).unwrap_or_default()
    }
}
