/// Time source for token issuance and expiry checks
///
/// Encoding and decoding read the same clock, so tests can move time
/// forward instead of sleeping.

/// Current time as unix seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[cfg(test)]
pub use manual::ManualClock;
