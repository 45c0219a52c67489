//! Clock abstraction
//!
//! Rate-limit windows and CSRF expiry are computed against a [`Clock`] so
//! tests can move time explicitly instead of sleeping.

/// Source of wall-clock time in unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Production clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-helpers"))]
mod manual {
    use super::Clock;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    /// Test clock. Clones share the same current time.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now_ms: Arc<AtomicI64>,
    }

    impl ManualClock {
        pub fn new(start_ms: i64) -> Self {
            Self {
                now_ms: Arc::new(AtomicI64::new(start_ms)),
            }
        }

        pub fn advance(&self, by: Duration) {
            self.now_ms
                .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
        }

        pub fn set(&self, now_ms: i64) {
            self.now_ms.store(now_ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.now_ms.load(Ordering::SeqCst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_clock_is_unix_ms() {
        let now = SystemClock.now_ms();
        // 2020-01-01T00:00:00Z
        assert!(now > 1_577_836_800_000);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1_000);
        let other = clock.clone();

        other.advance(Duration::from_secs(2));
        assert_eq!(clock.now_ms(), 3_000);

        clock.set(10);
        assert_eq!(other.now_ms(), 10);
    }
}
