//! # Polling policy for long-running remote operations.
//!
//! [`PollingPolicy`] is the `(frequency, timeout)` pair the controller runs with:
//! - [`PollingPolicy::frequency`] fixed sleep between two polls;
//! - [`PollingPolicy::timeout`] overall polling budget.
//!
//! A zero timeout disables polling: the status is fetched exactly once and returned,
//! whatever it is, and no events are published.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use pkgvisor::PollingPolicy;
//!
//! let policy = PollingPolicy::new(Duration::from_secs(1), Duration::from_secs(10));
//! assert!(!policy.is_single_fetch());
//! assert_eq!(policy.budget_ms(), 10_000);
//!
//! assert!(PollingPolicy::once().is_single_fetch());
//! ```

use std::time::Duration;

/// Frequency and timeout of a poll loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollingPolicy {
    /// Delay between two consecutive polls.
    pub frequency: Duration,
    /// Overall budget; `Duration::ZERO` means "fetch once, do not poll".
    pub timeout: Duration,
}

impl PollingPolicy {
    pub const fn new(frequency: Duration, timeout: Duration) -> Self {
        Self { frequency, timeout }
    }

    /// A policy that fetches once and never polls.
    pub const fn once() -> Self {
        Self {
            frequency: Duration::ZERO,
            timeout: Duration::ZERO,
        }
    }

    /// True if this policy performs a single fetch instead of a poll loop.
    #[inline]
    pub fn is_single_fetch(&self) -> bool {
        self.timeout.is_zero()
    }

    /// Returns a copy with the given timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a copy with the given frequency.
    pub fn with_frequency(mut self, frequency: Duration) -> Self {
        self.frequency = frequency;
        self
    }

    /// Starting value of the remaining-wait counter, in milliseconds.
    #[inline]
    pub fn budget_ms(&self) -> i64 {
        duration_ms(self.timeout)
    }

    /// Amount subtracted from the remaining-wait counter after each pending poll.
    #[inline]
    pub fn step_ms(&self) -> i64 {
        duration_ms(self.frequency)
    }
}

impl Default for PollingPolicy {
    /// Returns a single-fetch policy with a 30s frequency ready for `with_timeout`.
    fn default() -> Self {
        Self {
            frequency: Duration::from_secs(30),
            timeout: Duration::ZERO,
        }
    }
}

fn duration_ms(d: Duration) -> i64 {
    d.as_millis().min(i64::MAX as u128) as i64
}
