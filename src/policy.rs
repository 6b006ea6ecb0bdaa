//! Retry decisions and backoff timing.
//!
//! Everything here is pure: the same `(outcome, attempt)` always yields the
//! same answer, so a [`RetryPolicy`] can be shared by any number of
//! concurrent calls.

use std::{fmt, sync::Arc, time::Duration};

/// Result of one transport attempt, as seen by the retry policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No response was received.
    NetworkFailure,
    /// A response arrived with a non-success status code.
    Status(u16),
}

impl Outcome {
    /// Network failures, 429 and 5xx are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match *self {
            Self::NetworkFailure => true,
            Self::Status(429) => true,
            Self::Status(status) => (500..600).contains(&status),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkFailure => f.write_str("network error"),
            Self::Status(status) => write!(f, "{status}"),
        }
    }
}

/// Maps a 0-based retry number to the delay before that retry.
#[derive(Clone)]
pub enum Backoff {
    /// `min(base × factor^attempt, max)`.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
    },
    Fixed(Duration),
    Custom(Arc<dyn Fn(u32) -> Duration + Send + Sync>),
}

impl Backoff {
    /// Exponential curve starting at `base`, growing by `factor`, capped at `max`.
    pub fn exponential(base: Duration, factor: f64, max: Duration) -> Self {
        Self::Exponential { base, factor, max }
    }

    /// Delay before the retry that follows `attempt` retries already made.
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Exponential { base, factor, max } => {
                // powi takes i32; anything past that is far beyond any cap anyway.
                let exp = attempt.min(i32::MAX as u32) as i32;
                let nanos = base.as_nanos() as f64 * factor.powi(exp);
                let max_nanos = (max.as_nanos() as f64).min(u64::MAX as f64);
                if !nanos.is_finite() || nanos >= max_nanos {
                    *max
                } else {
                    Duration::from_nanos(nanos.max(0.0).round() as u64)
                }
            }
            Self::Fixed(delay) => *delay,
            Self::Custom(f) => f(attempt),
        }
    }
}

impl Default for Backoff {
    /// 100 ms doubling per retry, capped at 5 s.
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(5),
        }
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exponential { base, factor, max } => f
                .debug_struct("Exponential")
                .field("base", base)
                .field("factor", factor)
                .field("max", max)
                .finish(),
            Self::Fixed(delay) => f.debug_tuple("Fixed").field(delay).finish(),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Retry budget and backoff curve for one client.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    /// Default backoff with a custom retry budget.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Replaces the backoff curve.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replaces the backoff curve with a function of the 0-based retry number.
    pub fn with_backoff_fn<F>(self, f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        self.with_backoff(Backoff::Custom(Arc::new(f)))
    }

    /// Whether `outcome` could succeed on another attempt, budget aside.
    pub fn is_transient(&self, outcome: &Outcome) -> bool {
        outcome.is_transient()
    }

    /// Whether to retry after `outcome`, given `attempt` retries already made.
    pub fn should_retry(&self, outcome: &Outcome, attempt: u32) -> bool {
        attempt < self.max_retries && outcome.is_transient()
    }

    /// Delay before the retry that follows `attempt` retries already made.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Backoff, Outcome, RetryPolicy};

    #[test]
    fn network_failure_retries_until_budget_spent() {
        let policy = RetryPolicy::new(3);
        for attempt in 0..3 {
            assert!(policy.should_retry(&Outcome::NetworkFailure, attempt));
        }
        assert!(!policy.should_retry(&Outcome::NetworkFailure, 3));
        assert!(!policy.should_retry(&Outcome::NetworkFailure, 4));
    }

    #[test]
    fn server_errors_and_rate_limit_are_transient() {
        let policy = RetryPolicy::new(3);
        for status in 500..=599 {
            assert!(policy.should_retry(&Outcome::Status(status), 0), "{status}");
            assert!(!policy.should_retry(&Outcome::Status(status), 3), "{status}");
        }
        assert!(policy.should_retry(&Outcome::Status(429), 2));
    }

    #[test]
    fn client_errors_never_retry() {
        let policy = RetryPolicy::new(10);
        for status in (400..=499).filter(|status| *status != 429) {
            for attempt in 0..10 {
                assert!(!policy.should_retry(&Outcome::Status(status), attempt), "{status}");
            }
        }
    }

    #[test]
    fn other_statuses_are_not_transient() {
        assert!(!Outcome::Status(302).is_transient());
        assert!(!Outcome::Status(600).is_transient());
    }

    #[test]
    fn classification_is_pure() {
        let policy = RetryPolicy::default();
        for outcome in [Outcome::NetworkFailure, Outcome::Status(503), Outcome::Status(404)] {
            for attempt in 0..5 {
                assert_eq!(
                    policy.should_retry(&outcome, attempt),
                    policy.should_retry(&outcome, attempt)
                );
            }
        }
    }

    #[test]
    fn default_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next_delay(0), Duration::from_millis(100));
        assert_eq!(policy.next_delay(1), Duration::from_millis(200));
        assert_eq!(policy.next_delay(2), Duration::from_millis(400));
        assert_eq!(policy.next_delay(6), Duration::from_secs(5));
        assert_eq!(policy.next_delay(u32::MAX), Duration::from_secs(5));

        let mut previous = Duration::ZERO;
        for attempt in 0..64 {
            let delay = policy.next_delay(attempt);
            assert!(delay >= previous);
            previous = delay;
        }
    }

    #[test]
    fn default_budget_is_three_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert!(policy.should_retry(&Outcome::Status(503), 2));
        assert!(!policy.should_retry(&Outcome::Status(503), 3));
    }

    #[test]
    fn exponential_backoff_keeps_sub_millisecond_precision() {
        let half_ms = Backoff::exponential(Duration::from_micros(500), 2.0, Duration::from_secs(5));
        assert_eq!(half_ms.delay(0), Duration::from_micros(500));
        assert_eq!(half_ms.delay(1), Duration::from_millis(1));

        let odd = Backoff::exponential(Duration::from_micros(1_500), 2.0, Duration::from_secs(5));
        assert_eq!(odd.delay(0), Duration::from_micros(1_500));
        assert_eq!(odd.delay(1), Duration::from_millis(3));
        assert_eq!(odd.delay(2), Duration::from_millis(6));

        let capped = Backoff::exponential(Duration::from_micros(300), 3.0, Duration::from_micros(2_000));
        assert_eq!(capped.delay(1), Duration::from_micros(900));
        assert_eq!(capped.delay(2), Duration::from_micros(2_000));
    }

    #[test]
    fn custom_backoff_replaces_default_curve() {
        let policy = RetryPolicy::new(5).with_backoff_fn(|attempt| Duration::from_secs(attempt as u64 + 1));
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.next_delay(0), Duration::from_secs(1));
        assert_eq!(policy.next_delay(4), Duration::from_secs(5));

        let fixed = RetryPolicy::none().with_backoff(Backoff::Fixed(Duration::from_millis(7)));
        assert_eq!(fixed.next_delay(3), Duration::from_millis(7));
        assert!(!fixed.should_retry(&Outcome::NetworkFailure, 0));
    }

    #[test]
    fn outcome_display_marks_network_failures() {
        assert_eq!(Outcome::NetworkFailure.to_string(), "network error");
        assert_eq!(Outcome::Status(503).to_string(), "503");
    }
}
