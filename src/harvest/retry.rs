//! Bounded exponential backoff for rate-limited search pages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Outcome of a retry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait this long, then retry the same page.
    Retry(Duration),
    /// Retries exhausted; keep what has been gathered.
    GiveUp,
}

/// delay(k) = min(base * 2^k, max) for the k-th consecutive rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "secs")]
    pub base_delay: Duration,
    #[serde(with = "secs")]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(60),
            max_delay: Duration::from_secs(15 * 60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Decides what to do after the `attempt`-th (0-based) consecutive failure.
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        RetryDecision::Retry(backoff_delay(attempt, self.base_delay, self.max_delay))
    }
}

/// Exponential delay, saturating instead of overflowing.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    base.checked_mul(factor).unwrap_or(max).min(max)
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::new(4, Duration::from_secs(60));
        assert_eq!(policy.decide(0), RetryDecision::Retry(Duration::from_secs(60)));
        assert_eq!(policy.decide(1), RetryDecision::Retry(Duration::from_secs(120)));
        assert_eq!(policy.decide(2), RetryDecision::Retry(Duration::from_secs(240)));
        assert_eq!(policy.decide(3), RetryDecision::Retry(Duration::from_secs(480)));
        assert_eq!(policy.decide(4), RetryDecision::GiveUp);
    }

    #[test]
    fn test_delay_is_capped() {
        let policy =
            RetryPolicy::new(10, Duration::from_secs(60)).with_max_delay(Duration::from_secs(100));
        assert_eq!(policy.decide(5), RetryDecision::Retry(Duration::from_secs(100)));
        assert_eq!(
            backoff_delay(40, Duration::from_secs(60), Duration::from_secs(900)),
            Duration::from_secs(900)
        );
    }

    #[test]
    fn test_zero_attempts_never_retries() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.decide(0), RetryDecision::GiveUp);
    }

    #[test]
    fn test_policy_serializes_as_seconds() {
        let json = serde_json::to_value(RetryPolicy::default()).unwrap();
        assert_eq!(json["base_delay"], 60);
        assert_eq!(json["max_delay"], 900);
    }
}
