//! Retry policy: decides backoff delays for transient write failures.

use std::time::Duration;

/// Capped exponential backoff.
///
/// delay = base_delay * multiplier^(attempts - 1), up to `max_attempts`
/// total attempts. Terminal failures never consult this policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Backoff multiplier per attempt.
    pub multiplier: f64,

    /// Attempt ceiling, counting the initial write.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    /// 500ms base, x2 per attempt, 5 attempts total.
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            multiplier: 2.0,
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following attempt number `attempts`
    /// (1-indexed).
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let base_secs = self.base_delay.as_secs_f64();
        let delay_secs = base_secs * self.multiplier.powi(attempts.saturating_sub(1) as i32);
        Duration::from_secs_f64(delay_secs)
    }

    /// True once `attempts` writes have been issued and failed.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 500)]
    #[case(2, 1000)]
    #[case(3, 2000)]
    #[case(4, 4000)]
    fn backoff_doubles_per_attempt(#[case] attempts: u32, #[case] expected_ms: u64) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next_delay(attempts), Duration::from_millis(expected_ms));
    }

    #[test]
    fn attempt_ceiling() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_exhausted(4));
        assert!(policy.is_exhausted(5));
        assert!(policy.is_exhausted(6));
    }

    #[test]
    fn zero_attempts_uses_base_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next_delay(0), Duration::from_millis(500));
    }
}
