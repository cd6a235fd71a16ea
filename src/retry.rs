// ABOUTME: RetryPolicy - explicit retry, backoff, and fallback for call sites.
// ABOUTME: Nothing retries implicitly; a policy applies only where passed.

use std::time::Duration;

/// Retry policy applied at an invocation call site.
///
/// `max_attempts` counts the first try. Only worker-invocation failures are
/// retried: admission rejections, validation rejections, and an empty pool
/// surface immediately since retrying them cannot help within the window.
/// When every attempt fails, `fallback` (if set) is returned in place of
/// the final error.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first (always at least 1).
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
    /// Value returned when every attempt fails.
    pub fallback: Option<String>,
}

impl RetryPolicy {
    /// A policy with the given attempt budget, no backoff, and no fallback.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Duration::ZERO,
            fallback: None,
        }
    }

    /// A single attempt with no fallback: the behavior of plain execution.
    pub fn none() -> Self {
        Self::new(1)
    }

    /// Set a fixed delay between attempts.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the value returned when every attempt fails.
    pub fn fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_never_below_one() {
        assert_eq!(RetryPolicy::new(0).max_attempts, 1);
        assert_eq!(RetryPolicy::new(3).max_attempts, 3);
    }

    #[test]
    fn test_builder() {
        let policy = RetryPolicy::new(2)
            .backoff(Duration::from_millis(250))
            .fallback("service degraded");

        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.backoff, Duration::from_millis(250));
        assert_eq!(policy.fallback.as_deref(), Some("service degraded"));
    }

    #[test]
    fn test_default_is_single_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 1);
        assert!(policy.fallback.is_none());
        assert!(policy.backoff.is_zero());
    }
}
