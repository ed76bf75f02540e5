use std::time::Duration;

/// How a task is retried after a transient failure.
///
/// `max_retries` counts retries, not attempts: a policy of 3 allows the
/// initial run plus three more. Every retry waits the same `countdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub countdown: Duration,
}

impl RetryPolicy {
    /// Fail on the first error.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            countdown: Duration::ZERO,
        }
    }

    pub const fn fixed(max_retries: u32, countdown: Duration) -> Self {
        Self {
            max_retries,
            countdown,
        }
    }

    /// Whether another retry is allowed after `retries` retries have already run.
    pub fn allows_retry(&self, retries: u32) -> bool {
        retries < self.max_retries
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
    fn test_none_never_retries() {
        assert!(!RetryPolicy::none().allows_retry(0));
        assert_eq!(RetryPolicy::default(), RetryPolicy::none());
    }

    #[test]
    fn test_fixed_allows_exactly_max_retries() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(60));
        assert!(policy.allows_retry(0));
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));
        assert_eq!(policy.countdown, Duration::from_secs(60));
    }
}
