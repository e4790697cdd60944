use std::time::Duration;

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Branch lookups right after the first commit of a new repository may
    /// race GitHub's internal propagation.
    pub const BRANCH_REF: RetryPolicy = RetryPolicy::new(5, Duration::from_secs(1));

    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Same bound without any pause, for tests and local fakes.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Pause before the next attempt after `attempt` (1-indexed) failed, or
    /// `None` once the budget is spent.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.max_attempts).then_some(self.delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::BRANCH_REF
    }
}
