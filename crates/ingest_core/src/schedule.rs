use std::time::Duration;

use crate::SessionConfig;

/// Two-tier poll spacing: the base interval until `threshold` polls have
/// elapsed without a terminal status, the backoff interval from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    base: Duration,
    backoff: Duration,
    threshold: u32,
    poll_count: u32,
}

impl PollSchedule {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            base: config.base_interval(),
            backoff: config.backoff_interval(),
            threshold: config.backoff_threshold,
            poll_count: 0,
        }
    }

    pub fn poll_count(&self) -> u32 {
        self.poll_count
    }

    /// How long to wait before the next poll.
    pub fn current_interval(&self) -> Duration {
        if self.poll_count >= self.threshold {
            self.backoff
        } else {
            self.base
        }
    }

    /// Records a completed wait; returns the new poll count.
    pub fn advance(&mut self) -> u32 {
        self.poll_count = self.poll_count.saturating_add(1);
        self.poll_count
    }
}
