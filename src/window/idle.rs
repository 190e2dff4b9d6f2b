use std::time::{Duration, Instant};

use crate::constants::IDLE_CHECK_INTERVAL;

/// Coarse idle accounting. Input only sets a flag; the periodic check turns
/// that flag into a new "last active" timestamp, so idle time has the
/// granularity of the check interval.
#[derive(Debug, Clone)]
pub struct IdleTracker {
    last_active: Instant,
    input_since_check: bool,
    next_check: Instant,
    interval: Duration,
}

impl IdleTracker {
    pub fn new(now: Instant) -> Self {
        Self::with_interval(now, IDLE_CHECK_INTERVAL)
    }

    pub fn with_interval(now: Instant, interval: Duration) -> Self {
        Self {
            last_active: now,
            input_since_check: false,
            next_check: now + interval,
            interval,
        }
    }

    pub fn mark_input(&mut self) {
        self.input_since_check = true;
    }

    pub fn next_check(&self) -> Instant {
        self.next_check
    }

    pub fn tick(&mut self, now: Instant) {
        if now < self.next_check {
            return;
        }
        if std::mem::take(&mut self.input_since_check) {
            self.last_active = now;
        }
        self.next_check = now + self.interval;
    }

    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    pub fn idle_time(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_active)
    }
}
