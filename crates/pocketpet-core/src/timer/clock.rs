//! Session countdown.
//!
//! `remaining = total - (now - start)`, saturating at zero. Victory is
//! latched: the first poll that sees zero reports it, every later poll
//! returns `false`.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct SessionClock {
    start: Instant,
    total: Duration,
    victory_reported: bool,
}

impl SessionClock {
    pub fn new(start: Instant, total: Duration) -> Self {
        Self {
            start,
            total,
            victory_reported: false,
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.total.saturating_sub(self.elapsed(now))
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }

    pub fn victory_reported(&self) -> bool {
        self.victory_reported
    }

    /// Returns `true` exactly once, on the first call after time ran out.
    pub fn poll_victory(&mut self, now: Instant) -> bool {
        if self.victory_reported || !self.is_expired(now) {
            return false;
        }
        self.victory_reported = true;
        true
    }

    /// Shorten the session. Returns the amount actually removed.
    pub fn cut(&mut self, by: Duration) -> Duration {
        let before = self.total;
        self.total = self.total.saturating_sub(by);
        before - self.total
    }

    /// Collapse the remaining time to zero.
    pub fn expire(&mut self, now: Instant) {
        self.total = self.elapsed(now);
    }
}

/// `HHH:MM:SS`, hours padded to at least three digits.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:03}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
