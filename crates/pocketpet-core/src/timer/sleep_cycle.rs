//! Per-minute sleep accounting.
//!
//! While the pet sleeps, each minute either restores `sleep` or, once the
//! bar is full, costs a little happiness. Sleeping past the optimal length
//! costs one happiness point per `overtime_divisor_minutes` of overtime;
//! after charging, the start time is rolled forward so the same overtime is
//! never charged twice.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::SleepConfig;
use crate::pet::{Stat, STAT_MAX};

#[derive(Debug, Clone, Default)]
pub struct SleepCycle {
    started: Option<Instant>,
}

impl SleepCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_sleeping(&self) -> bool {
        self.started.is_some()
    }

    pub fn started(&self) -> Option<Instant> {
        self.started
    }

    pub fn begin(&mut self, now: Instant) {
        self.started = Some(now);
    }

    /// Clear the start time, returning how long the pet slept.
    pub fn end(&mut self, now: Instant) -> Option<Duration> {
        self.started
            .take()
            .map(|start| now.saturating_duration_since(start))
    }

    /// Deltas for one minute of sleep. `current_sleep` is the stat value
    /// before this minute is applied.
    pub fn minute(&mut self, now: Instant, current_sleep: f64, cfg: &SleepConfig) -> Vec<(Stat, f64)> {
        let Some(start) = self.started else {
            return Vec::new();
        };

        let mut deltas = Vec::with_capacity(2);
        if current_sleep < STAT_MAX {
            deltas.push((Stat::Sleep, cfg.gain_per_minute));
        } else {
            deltas.push((Stat::Happiness, -cfg.oversleep_happiness_per_minute));
        }

        // An unrepresentable optimum is never reached.
        let Ok(optimal) = Duration::try_from_secs_f64(cfg.optimal_hours * 3600.0) else {
            return deltas;
        };
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= optimal {
            let overtime_minutes = (elapsed - optimal).as_secs_f64() / 60.0;
            if overtime_minutes >= cfg.overtime_divisor_minutes {
                let penalty = (overtime_minutes / cfg.overtime_divisor_minutes).floor();
                deltas.push((Stat::Happiness, -penalty));
                self.started = Some(now.checked_sub(optimal).unwrap_or(start));
            }
        }
        deltas
    }
}
