//! Hourly stat decay.
//!
//! ```text
//! awake:    [hunger, sleep] -> [hygiene] -> [hunger, sleep] -> ...
//! sleeping: [hunger, hygiene] every boundary, at the reduced rate
//! ```
//!
//! Falling asleep sends the awake cycle back to its first boundary.

use serde::{Deserialize, Serialize};

use crate::config::DecayConfig;
use crate::pet::Stat;

/// Which boundary of the two-hour awake cycle comes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayPhase {
    HungerAndSleep,
    Hygiene,
}

#[derive(Debug, Clone)]
pub struct DecayCycle {
    next: DecayPhase,
}

impl Default for DecayCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl DecayCycle {
    pub fn new() -> Self {
        Self {
            next: DecayPhase::HungerAndSleep,
        }
    }

    pub fn next_phase(&self) -> DecayPhase {
        self.next
    }

    pub fn reset(&mut self) {
        self.next = DecayPhase::HungerAndSleep;
    }

    /// Deltas for one boundary. Advances the awake cycle only when awake.
    pub fn step(&mut self, sleeping: bool, rates: &DecayConfig) -> Vec<(Stat, f64)> {
        if sleeping {
            let keep = 1.0 - rates.sleep_reduction;
            return vec![
                (Stat::Hunger, -rates.hunger_per_hour * keep),
                (Stat::Hygiene, -rates.hygiene_per_two_hours * 0.5 * keep),
            ];
        }

        match self.next {
            DecayPhase::HungerAndSleep => {
                self.next = DecayPhase::Hygiene;
                vec![
                    (Stat::Hunger, -rates.hunger_per_hour),
                    (Stat::Sleep, -rates.sleep_per_hour),
                ]
            }
            DecayPhase::Hygiene => {
                self.next = DecayPhase::HungerAndSleep;
                vec![(Stat::Hygiene, -rates.hygiene_per_two_hours)]
            }
        }
    }
}
