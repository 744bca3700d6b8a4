//! Reward and punishment wheels.
//!
//! A finished minigame spins one wheel: [`Wheel::Reward`] after a win,
//! [`Wheel::Punishment`] after a loss. The drawn sector is not applied at
//! once. [`plan`] lays out a flash animation per affected stat and the
//! delta lands when that stat's last flash ends:
//!
//! ```text
//! t = 0      200    400    600    800    1000   1200 ms
//!     lit    unlit  lit    unlit  lit    unlit  commit
//! ```
//!
//! An `all` sector runs the same sequence for every stat, each one offset
//! by the stagger (hunger, sleep, hygiene, happiness).

use std::fmt;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::MinigameOutcome;
use crate::config::RouletteConfig;
use crate::pet::{Stat, StatTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wheel {
    Reward,
    Punishment,
}

/// One wedge of a wheel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub target: StatTarget,
    pub delta: f64,
}

const fn sector(stat: Stat, delta: f64) -> Sector {
    Sector {
        target: StatTarget::One(stat),
        delta,
    }
}

const REWARD_SECTORS: [Sector; 6] = [
    sector(Stat::Happiness, 15.0),
    sector(Stat::Happiness, 30.0),
    sector(Stat::Hunger, 20.0),
    sector(Stat::Hygiene, 25.0),
    sector(Stat::Sleep, 20.0),
    sector(Stat::Happiness, 50.0),
];

const PUNISHMENT_SECTORS: [Sector; 7] = [
    sector(Stat::Happiness, -15.0),
    sector(Stat::Happiness, -25.0),
    sector(Stat::Hunger, -20.0),
    sector(Stat::Hygiene, -20.0),
    sector(Stat::Sleep, -20.0),
    sector(Stat::Happiness, -30.0),
    Sector {
        target: StatTarget::All,
        delta: -10.0,
    },
];

impl Wheel {
    pub fn for_outcome(outcome: MinigameOutcome) -> Self {
        match outcome {
            MinigameOutcome::Won => Wheel::Reward,
            MinigameOutcome::Lost => Wheel::Punishment,
        }
    }

    pub fn sectors(self) -> &'static [Sector] {
        match self {
            Wheel::Reward => &REWARD_SECTORS,
            Wheel::Punishment => &PUNISHMENT_SECTORS,
        }
    }

    /// Draw one sector uniformly.
    pub fn spin<R: Rng + ?Sized>(self, rng: &mut R) -> Sector {
        let sectors = self.sectors();
        sectors.choose(rng).copied().unwrap_or(sectors[0])
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            StatTarget::All => write!(f, "{:+}% all stats", self.delta),
            StatTarget::One(stat) => write!(f, "{:+}% {stat}", self.delta),
        }
    }
}

/// One scheduled piece of roulette feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouletteAction {
    Flash { stat: Stat, lit: bool, cycle: u32 },
    Commit { stat: Stat, delta: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouletteStep {
    /// Offset from the moment the wheel stopped.
    pub at: Duration,
    pub action: RouletteAction,
}

/// Flash and commit schedule for a sector, ordered by time.
pub fn plan(sector: Sector, cfg: &RouletteConfig) -> Vec<RouletteStep> {
    let half = Duration::from_millis(cfg.flash_half_period_ms);
    let stagger = Duration::from_millis(cfg.stagger_ms);

    let mut steps = Vec::new();
    for (i, stat) in sector.target.stats().into_iter().enumerate() {
        let base = stagger * i as u32;
        for cycle in 1..=cfg.flash_cycles {
            let lit_at = base + half * (2 * (cycle - 1));
            steps.push(RouletteStep {
                at: lit_at,
                action: RouletteAction::Flash {
                    stat,
                    lit: true,
                    cycle,
                },
            });
            steps.push(RouletteStep {
                at: lit_at + half,
                action: RouletteAction::Flash {
                    stat,
                    lit: false,
                    cycle,
                },
            });
        }
        steps.push(RouletteStep {
            at: base + half * (2 * cfg.flash_cycles),
            action: RouletteAction::Commit {
                stat,
                delta: sector.delta,
            },
        });
    }
    // Stable: steps sharing an instant keep per-stat order.
    steps.sort_by_key(|step| step.at);
    steps
}
