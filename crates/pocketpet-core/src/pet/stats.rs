//! The four bounded pet stats.
//!
//! Values live in `[STAT_MIN, STAT_MAX]` and every mutation clamps. Fractional
//! values are kept so per-minute and reduced sleeping rates add up exactly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const STAT_MIN: f64 = 0.0;
pub const STAT_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Hunger,
    Sleep,
    Hygiene,
    Happiness,
}

impl Stat {
    /// Display order, also the order an `All` change is staggered in.
    pub const ALL: [Stat; 4] = [Stat::Hunger, Stat::Sleep, Stat::Hygiene, Stat::Happiness];

    pub fn as_str(self) -> &'static str {
        match self {
            Stat::Hunger => "hunger",
            Stat::Sleep => "sleep",
            Stat::Hygiene => "hygiene",
            Stat::Happiness => "happiness",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hunger" => Ok(Stat::Hunger),
            "sleep" => Ok(Stat::Sleep),
            "hygiene" => Ok(Stat::Hygiene),
            "happiness" => Ok(Stat::Happiness),
            _ => Err(ValidationError::UnknownStat(s.to_string())),
        }
    }
}

/// Target of a stat change: one stat, or all four at once.
///
/// Serialized as the bare stat name or `"all"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum StatTarget {
    One(Stat),
    All,
}

impl StatTarget {
    pub fn stats(self) -> Vec<Stat> {
        match self {
            StatTarget::One(stat) => vec![stat],
            StatTarget::All => Stat::ALL.to_vec(),
        }
    }
}

impl From<Stat> for StatTarget {
    fn from(stat: Stat) -> Self {
        StatTarget::One(stat)
    }
}

impl fmt::Display for StatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatTarget::One(stat) => stat.fmt(f),
            StatTarget::All => f.write_str("all"),
        }
    }
}

impl From<StatTarget> for String {
    fn from(target: StatTarget) -> Self {
        target.to_string()
    }
}

impl TryFrom<String> for StatTarget {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for StatTarget {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatTarget::All);
        }
        s.parse().map(StatTarget::One)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSet {
    pub hunger: f64,
    pub sleep: f64,
    pub hygiene: f64,
    pub happiness: f64,
}

impl StatSet {
    /// Every stat at the same value, clamped.
    pub fn uniform(value: f64) -> Self {
        let v = clamp(value);
        Self {
            hunger: v,
            sleep: v,
            hygiene: v,
            happiness: v,
        }
    }

    pub fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Hunger => self.hunger,
            Stat::Sleep => self.sleep,
            Stat::Hygiene => self.hygiene,
            Stat::Happiness => self.happiness,
        }
    }

    /// Overwrite a stat. Clamps but does not go through death evaluation;
    /// the session owns that funnel.
    pub fn set(&mut self, stat: Stat, value: f64) {
        let slot = match stat {
            Stat::Hunger => &mut self.hunger,
            Stat::Sleep => &mut self.sleep,
            Stat::Hygiene => &mut self.hygiene,
            Stat::Happiness => &mut self.happiness,
        };
        *slot = clamp(value);
    }

    /// Apply `delta` and return the clamped result.
    pub fn apply(&mut self, stat: Stat, delta: f64) -> f64 {
        self.set(stat, self.get(stat) + delta);
        self.get(stat)
    }

    /// Number of stats strictly below `threshold`.
    pub fn count_below(&self, threshold: f64) -> usize {
        Stat::ALL
            .iter()
            .filter(|s| self.get(**s) < threshold)
            .count()
    }
}

impl Default for StatSet {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

fn clamp(value: f64) -> f64 {
    if value.is_nan() {
        return STAT_MIN;
    }
    value.clamp(STAT_MIN, STAT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_is_fifty_everywhere() {
        let s = StatSet::default();
        for stat in Stat::ALL {
            assert_eq!(s.get(stat), 50.0);
        }
    }

    #[test]
    fn apply_clamps_both_ends() {
        let mut s = StatSet::default();
        assert_eq!(s.apply(Stat::Hunger, 80.0), 100.0);
        assert_eq!(s.apply(Stat::Hunger, -250.0), 0.0);
    }

    #[test]
    fn nan_delta_collapses_to_minimum() {
        let mut s = StatSet::default();
        assert_eq!(s.apply(Stat::Sleep, f64::NAN), STAT_MIN);
    }

    #[test]
    fn count_below_is_strict() {
        let s = StatSet {
            hunger: 39.9,
            sleep: 40.0,
            hygiene: 10.0,
            happiness: 80.0,
        };
        assert_eq!(s.count_below(40.0), 2);
    }

    #[test]
    fn targets_parse() {
        assert_eq!("all".parse::<StatTarget>().unwrap(), StatTarget::All);
        assert_eq!(
            "Hygiene".parse::<StatTarget>().unwrap(),
            StatTarget::One(Stat::Hygiene)
        );
        assert!("thirst".parse::<StatTarget>().is_err());
    }

    proptest! {
        #[test]
        fn stats_stay_in_range(deltas in proptest::collection::vec((0usize..4, -500.0f64..500.0), 0..64)) {
            let mut s = StatSet::default();
            for (idx, delta) in deltas {
                s.apply(Stat::ALL[idx], delta);
                for stat in Stat::ALL {
                    let v = s.get(stat);
                    prop_assert!((STAT_MIN..=STAT_MAX).contains(&v));
                }
            }
        }
    }
}
