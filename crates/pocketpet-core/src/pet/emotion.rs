//! Emotional state derivation.
//!
//! The label is never stored: it is recomputed from the stats and the
//! sleeping flag whenever the presentation layer needs a sprite.
//!
//! ## Rule order
//!
//! ```text
//! sleeping                              -> sleeping
//! hunger    >= 90 | <= 10 | <= 30       -> overfed | starving | hungry
//! hygiene   <= 10 | <= 30               -> filthy | dirty
//! sleep     <= 10 | <= 30               -> exhausted | tired
//! happiness <= 10 | <= 30 | >= 80 | >= 60 -> very sad | sad | very happy | happy
//! stats below 40: >= 3 | >= 2           -> dying | sick
//! otherwise                             -> normal
//! ```
//!
//! Categories overlap, so the table is evaluated top to bottom and the first
//! matching row wins.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::death::DeathCause;
use super::stats::{Stat, StatSet};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionalState {
    #[serde(rename = "sleeping")]
    Sleeping,
    #[serde(rename = "overfed")]
    Overfed,
    #[serde(rename = "starving")]
    Starving,
    #[serde(rename = "hungry")]
    Hungry,
    #[serde(rename = "filthy")]
    Filthy,
    #[serde(rename = "dirty")]
    Dirty,
    #[serde(rename = "exhausted")]
    Exhausted,
    #[serde(rename = "tired")]
    Tired,
    #[serde(rename = "very sad")]
    VerySad,
    #[serde(rename = "sad")]
    Sad,
    #[serde(rename = "very happy")]
    VeryHappy,
    #[serde(rename = "happy")]
    Happy,
    #[serde(rename = "dying")]
    Dying,
    #[serde(rename = "sick")]
    Sick,
    #[serde(rename = "normal")]
    Normal,
}

impl EmotionalState {
    pub const ALL: [EmotionalState; 15] = [
        EmotionalState::Normal,
        EmotionalState::Hungry,
        EmotionalState::Starving,
        EmotionalState::Overfed,
        EmotionalState::Dirty,
        EmotionalState::Filthy,
        EmotionalState::Tired,
        EmotionalState::Exhausted,
        EmotionalState::Happy,
        EmotionalState::VeryHappy,
        EmotionalState::Sad,
        EmotionalState::VerySad,
        EmotionalState::Sleeping,
        EmotionalState::Sick,
        EmotionalState::Dying,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EmotionalState::Sleeping => "sleeping",
            EmotionalState::Overfed => "overfed",
            EmotionalState::Starving => "starving",
            EmotionalState::Hungry => "hungry",
            EmotionalState::Filthy => "filthy",
            EmotionalState::Dirty => "dirty",
            EmotionalState::Exhausted => "exhausted",
            EmotionalState::Tired => "tired",
            EmotionalState::VerySad => "very sad",
            EmotionalState::Sad => "sad",
            EmotionalState::VeryHappy => "very happy",
            EmotionalState::Happy => "happy",
            EmotionalState::Dying => "dying",
            EmotionalState::Sick => "sick",
            EmotionalState::Normal => "normal",
        }
    }
}

impl fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmotionalState {
    type Err = ValidationError;

    /// Accepts the display label; `_` and `-` stand in for the space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        EmotionalState::ALL
            .into_iter()
            .find(|state| state.label() == wanted)
            .ok_or_else(|| ValidationError::UnknownSprite(s.to_string()))
    }
}

/// Anything the sprite layer can draw: a live label or a death screen.
///
/// Written as the label, or `death:<cause>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Sprite {
    Emotion(EmotionalState),
    Death(DeathCause),
}

impl fmt::Display for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sprite::Emotion(state) => state.fmt(f),
            Sprite::Death(cause) => write!(f, "death:{}", cause.key()),
        }
    }
}

impl FromStr for Sprite {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().strip_prefix("death:") {
            Some(cause) => cause
                .parse()
                .map(Sprite::Death)
                .map_err(|_| ValidationError::UnknownSprite(s.to_string())),
            None => s.parse().map(Sprite::Emotion),
        }
    }
}

impl From<Sprite> for String {
    fn from(sprite: Sprite) -> Self {
        sprite.to_string()
    }
}

impl TryFrom<String> for Sprite {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy)]
enum Cmp {
    AtLeast(f64),
    AtMost(f64),
}

impl Cmp {
    fn holds(self, value: f64) -> bool {
        match self {
            Cmp::AtLeast(t) => value >= t,
            Cmp::AtMost(t) => value <= t,
        }
    }
}

const RULES: [(Stat, Cmp, EmotionalState); 11] = [
    (Stat::Hunger, Cmp::AtLeast(90.0), EmotionalState::Overfed),
    (Stat::Hunger, Cmp::AtMost(10.0), EmotionalState::Starving),
    (Stat::Hunger, Cmp::AtMost(30.0), EmotionalState::Hungry),
    (Stat::Hygiene, Cmp::AtMost(10.0), EmotionalState::Filthy),
    (Stat::Hygiene, Cmp::AtMost(30.0), EmotionalState::Dirty),
    (Stat::Sleep, Cmp::AtMost(10.0), EmotionalState::Exhausted),
    (Stat::Sleep, Cmp::AtMost(30.0), EmotionalState::Tired),
    (Stat::Happiness, Cmp::AtMost(10.0), EmotionalState::VerySad),
    (Stat::Happiness, Cmp::AtMost(30.0), EmotionalState::Sad),
    (Stat::Happiness, Cmp::AtLeast(80.0), EmotionalState::VeryHappy),
    (Stat::Happiness, Cmp::AtLeast(60.0), EmotionalState::Happy),
];

const LOW_STAT_THRESHOLD: f64 = 40.0;

/// Map the current stats to the label the sprite layer shows.
pub fn resolve_emotion(stats: &StatSet, sleeping: bool) -> EmotionalState {
    if sleeping {
        return EmotionalState::Sleeping;
    }

    if let Some((_, _, state)) = RULES
        .iter()
        .find(|(stat, cmp, _)| cmp.holds(stats.get(*stat)))
    {
        return *state;
    }

    match stats.count_below(LOW_STAT_THRESHOLD) {
        n if n >= 3 => EmotionalState::Dying,
        2 => EmotionalState::Sick,
        _ => EmotionalState::Normal,
    }
}
