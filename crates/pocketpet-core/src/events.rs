use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::minigame::roulette::{Sector, Wheel};
use crate::minigame::{MinigameOutcome, OfferResponse};
use crate::pet::{DeathCause, EmotionalState, Stat};

/// Every state change in a session produces an Event.
/// The presentation layer subscribes to them through the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        pet_name: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// One stat moved. `value` is the clamped result.
    StatChanged {
        stat: Stat,
        delta: f64,
        value: f64,
        at: DateTime<Utc>,
    },
    /// The derived label differs from the last one reported.
    EmotionChanged {
        state: EmotionalState,
        at: DateTime<Utc>,
    },
    SleepStarted {
        at: DateTime<Utc>,
    },
    SleepEnded {
        slept_secs: u64,
        at: DateTime<Utc>,
    },
    PauseToggled {
        paused: bool,
        budget_remaining_secs: u64,
        at: DateTime<Utc>,
    },
    MinigameOffered {
        timeout_secs: u64,
        at: DateTime<Utc>,
    },
    /// The popup closed: accepted, declined, timed out or dismissed.
    MinigameOfferResolved {
        response: OfferResponse,
        at: DateTime<Utc>,
    },
    MinigameStarted {
        game: String,
        at: DateTime<Utc>,
    },
    MinigameResolved {
        game: String,
        outcome: MinigameOutcome,
        at: DateTime<Utc>,
    },
    /// Launch error or the game ended without a result.
    MinigameFailed {
        game: String,
        reason: String,
        at: DateTime<Utc>,
    },
    RouletteSpun {
        wheel: Wheel,
        sector: Sector,
        at: DateTime<Utc>,
    },
    /// Feedback blink on a stat bar before a roulette delta lands.
    StatFlash {
        stat: Stat,
        lit: bool,
        cycle: u32,
        at: DateTime<Utc>,
    },
    Countdown {
        remaining_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
    TimeCut {
        cut_secs: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SpritePreview {
        sprite: String,
        at: DateTime<Utc>,
    },
    StatsRestored {
        at: DateTime<Utc>,
    },
    Died {
        cause: DeathCause,
        message: String,
        at: DateTime<Utc>,
    },
    Victory {
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Death and victory end the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Died { .. } | Event::Victory { .. })
    }
}
