//! # Pocketpet Core Library
//!
//! This library provides the life-cycle engine of a virtual pet: four
//! bounded stats that decay on fixed schedules, an emotional label derived
//! from them, death rules, a session countdown, and periodic minigame
//! popups whose outcome spins a reward or punishment roulette.
//!
//! ## Architecture
//!
//! - **Pet session**: a synchronous state machine that takes `now` on every
//!   call and funnels every stat change through the death rules
//! - **Engine**: tokio tasks driving the session behind one mutex, with a
//!   typed event stream for the presentation layer
//! - **Minigames**: external components behind the [`Minigame`] trait,
//!   reporting once through a one-shot [`OutcomeReporter`]
//! - **Config**: TOML-based constants with built-in profiles
//!
//! ## Key Components
//!
//! - [`PetSession`]: Pure session state machine
//! - [`PetEngine`]: Async runtime and control surface
//! - [`Config`]: Engine configuration and profiles
//! - [`Event`]: Everything that happens during a session

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod minigame;
pub mod pet;
pub mod timer;

pub use config::{builtin_profiles, find_profile, profile_ids, Config, Profile, DEFAULT_PROFILE};
pub use engine::{AdminConsole, PetEngine};
pub use error::{ConfigError, CoreError, MinigameError, ValidationError};
pub use events::Event;
pub use minigame::{
    GateState, Minigame, MinigameCatalog, MinigameGate, MinigameOutcome, OfferResponse,
    OutcomeReporter, Sector, Wheel,
};
pub use pet::{
    resolve_emotion, DeathCause, EmotionalState, PetSession, SessionOutcome, SessionSnapshot,
    Sprite, Stat, StatSet, StatTarget,
};
pub use timer::{format_countdown, SessionClock};
