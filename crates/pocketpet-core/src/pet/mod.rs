//! The pet itself: bounded stats, the derived emotional label, death rules,
//! and the synchronous session that ties them together.

pub mod death;
pub mod emotion;
pub mod session;
pub mod stats;

pub use death::{death_message, evaluate_death, DeathCause};
pub use emotion::{resolve_emotion, EmotionalState, Sprite};
pub use session::{PetSession, SessionOutcome, SessionSnapshot};
pub use stats::{Stat, StatSet, StatTarget, STAT_MAX, STAT_MIN};
