//! Timed processes of a session: the countdown, hourly decay and the
//! per-minute sleep cycle. Each is a plain state machine driven by the
//! caller with `now`; the engine owns the actual timers.

mod clock;
mod decay;
mod sleep_cycle;

use std::time::Duration;

pub use clock::{format_countdown, SessionClock};
pub use decay::{DecayCycle, DecayPhase};
pub use sleep_cycle::SleepCycle;

/// Wake-up period of the decay task.
pub const DECAY_INTERVAL: Duration = Duration::from_secs(3600);
/// Wake-up period of the sleep task.
pub const SLEEP_TICK: Duration = Duration::from_secs(60);
/// Wake-up period of the countdown task.
pub const CLOCK_TICK: Duration = Duration::from_secs(1);
/// How often the minigame scheduler checks whether an offer is due.
pub const MINIGAME_CHECK: Duration = Duration::from_secs(1);
