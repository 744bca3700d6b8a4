//! One play-through, as a synchronous state machine.
//!
//! `PetSession` owns every piece of mutable state: stats, flags, the
//! countdown, decay and sleep cycles, the minigame gate and the RNG. It has
//! no threads and never reads the clock itself; callers pass `now`. The
//! async engine drives it from its timer tasks, tests drive it directly.
//!
//! Every stat mutation goes through [`PetSession::change_stat`], which
//! clamps, re-derives the emotional label and runs the death rules before
//! returning. State changes are recorded as [`Event`]s and collected with
//! [`PetSession::drain_events`].
//!
//! ## Lifecycle
//!
//! ```text
//! active -> died(cause)
//! active -> victory
//! ```
//!
//! Both ends are terminal. Once the session is over every command is a
//! no-op.

use std::time::Duration;

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use super::death::{death_message, evaluate_death, DeathCause};
use super::emotion::{resolve_emotion, EmotionalState, Sprite};
use super::stats::{Stat, StatSet, StatTarget, STAT_MAX};
use crate::config::Config;
use crate::error::{ConfigError, Result, ValidationError};
use crate::events::Event;
use crate::minigame::{
    GateState, MinigameGate, MinigameOutcome, OfferResponse, RouletteAction, RouletteStep, Sector,
    Wheel,
};
use crate::timer::{format_countdown, DecayCycle, SessionClock, SleepCycle};

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SessionOutcome {
    Died { cause: DeathCause, message: String },
    Victory,
}

/// Read-only view for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub pet_name: String,
    pub stats: StatSet,
    pub emotion: EmotionalState,
    pub alive: bool,
    pub sleeping: bool,
    pub paused: bool,
    pub remaining_secs: u64,
    pub countdown: String,
    pub pause_remaining_secs: u64,
    pub minigame: GateState,
    pub outcome: Option<SessionOutcome>,
}

#[derive(Debug, Clone, Default)]
struct PauseLedger {
    used: Duration,
    since: Option<Instant>,
}

impl PauseLedger {
    fn used_at(&self, now: Instant) -> Duration {
        let open = self
            .since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default();
        self.used + open
    }
}

#[derive(Debug)]
pub struct PetSession {
    id: Uuid,
    config: Config,
    stats: StatSet,
    alive: bool,
    paused: bool,
    pause: PauseLedger,
    sleep: SleepCycle,
    decay: DecayCycle,
    clock: SessionClock,
    gate: MinigameGate,
    rng: Pcg64,
    outcome: Option<SessionOutcome>,
    last_emotion: EmotionalState,
    last_countdown_minute: Option<u64>,
    events: Vec<Event>,
}

impl PetSession {
    /// Start a session at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation.
    pub fn new(config: Config, now: Instant) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        let stats = StatSet::uniform(config.pet.initial_stat);
        let gate = MinigameGate::new(now, &mut rng, &config.minigame);
        let clock = SessionClock::new(now, Duration::from_secs(config.session.duration_secs));
        let id = Uuid::new_v4();

        tracing::info!(
            session = %id,
            pet = %config.pet.name,
            duration_secs = config.session.duration_secs,
            "session started"
        );

        let events = vec![Event::SessionStarted {
            session_id: id,
            pet_name: config.pet.name.clone(),
            duration_secs: config.session.duration_secs,
            at: Utc::now(),
        }];

        Ok(Self {
            id,
            last_emotion: resolve_emotion(&stats, false),
            config,
            stats,
            alive: true,
            paused: false,
            pause: PauseLedger::default(),
            sleep: SleepCycle::new(),
            decay: DecayCycle::new(),
            clock,
            gate,
            rng,
            outcome: None,
            last_countdown_minute: None,
            events,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> StatSet {
        self.stats
    }

    pub fn emotional_state(&self) -> EmotionalState {
        resolve_emotion(&self.stats, self.is_sleeping())
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleep.is_sleeping()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Died or won.
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.clock.remaining(now)
    }

    /// `HHH:MM:SS`.
    pub fn countdown(&self, now: Instant) -> String {
        format_countdown(self.remaining(now))
    }

    pub fn pause_remaining(&self, now: Instant) -> Duration {
        Duration::from_secs(self.config.pause.budget_secs).saturating_sub(self.pause.used_at(now))
    }

    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            pet_name: self.config.pet.name.clone(),
            stats: self.stats,
            emotion: self.emotional_state(),
            alive: self.alive,
            sleeping: self.is_sleeping(),
            paused: self.paused,
            remaining_secs: self.remaining(now).as_secs(),
            countdown: self.countdown(now),
            pause_remaining_secs: self.pause_remaining(now).as_secs(),
            minigame: self.gate.state(),
            outcome: self.outcome.clone(),
        }
    }

    /// Take every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Stats ────────────────────────────────────────────────────────

    /// The single entry point for stat mutation.
    ///
    /// Applies `delta` to the target (all four stats for
    /// [`StatTarget::All`]), clamps, then evaluates the death rules once on
    /// the resulting snapshot. Does nothing once the session is over.
    pub fn change_stat(&mut self, target: impl Into<StatTarget>, delta: f64) -> StatSet {
        if self.is_over() {
            return self.stats;
        }

        for stat in target.into().stats() {
            let value = self.stats.apply(stat, delta);
            tracing::debug!(%stat, delta, value, "stat changed");
            self.push(Event::StatChanged {
                stat,
                delta,
                value,
                at: Utc::now(),
            });
        }

        self.refresh_emotion();
        if let Some(cause) = evaluate_death(&self.stats, self.is_sleeping(), &self.config.death) {
            self.die(cause);
        }
        self.stats
    }

    // ── User controls ────────────────────────────────────────────────

    /// Raise hunger. No-op while sleeping or once the session is over.
    pub fn feed(&mut self) -> bool {
        if self.is_over() || self.is_sleeping() {
            return false;
        }
        self.change_stat(Stat::Hunger, self.config.actions.feed_increase);
        true
    }

    /// Raise hygiene. No-op while sleeping or once the session is over.
    pub fn shower(&mut self) -> bool {
        if self.is_over() || self.is_sleeping() {
            return false;
        }
        self.change_stat(Stat::Hygiene, self.config.actions.shower_increase);
        true
    }

    /// Fall asleep or wake up. Returns the new sleeping flag.
    pub fn toggle_sleep(&mut self, now: Instant) -> bool {
        if self.is_over() {
            return self.is_sleeping();
        }

        match self.sleep.end(now) {
            Some(slept) => {
                tracing::info!(slept_secs = slept.as_secs(), "pet woke up");
                self.push(Event::SleepEnded {
                    slept_secs: slept.as_secs(),
                    at: Utc::now(),
                });
            }
            None => {
                self.sleep.begin(now);
                self.decay.reset();
                tracing::info!("pet fell asleep");
                self.push(Event::SleepStarted { at: Utc::now() });
            }
        }
        self.refresh_emotion();
        self.is_sleeping()
    }

    /// Pause or resume decay and minigames. Returns the new paused flag.
    ///
    /// # Errors
    ///
    /// `PauseUnavailable` when the budget is zero or spent, `SessionOver`
    /// once the session ended.
    pub fn toggle_pause(&mut self, now: Instant) -> Result<bool, ValidationError> {
        if self.is_over() {
            return Err(ValidationError::SessionOver);
        }
        if self.paused {
            self.resume(now);
            return Ok(false);
        }

        let remaining = self.pause_remaining(now);
        if remaining.is_zero() {
            return Err(ValidationError::PauseUnavailable { remaining_secs: 0 });
        }
        self.paused = true;
        self.pause.since = Some(now);
        tracing::info!(budget_remaining_secs = remaining.as_secs(), "paused");
        self.push(Event::PauseToggled {
            paused: true,
            budget_remaining_secs: remaining.as_secs(),
            at: Utc::now(),
        });
        Ok(true)
    }

    fn resume(&mut self, now: Instant) {
        let budget = Duration::from_secs(self.config.pause.budget_secs);
        self.pause.used = self.pause.used_at(now).min(budget);
        self.pause.since = None;
        self.paused = false;
        let remaining = self.pause_remaining(now).as_secs();
        tracing::info!(budget_remaining_secs = remaining, "resumed");
        self.push(Event::PauseToggled {
            paused: false,
            budget_remaining_secs: remaining,
            at: Utc::now(),
        });
    }

    // ── Timed processes ──────────────────────────────────────────────

    /// One countdown tick: auto-resume a spent pause, report the countdown
    /// once per minute, and declare victory when time is up.
    pub fn tick_clock(&mut self, now: Instant) {
        if self.is_over() {
            return;
        }

        if self.paused && self.pause_remaining(now).is_zero() {
            tracing::info!("pause budget spent");
            self.resume(now);
        }

        let remaining = self.clock.remaining(now);
        let minute = remaining.as_secs() / 60;
        if self.last_countdown_minute != Some(minute) {
            self.last_countdown_minute = Some(minute);
            self.push(Event::Countdown {
                remaining_secs: remaining.as_secs(),
                display: format_countdown(remaining),
                at: Utc::now(),
            });
        }

        if self.clock.poll_victory(now) {
            self.win();
        }
    }

    /// One decay boundary. Skipped, not deferred, while paused.
    pub fn tick_decay(&mut self) {
        if self.is_over() || self.paused {
            tracing::debug!("decay tick skipped");
            return;
        }
        let sleeping = self.is_sleeping();
        for (stat, delta) in self.decay.step(sleeping, &self.config.decay) {
            self.change_stat(stat, delta);
        }
    }

    /// One minute of the sleep cycle.
    pub fn tick_sleep(&mut self, now: Instant) {
        if self.is_over() {
            return;
        }
        let current = self.stats.sleep;
        for (stat, delta) in self.sleep.minute(now, current, &self.config.sleep) {
            self.change_stat(stat, delta);
        }
    }

    // ── Minigames ────────────────────────────────────────────────────

    /// Whether the scheduler should open a popup now.
    pub fn minigame_due(&self, now: Instant) -> bool {
        !self.is_over() && !self.paused && !self.is_sleeping() && self.gate.is_due(now)
    }

    /// Open the popup. Returns the offer id to answer with.
    ///
    /// # Errors
    ///
    /// `Busy` while another popup or game is active, `SessionOver` once
    /// the session ended.
    pub fn offer_minigame(&mut self, now: Instant) -> Result<u64> {
        if self.is_over() {
            return Err(ValidationError::SessionOver.into());
        }
        let offer_id = self.gate.offer(now, &mut self.rng, &self.config.minigame)?;
        tracing::info!(offer = offer_id, "minigame offered");
        self.push(Event::MinigameOffered {
            timeout_secs: self.config.minigame.popup_timeout_secs,
            at: Utc::now(),
        });
        Ok(offer_id)
    }

    /// Close popup `offer_id` and score the answer. Returns `false` if the
    /// offer was already closed.
    pub fn respond_to_offer(&mut self, offer_id: u64, response: OfferResponse) -> bool {
        if self.is_over() || !self.gate.resolve(offer_id, response) {
            return false;
        }
        tracing::info!(offer = offer_id, ?response, "minigame offer resolved");
        self.push(Event::MinigameOfferResolved {
            response,
            at: Utc::now(),
        });

        let mg = &self.config.minigame;
        let delta = match response {
            OfferResponse::Accepted => mg.accept_reward,
            OfferResponse::Declined => -mg.decline_penalty,
            OfferResponse::TimedOut | OfferResponse::Dismissed => -mg.timeout_penalty,
        };
        self.change_stat(Stat::Happiness, delta);
        true
    }

    /// Reserve the gate for a game launched without a popup.
    pub fn claim_minigame(&mut self) -> Result<()> {
        if self.is_over() {
            return Err(ValidationError::SessionOver.into());
        }
        self.gate.claim()?;
        Ok(())
    }

    pub fn minigame_started(&mut self, game: &str) {
        tracing::info!(game, "minigame started");
        self.push(Event::MinigameStarted {
            game: game.to_string(),
            at: Utc::now(),
        });
    }

    /// The game failed to launch or never reported. Frees the gate.
    pub fn abort_minigame(&mut self, game: &str, reason: impl ToString) {
        self.gate.finish();
        let reason = reason.to_string();
        tracing::warn!(game, %reason, "minigame aborted");
        self.push(Event::MinigameFailed {
            game: game.to_string(),
            reason,
            at: Utc::now(),
        });
    }

    /// Apply the sleep cost and outcome bonus. Returns the wheel to spin,
    /// or `None` if the pet did not survive them.
    pub fn complete_minigame(&mut self, game: &str, outcome: MinigameOutcome) -> Option<Wheel> {
        self.gate.finish();
        if self.is_over() {
            return None;
        }
        tracing::info!(game, %outcome, "minigame resolved");
        self.push(Event::MinigameResolved {
            game: game.to_string(),
            outcome,
            at: Utc::now(),
        });

        let sleep_cost = self.config.minigame.sleep_cost;
        let bonus = match outcome {
            MinigameOutcome::Won => self.config.minigame.win_happiness,
            MinigameOutcome::Lost => -self.config.minigame.loss_happiness,
        };
        self.change_stat(Stat::Sleep, -sleep_cost);
        self.change_stat(Stat::Happiness, bonus);

        (!self.is_over()).then(|| Wheel::for_outcome(outcome))
    }

    /// Draw a sector. The delta is applied later, by the commit steps of
    /// its plan.
    pub fn spin(&mut self, wheel: Wheel) -> Sector {
        let sector = wheel.spin(&mut self.rng);
        tracing::info!(?wheel, %sector, "roulette spun");
        self.push(Event::RouletteSpun {
            wheel,
            sector,
            at: Utc::now(),
        });
        sector
    }

    pub fn roulette_step(&mut self, step: &RouletteStep) {
        if self.is_over() {
            return;
        }
        match step.action {
            RouletteAction::Flash { stat, lit, cycle } => self.push(Event::StatFlash {
                stat,
                lit,
                cycle,
                at: Utc::now(),
            }),
            RouletteAction::Commit { stat, delta } => {
                self.change_stat(stat, delta);
            }
        }
    }

    /// Uniform index into a list of `len` items.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }

    // ── Administration ───────────────────────────────────────────────

    pub fn force_victory(&mut self, now: Instant) -> bool {
        if self.is_over() {
            return false;
        }
        self.clock.expire(now);
        self.clock.poll_victory(now);
        self.win()
    }

    /// Shorten the session by `by`, clamped at zero. Returns the new
    /// remaining time.
    pub fn cut_time(&mut self, now: Instant, by: Duration) -> Duration {
        if self.is_over() {
            return self.remaining(now);
        }
        let cut = self.clock.cut(by);
        let remaining = self.clock.remaining(now);
        tracing::info!(cut_secs = cut.as_secs(), remaining_secs = remaining.as_secs(), "time cut");
        self.push(Event::TimeCut {
            cut_secs: cut.as_secs(),
            remaining_secs: remaining.as_secs(),
            at: Utc::now(),
        });
        if self.clock.poll_victory(now) {
            self.win();
        }
        remaining
    }

    pub fn preview_sprite(&mut self, sprite: Sprite) {
        self.push(Event::SpritePreview {
            sprite: sprite.to_string(),
            at: Utc::now(),
        });
    }

    /// Set every stat to the maximum. Bypasses the death rules, so a full
    /// hunger bar does not count as overeating here.
    pub fn restore_stats(&mut self) {
        if self.is_over() {
            return;
        }
        for stat in Stat::ALL {
            let delta = STAT_MAX - self.stats.get(stat);
            self.stats.set(stat, STAT_MAX);
            self.push(Event::StatChanged {
                stat,
                delta,
                value: STAT_MAX,
                at: Utc::now(),
            });
        }
        tracing::info!("stats restored");
        self.push(Event::StatsRestored { at: Utc::now() });
        self.refresh_emotion();
    }

    /// Wake the pet if it is asleep.
    pub fn wake(&mut self, now: Instant) -> bool {
        if self.is_over() || !self.is_sleeping() {
            return false;
        }
        self.toggle_sleep(now);
        true
    }

    // ── Internals ────────────────────────────────────────────────────

    fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    fn refresh_emotion(&mut self) {
        let state = self.emotional_state();
        if state != self.last_emotion {
            self.last_emotion = state;
            self.push(Event::EmotionChanged {
                state,
                at: Utc::now(),
            });
        }
    }

    fn die(&mut self, cause: DeathCause) {
        if self.is_over() {
            return;
        }
        let message = death_message(&mut self.rng, &self.config.pet.name);
        self.alive = false;
        self.paused = false;
        self.pause.since = None;
        self.sleep = SleepCycle::new();
        tracing::info!(%cause, "pet died");
        self.outcome = Some(SessionOutcome::Died {
            cause,
            message: message.clone(),
        });
        self.push(Event::Died {
            cause,
            message,
            at: Utc::now(),
        });
    }

    fn win(&mut self) -> bool {
        if self.is_over() {
            return false;
        }
        self.paused = false;
        self.pause.since = None;
        tracing::info!("session won");
        self.outcome = Some(SessionOutcome::Victory);
        self.push(Event::Victory { at: Utc::now() });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.seed = Some(7);
        cfg
    }

    fn session() -> (PetSession, Instant) {
        let t0 = Instant::now();
        (PetSession::new(config(), t0).unwrap(), t0)
    }

    fn count<F: Fn(&Event) -> bool>(events: &[Event], f: F) -> usize {
        events.iter().filter(|e| f(e)).count()
    }

    #[test]
    fn starts_with_uniform_stats() {
        let (mut s, t0) = session();
        assert_eq!(s.stats(), StatSet::uniform(50.0));
        assert!(s.is_alive());
        assert_eq!(s.countdown(t0), "012:00:00");
        let events = s.drain_events();
        assert!(matches!(events[0], Event::SessionStarted { .. }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = config();
        cfg.session.duration_secs = 0;
        assert!(PetSession::new(cfg, Instant::now()).is_err());
    }

    #[test]
    fn unbounded_interval_fails_cleanly() {
        let mut cfg = config();
        cfg.minigame.interval_max_secs = u64::MAX;
        assert!(matches!(
            PetSession::new(cfg, Instant::now()),
            Err(ConfigError::InvalidValue { key, .. }) if key == "minigame.interval_max_secs"
        ));
    }

    #[test]
    fn starvation_ends_session() {
        let (mut s, _) = session();
        s.change_stat(Stat::Hunger, -60.0);
        assert!(!s.is_alive());
        assert!(matches!(
            s.outcome(),
            Some(SessionOutcome::Died {
                cause: DeathCause::Starvation,
                ..
            })
        ));
        let before = s.stats();
        assert!(!s.feed());
        assert_eq!(s.stats(), before);
        let events = s.drain_events();
        assert_eq!(count(&events, |e| matches!(e, Event::Died { .. })), 1);
    }

    #[test]
    fn death_fires_once() {
        let (mut s, _) = session();
        s.change_stat(StatTarget::All, -100.0);
        s.change_stat(StatTarget::All, -100.0);
        let events = s.drain_events();
        assert_eq!(count(&events, |e| matches!(e, Event::Died { .. })), 1);
    }

    #[test]
    fn sleeping_pet_survives_hunger_and_hygiene_at_zero() {
        let (mut s, t0) = session();
        s.toggle_sleep(t0);
        s.change_stat(Stat::Hunger, -50.0);
        s.change_stat(Stat::Hygiene, -50.0);
        assert!(s.is_alive());
        assert_eq!(s.emotional_state(), EmotionalState::Sleeping);
    }

    #[test]
    fn feed_and_shower_are_blocked_while_sleeping() {
        let (mut s, t0) = session();
        assert!(s.feed());
        assert_eq!(s.stats().hunger, 60.0);
        assert!(s.shower());
        assert_eq!(s.stats().hygiene, 90.0);
        s.toggle_sleep(t0);
        assert!(!s.feed());
        assert!(!s.shower());
        assert_eq!(s.stats().hunger, 60.0);
    }

    #[test]
    fn overfeeding_kills() {
        let (mut s, _) = session();
        for _ in 0..4 {
            s.feed();
        }
        assert!(s.is_alive());
        s.feed();
        assert!(matches!(
            s.outcome(),
            Some(SessionOutcome::Died {
                cause: DeathCause::Obesity,
                ..
            })
        ));
    }

    #[test]
    fn awake_decay_follows_the_two_hour_cycle() {
        let (mut s, _) = session();
        s.change_stat(Stat::Sleep, 50.0);
        s.change_stat(Stat::Hunger, 30.0);
        s.tick_decay();
        assert_eq!(s.stats().hunger, 30.0);
        assert_eq!(s.stats().sleep, 10.0);
        assert_eq!(s.stats().hygiene, 50.0);
        s.tick_decay();
        assert!(!s.is_alive());
        assert!(matches!(
            s.outcome(),
            Some(SessionOutcome::Died {
                cause: DeathCause::Illness,
                ..
            })
        ));
    }

    #[test]
    fn decay_is_skipped_while_paused() {
        let mut cfg = config();
        cfg.pause.budget_secs = 3600;
        let t0 = Instant::now();
        let mut s = PetSession::new(cfg, t0).unwrap();
        assert!(s.toggle_pause(t0).unwrap());
        s.tick_decay();
        assert_eq!(s.stats(), StatSet::uniform(50.0));
    }

    #[test]
    fn pause_unavailable_without_budget() {
        let (mut s, t0) = session();
        assert!(matches!(
            s.toggle_pause(t0),
            Err(ValidationError::PauseUnavailable { .. })
        ));
    }

    #[test]
    fn pause_budget_is_spent_and_auto_resumes() {
        let mut cfg = config();
        cfg.pause.budget_secs = 600;
        let t0 = Instant::now();
        let mut s = PetSession::new(cfg, t0).unwrap();

        s.toggle_pause(t0).unwrap();
        assert!(!s.toggle_pause(t0 + Duration::from_secs(200)).unwrap());
        assert_eq!(
            s.pause_remaining(t0 + Duration::from_secs(200)),
            Duration::from_secs(400)
        );

        let t1 = t0 + Duration::from_secs(300);
        s.toggle_pause(t1).unwrap();
        s.tick_clock(t1 + Duration::from_secs(399));
        assert!(s.is_paused());
        s.tick_clock(t1 + Duration::from_secs(400));
        assert!(!s.is_paused());
        assert!(matches!(
            s.toggle_pause(t1 + Duration::from_secs(401)),
            Err(ValidationError::PauseUnavailable { remaining_secs: 0 })
        ));
    }

    #[test]
    fn pause_does_not_stop_the_countdown() {
        let mut cfg = config();
        cfg.pause.budget_secs = 7200;
        let t0 = Instant::now();
        let mut s = PetSession::new(cfg, t0).unwrap();
        s.toggle_pause(t0).unwrap();
        assert_eq!(s.remaining(t0 + HOUR), 11 * HOUR);
    }

    #[test]
    fn victory_fires_once() {
        let (mut s, t0) = session();
        s.tick_clock(t0 + 12 * HOUR);
        s.tick_clock(t0 + 12 * HOUR + Duration::from_secs(1));
        assert_eq!(s.outcome(), Some(&SessionOutcome::Victory));
        assert!(s.is_alive());
        let events = s.drain_events();
        assert_eq!(count(&events, |e| matches!(e, Event::Victory { .. })), 1);
        assert!(!s.force_victory(t0 + 13 * HOUR));
    }

    #[test]
    fn countdown_is_reported_once_per_minute() {
        let (mut s, t0) = session();
        s.drain_events();
        for sec in 0..120 {
            s.tick_clock(t0 + Duration::from_secs(sec));
        }
        let events = s.drain_events();
        assert_eq!(count(&events, |e| matches!(e, Event::Countdown { .. })), 3);
    }

    #[test]
    fn cut_time_can_win_immediately() {
        let (mut s, t0) = session();
        let now = t0 + 11 * HOUR + Duration::from_secs(30 * 60);
        let remaining = s.cut_time(now, HOUR);
        assert_eq!(remaining, Duration::ZERO);
        assert_eq!(s.outcome(), Some(&SessionOutcome::Victory));
    }

    #[test]
    fn sleep_gains_until_full_then_costs_happiness() {
        let (mut s, t0) = session();
        s.toggle_sleep(t0);
        for minute in 1..=12 {
            s.tick_sleep(t0 + minute * Duration::from_secs(60));
        }
        assert_eq!(s.stats().sleep, 100.0);
        assert_eq!(s.stats().happiness, 50.0);
        s.tick_sleep(t0 + 13 * Duration::from_secs(60));
        assert_eq!(s.stats().happiness, 49.5);
    }

    #[test]
    fn toggle_sleep_resets_awake_decay() {
        let mut cfg = config();
        cfg.decay.hunger_per_hour = 10.0;
        cfg.decay.sleep_per_hour = 10.0;
        cfg.decay.hygiene_per_two_hours = 10.0;
        let t0 = Instant::now();
        let mut s = PetSession::new(cfg, t0).unwrap();

        s.tick_decay();
        s.toggle_sleep(t0);
        s.toggle_sleep(t0 + Duration::from_secs(60));
        s.tick_decay();
        // First boundary again: hunger and sleep, not hygiene.
        assert_eq!(s.stats().hunger, 30.0);
        assert_eq!(s.stats().sleep, 30.0);
        assert_eq!(s.stats().hygiene, 50.0);
    }

    #[test]
    fn popup_responses_are_scored() {
        let (mut s, t0) = session();
        let id = s.offer_minigame(t0).unwrap();
        assert!(s.respond_to_offer(id, OfferResponse::Declined));
        assert_eq!(s.stats().happiness, 40.0);
        assert!(!s.respond_to_offer(id, OfferResponse::Declined));

        let id = s.offer_minigame(t0).unwrap();
        s.respond_to_offer(id, OfferResponse::Dismissed);
        assert_eq!(s.stats().happiness, 15.0);

        let id = s.offer_minigame(t0).unwrap();
        s.respond_to_offer(id, OfferResponse::Accepted);
        assert_eq!(s.stats().happiness, 25.0);
        assert_eq!(s.gate_state(), GateState::Running);
    }

    #[test]
    fn second_offer_while_pending_is_busy() {
        let (mut s, t0) = session();
        s.offer_minigame(t0).unwrap();
        assert!(s.offer_minigame(t0).is_err());
        let events = s.drain_events();
        assert_eq!(count(&events, |e| matches!(e, Event::MinigameOffered { .. })), 1);
    }

    #[test]
    fn minigame_not_due_while_sleeping_or_paused() {
        let mut cfg = config();
        cfg.pause.budget_secs = 60;
        let t0 = Instant::now();
        let mut s = PetSession::new(cfg, t0).unwrap();
        let later = t0 + 2 * HOUR;
        assert!(s.minigame_due(later));
        s.toggle_sleep(t0);
        assert!(!s.minigame_due(later));
        s.toggle_sleep(t0);
        s.toggle_pause(t0).unwrap();
        assert!(!s.minigame_due(later));
    }

    #[test]
    fn completed_win_costs_sleep_and_grants_bonus() {
        let (mut s, _) = session();
        s.claim_minigame().unwrap();
        let wheel = s.complete_minigame("dice", MinigameOutcome::Won);
        assert_eq!(wheel, Some(Wheel::Reward));
        assert_eq!(s.stats().sleep, 35.0);
        assert_eq!(s.stats().happiness, 65.0);
        assert_eq!(s.gate_state(), GateState::Idle);
    }

    #[test]
    fn lethal_sleep_cost_skips_the_wheel() {
        let (mut s, _) = session();
        s.change_stat(Stat::Sleep, -40.0);
        s.claim_minigame().unwrap();
        assert_eq!(s.complete_minigame("dice", MinigameOutcome::Lost), None);
        assert!(!s.is_alive());
    }

    #[test]
    fn aborted_minigame_frees_the_gate() {
        let (mut s, _) = session();
        s.claim_minigame().unwrap();
        s.abort_minigame("dice", "crashed");
        assert_eq!(s.gate_state(), GateState::Idle);
        assert!(s.claim_minigame().is_ok());
    }

    #[test]
    fn roulette_commit_goes_through_death_check() {
        let (mut s, _) = session();
        s.change_stat(Stat::Hygiene, -45.0);
        s.roulette_step(&RouletteStep {
            at: Duration::ZERO,
            action: RouletteAction::Commit {
                stat: Stat::Hygiene,
                delta: -20.0,
            },
        });
        assert!(matches!(
            s.outcome(),
            Some(SessionOutcome::Died {
                cause: DeathCause::Illness,
                ..
            })
        ));
    }

    #[test]
    fn restore_bypasses_obesity_rule() {
        let (mut s, _) = session();
        s.restore_stats();
        assert!(s.is_alive());
        assert_eq!(s.stats(), StatSet::uniform(100.0));
        // The next real change is checked again.
        s.change_stat(Stat::Sleep, -1.0);
        assert!(!s.is_alive());
    }

    #[test]
    fn wake_only_when_sleeping() {
        let (mut s, t0) = session();
        assert!(!s.wake(t0));
        s.toggle_sleep(t0);
        assert!(s.wake(t0 + HOUR));
        assert!(!s.is_sleeping());
        let events = s.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::SleepEnded { slept_secs: 3600, .. })));
    }

    #[test]
    fn emotion_changes_are_reported() {
        let (mut s, t0) = session();
        s.drain_events();
        s.toggle_sleep(t0);
        let events = s.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::EmotionChanged {
                state: EmotionalState::Sleeping,
                ..
            }
        )));
    }

    #[test]
    fn pick_index_in_range() {
        let (mut s, _) = session();
        assert_eq!(s.pick_index(0), None);
        for _ in 0..20 {
            assert!(s.pick_index(3).unwrap() < 3);
        }
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut s, t0) = session();
        s.toggle_sleep(t0);
        let snap = s.snapshot(t0 + HOUR);
        assert!(snap.sleeping);
        assert_eq!(snap.emotion, EmotionalState::Sleeping);
        assert_eq!(snap.remaining_secs, 11 * 3600);
        assert_eq!(snap.countdown, "011:00:00");
        assert_eq!(snap.minigame, GateState::Idle);
        assert!(snap.outcome.is_none());
    }
}
