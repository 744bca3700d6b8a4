//! Async runtime around a [`PetSession`].
//!
//! The engine spawns one tokio task per timed process (decay, sleep cycle,
//! countdown, minigame scheduler) plus short-lived tasks for popups,
//! running minigames and roulette animations. All of them share the
//! session behind a single `std::sync::Mutex`; the lock is only taken
//! inside [`PetEngine::with_session`] and never held across an `.await`.
//!
//! Events are published on an unbounded channel while the lock is held,
//! so subscribers see them in mutation order. When the session ends a
//! `watch` flag flips and every task exits at its next wake-up.
//!
//! ## Usage
//!
//! ```ignore
//! let (engine, mut events) = PetEngine::start(Config::default(), catalog)?;
//! engine.feed();
//! while let Some(event) = events.recv().await { /* render */ }
//! ```

pub mod admin;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::{AdminConfig, Config, RouletteConfig};
use crate::error::{ConfigError, CoreError, MinigameError, Result, ValidationError};
use crate::events::Event;
use crate::minigame::{
    plan, Minigame, MinigameCatalog, OfferResponse, OutcomeReporter, Wheel,
};
use crate::pet::{EmotionalState, PetSession, SessionOutcome, SessionSnapshot, StatSet, StatTarget};
use crate::timer::{CLOCK_TICK, DECAY_INTERVAL, MINIGAME_CHECK, SLEEP_TICK};

pub use admin::AdminConsole;

struct PendingOffer {
    id: u64,
    respond: oneshot::Sender<OfferResponse>,
}

struct Inner {
    session: Mutex<PetSession>,
    pending_offer: Mutex<Option<PendingOffer>>,
    catalog: MinigameCatalog,
    roulette: RouletteConfig,
    popup_timeout: Duration,
    admin: AdminConfig,
    events: mpsc::UnboundedSender<Event>,
    receiver_gone: AtomicBool,
    shutdown: watch::Sender<bool>,
}

/// Handle to a running session. Cheap to clone.
#[derive(Clone)]
pub struct PetEngine {
    inner: Arc<Inner>,
}

impl PetEngine {
    /// Build a session from `config` and start its background tasks.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation.
    pub fn start(
        config: Config,
        catalog: MinigameCatalog,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Event>), ConfigError> {
        let session = PetSession::new(config.clone(), Instant::now())?;
        let (events, rx) = mpsc::unbounded_channel();
        let (shutdown, _) = watch::channel(false);

        let engine = Self {
            inner: Arc::new(Inner {
                session: Mutex::new(session),
                pending_offer: Mutex::new(None),
                catalog,
                roulette: config.roulette.clone(),
                popup_timeout: Duration::from_secs(config.minigame.popup_timeout_secs),
                admin: config.admin.clone(),
                events,
                receiver_gone: AtomicBool::new(false),
                shutdown,
            }),
        };

        // Flush SessionStarted.
        engine.with_session(|_| ());

        engine.spawn_ticker("decay", DECAY_INTERVAL, |s, _| s.tick_decay());
        engine.spawn_ticker("sleep", SLEEP_TICK, |s, now| s.tick_sleep(now));
        engine.spawn_ticker("clock", CLOCK_TICK, |s, now| s.tick_clock(now));
        engine.spawn_scheduler();

        Ok((engine, rx))
    }

    // ── Presentation ─────────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_session().snapshot(Instant::now())
    }

    pub fn stats(&self) -> StatSet {
        self.lock_session().stats()
    }

    pub fn emotional_state(&self) -> EmotionalState {
        self.lock_session().emotional_state()
    }

    pub fn is_alive(&self) -> bool {
        self.lock_session().is_alive()
    }

    pub fn is_sleeping(&self) -> bool {
        self.lock_session().is_sleeping()
    }

    pub fn is_over(&self) -> bool {
        self.lock_session().is_over()
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.lock_session().outcome().cloned()
    }

    /// `HHH:MM:SS`.
    pub fn countdown(&self) -> String {
        self.lock_session().countdown(Instant::now())
    }

    /// Resolves once the session has ended or [`PetEngine::shutdown`] was
    /// called.
    pub async fn wait(&self) -> Option<SessionOutcome> {
        let mut stop = self.inner.shutdown.subscribe();
        // The sender lives in `inner`, so this only fails if it is gone.
        let _ = stop.wait_for(|done| *done).await;
        self.outcome()
    }

    /// Stop every background task. The session state is left as is.
    pub fn shutdown(&self) {
        self.signal_shutdown();
    }

    // ── Controls ─────────────────────────────────────────────────────

    pub fn change_stat(&self, target: impl Into<StatTarget>, delta: f64) -> StatSet {
        let target = target.into();
        self.with_session(|s| s.change_stat(target, delta))
    }

    pub fn feed(&self) -> bool {
        self.with_session(|s| s.feed())
    }

    pub fn shower(&self) -> bool {
        self.with_session(|s| s.shower())
    }

    pub fn toggle_sleep(&self) -> bool {
        self.with_session(|s| s.toggle_sleep(Instant::now()))
    }

    pub fn toggle_pause(&self) -> Result<bool, ValidationError> {
        self.with_session(|s| s.toggle_pause(Instant::now()))
    }

    /// Answer the open popup. Returns `false` if no popup is open.
    pub fn respond(&self, response: OfferResponse) -> bool {
        let pending = self.lock_pending().take();
        match pending {
            Some(offer) => offer.respond.send(response).is_ok(),
            None => false,
        }
    }

    /// Open a popup now, unless one is already open or a game is running.
    pub fn offer_minigame(&self) -> Result<u64> {
        let (tx, rx) = oneshot::channel();
        // Lock order is session, then pending: the offer must be answerable
        // as soon as the gate reads `Offered`.
        let id = self.with_session(|s| {
            let id = s.offer_minigame(Instant::now())?;
            *self.lock_pending() = Some(PendingOffer { id, respond: tx });
            Ok::<_, CoreError>(id)
        })?;
        self.spawn_popup(id, rx);
        Ok(id)
    }

    /// Launch a game without a popup. `None` picks one at random.
    pub fn launch_minigame(&self, name: Option<&str>) -> Result<()> {
        match name {
            Some(name) => {
                self.inner.catalog.get(name)?;
            }
            None if self.inner.catalog.is_empty() => {
                return Err(MinigameError::EmptyCatalog.into());
            }
            None => {}
        }
        self.with_session(|s| s.claim_minigame())?;

        let engine = self.clone();
        let name = name.map(str::to_string);
        tokio::spawn(async move { engine.run_minigame(name).await });
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    fn lock_session(&self) -> MutexGuard<'_, PetSession> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingOffer>> {
        self.inner
            .pending_offer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the session lock, then publish whatever it recorded.
    fn with_session<R>(&self, f: impl FnOnce(&mut PetSession) -> R) -> R {
        let mut session = self.lock_session();
        let result = f(&mut session);
        for event in session.drain_events() {
            self.publish(event);
        }
        let over = session.is_over();
        drop(session);

        if over {
            self.signal_shutdown();
        }
        result
    }

    fn publish(&self, event: Event) {
        if self.inner.events.send(event).is_err()
            && !self.inner.receiver_gone.swap(true, Ordering::Relaxed)
        {
            tracing::warn!("event receiver closed, dropping events");
        }
    }

    fn signal_shutdown(&self) {
        let flipped = self.inner.shutdown.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        });
        if flipped {
            tracing::info!("engine stopping");
        }
    }

    fn spawn_ticker<F>(&self, name: &'static str, period: Duration, mut on_tick: F)
    where
        F: FnMut(&mut PetSession, Instant) + Send + 'static,
    {
        let engine = self.clone();
        let mut stop = self.inner.shutdown.subscribe();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop.changed() => break,
                }
                let over = engine.with_session(|s| {
                    on_tick(s, Instant::now());
                    s.is_over()
                });
                if over {
                    break;
                }
            }
            tracing::debug!(task = name, "timer task stopped");
        });
    }

    fn spawn_scheduler(&self) {
        let engine = self.clone();
        let mut stop = self.inner.shutdown.subscribe();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + MINIGAME_CHECK, MINIGAME_CHECK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop.changed() => break,
                }
                let (due, over) =
                    engine.with_session(|s| (s.minigame_due(Instant::now()), s.is_over()));
                if over {
                    break;
                }
                if due {
                    if let Err(err) = engine.offer_minigame() {
                        tracing::debug!(%err, "scheduled offer skipped");
                    }
                }
            }
            tracing::debug!(task = "minigame", "timer task stopped");
        });
    }

    fn spawn_popup(&self, id: u64, answer: oneshot::Receiver<OfferResponse>) {
        let engine = self.clone();
        let timeout = self.inner.popup_timeout;
        let mut stop = self.inner.shutdown.subscribe();
        tokio::spawn(async move {
            let response = tokio::select! {
                answer = time::timeout(timeout, answer) => match answer {
                    Ok(Ok(response)) => response,
                    Ok(Err(_)) => OfferResponse::Dismissed,
                    Err(_) => OfferResponse::TimedOut,
                },
                _ = stop.changed() => return,
            };

            engine.clear_pending(id);
            let launch = engine.with_session(|s| {
                s.respond_to_offer(id, response)
                    && response == OfferResponse::Accepted
                    && !s.is_over()
            });
            if launch {
                engine.run_minigame(None).await;
            }
        });
    }

    fn clear_pending(&self, id: u64) {
        let mut pending = self.lock_pending();
        if pending.as_ref().map(|offer| offer.id) == Some(id) {
            pending.take();
        }
    }

    fn pick_game(&self, name: Option<&str>) -> Result<Arc<dyn Minigame>, MinigameError> {
        let catalog = &self.inner.catalog;
        match name {
            Some(name) => catalog.get(name),
            None => {
                let index = self
                    .with_session(|s| s.pick_index(catalog.len()))
                    .ok_or(MinigameError::EmptyCatalog)?;
                catalog.at(index)
            }
        }
    }

    /// Launch a game on a gate already in `Running`, await its result and
    /// spin the wheel.
    async fn run_minigame(&self, name: Option<String>) {
        let mut stop = self.inner.shutdown.subscribe();

        let game = match self.pick_game(name.as_deref()) {
            Ok(game) => game,
            Err(err) => {
                let label = name.unwrap_or_else(|| "random".to_string());
                self.with_session(|s| s.abort_minigame(&label, &err));
                return;
            }
        };
        let game_name = game.name().to_string();
        self.with_session(|s| s.minigame_started(&game_name));

        let (reporter, result) = OutcomeReporter::new(game_name.clone());
        if let Err(err) = launch_guarded(game.as_ref(), reporter) {
            self.with_session(|s| s.abort_minigame(&game_name, &err));
            return;
        }

        let outcome = tokio::select! {
            outcome = result => outcome,
            _ = stop.changed() => return,
        };
        match outcome {
            Ok(outcome) => {
                let wheel = self.with_session(|s| s.complete_minigame(&game_name, outcome));
                if let Some(wheel) = wheel {
                    self.run_roulette(wheel, &mut stop).await;
                }
            }
            Err(_) => {
                let err = MinigameError::Abandoned(game_name.clone());
                self.with_session(|s| s.abort_minigame(&game_name, &err));
            }
        }
    }

    async fn run_roulette(&self, wheel: Wheel, stop: &mut watch::Receiver<bool>) {
        let roulette = &self.inner.roulette;
        let steps = self.with_session(|s| plan(s.spin(wheel), roulette));
        let start = Instant::now();
        for step in steps {
            tokio::select! {
                _ = time::sleep_until(start + step.at) => {}
                _ = stop.changed() => return,
            }
            let over = self.with_session(|s| {
                s.roulette_step(&step);
                s.is_over()
            });
            if over {
                return;
            }
        }
    }
}

/// Launch `game`, turning a panic inside it into `LaunchFailed`.
fn launch_guarded(game: &dyn Minigame, reporter: OutcomeReporter) -> Result<(), MinigameError> {
    panic::catch_unwind(AssertUnwindSafe(|| game.launch(reporter))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panicked".to_string());
        Err(MinigameError::LaunchFailed {
            game: game.name().to_string(),
            message: format!("panicked: {message}"),
        })
    })
}
