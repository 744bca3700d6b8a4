//! Minigame boundary.
//!
//! Minigames are external components. The engine only knows their name and
//! how to launch them with a one-shot [`OutcomeReporter`]; everything else
//! about a game is its own business.

pub mod gate;
pub mod roulette;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::MinigameError;

pub use gate::{GateState, MinigameGate, OfferResponse};
pub use roulette::{plan, RouletteAction, RouletteStep, Sector, Wheel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinigameOutcome {
    Won,
    Lost,
}

impl fmt::Display for MinigameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinigameOutcome::Won => f.write_str("won"),
            MinigameOutcome::Lost => f.write_str("lost"),
        }
    }
}

/// Hands a game's result back to the engine.
///
/// `report` consumes the reporter, so a game can answer at most once.
/// Dropping it without reporting abandons the game.
#[derive(Debug)]
pub struct OutcomeReporter {
    game: String,
    tx: oneshot::Sender<MinigameOutcome>,
}

impl OutcomeReporter {
    pub fn new(game: impl Into<String>) -> (Self, oneshot::Receiver<MinigameOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                game: game.into(),
                tx,
            },
            rx,
        )
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn report(self, outcome: MinigameOutcome) {
        if self.tx.send(outcome).is_err() {
            tracing::debug!(game = %self.game, "minigame result arrived after the session ended");
        }
    }
}

/// A self-contained game the engine can launch.
pub trait Minigame: Send + Sync {
    fn name(&self) -> &str;

    /// Start the game. It may finish synchronously or hand the reporter to
    /// its own task; either way it must eventually report or drop it.
    fn launch(&self, reporter: OutcomeReporter) -> Result<(), MinigameError>;
}

/// Registered minigames, in registration order.
#[derive(Clone, Default)]
pub struct MinigameCatalog {
    games: Vec<Arc<dyn Minigame>>,
}

impl fmt::Debug for MinigameCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinigameCatalog")
            .field("games", &self.names())
            .finish()
    }
}

impl MinigameCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, game: impl Minigame + 'static) -> Self {
        self.register(game);
        self
    }

    /// Add a game, replacing any game with the same name.
    pub fn register(&mut self, game: impl Minigame + 'static) {
        let game: Arc<dyn Minigame> = Arc::new(game);
        match self.games.iter_mut().find(|g| g.name() == game.name()) {
            Some(slot) => *slot = game,
            None => self.games.push(game),
        }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.games.iter().map(|g| g.name()).collect()
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Minigame>, MinigameError> {
        self.games
            .iter()
            .find(|g| g.name() == name)
            .cloned()
            .ok_or_else(|| MinigameError::UnknownGame(name.to_string()))
    }

    pub fn at(&self, index: usize) -> Result<Arc<dyn Minigame>, MinigameError> {
        self.games.get(index).cloned().ok_or(MinigameError::EmptyCatalog)
    }
}
