//! Passphrase-gated administrative commands.

use std::time::Duration;

use tokio::time::Instant;

use super::PetEngine;
use crate::error::{CoreError, Result};
use crate::pet::Sprite;

/// Borrowed admin handle, obtained with [`PetEngine::admin`].
pub struct AdminConsole<'a> {
    engine: &'a PetEngine,
}

impl PetEngine {
    /// Unlock the admin surface.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the passphrase does not match.
    pub fn admin(&self, passphrase: &str) -> Result<AdminConsole<'_>> {
        if passphrase != self.inner.admin.passphrase {
            tracing::warn!("admin passphrase rejected");
            return Err(CoreError::Unauthorized);
        }
        Ok(AdminConsole { engine: self })
    }
}

impl AdminConsole<'_> {
    /// End the session in victory now.
    pub fn force_victory(&self) -> bool {
        self.engine
            .with_session(|s| s.force_victory(Instant::now()))
    }

    /// Remove time from the countdown; `None` uses the configured cut.
    /// Returns the new remaining time.
    pub fn cut_time(&self, by: Option<Duration>) -> Duration {
        let by = by.unwrap_or_else(|| Duration::from_secs(self.engine.inner.admin.time_cut_secs));
        self.engine
            .with_session(|s| s.cut_time(Instant::now(), by))
    }

    /// Show a sprite by key: an emotional label or `death:<cause>`.
    pub fn preview_sprite(&self, key: &str) -> Result<Sprite> {
        let sprite: Sprite = key.parse()?;
        self.engine.with_session(|s| s.preview_sprite(sprite));
        Ok(sprite)
    }

    /// Set every stat to the maximum without running the death rules.
    pub fn restore_stats(&self) {
        self.engine.with_session(|s| s.restore_stats());
    }

    pub fn wake(&self) -> bool {
        self.engine.with_session(|s| s.wake(Instant::now()))
    }

    /// Open the minigame popup now.
    pub fn force_offer(&self) -> Result<u64> {
        self.engine.offer_minigame()
    }

    /// Start a game directly, skipping the popup. `None` picks at random.
    pub fn launch_minigame(&self, name: Option<&str>) -> Result<()> {
        self.engine.launch_minigame(name)
    }
}
