//! Popup gate in front of minigames.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Offered -> (Accepted -> Running -> Idle) | (Declined | TimedOut | Dismissed -> Idle)
//! Idle -> Running -> Idle                          (admin launch, no popup)
//! ```
//!
//! Only one offer or running game exists at a time. Each offer carries an
//! id so a late timeout cannot resolve a newer popup.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::MinigameConfig;
use crate::error::MinigameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Idle,
    Offered,
    Running,
}

/// How a popup was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferResponse {
    Accepted,
    Declined,
    TimedOut,
    /// Closed without answering. Scored as a timeout.
    Dismissed,
}

#[derive(Debug, Clone)]
pub struct MinigameGate {
    state: GateState,
    next_fire: Instant,
    offer_id: u64,
}

impl MinigameGate {
    pub fn new<R: Rng + ?Sized>(now: Instant, rng: &mut R, cfg: &MinigameConfig) -> Self {
        Self {
            state: GateState::Idle,
            next_fire: draw_next_fire(now, rng, cfg),
            offer_id: 0,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn next_fire(&self) -> Instant {
        self.next_fire
    }

    /// Id of the current or most recent offer.
    pub fn offer_id(&self) -> u64 {
        self.offer_id
    }

    /// The fire time has passed and nothing is active.
    pub fn is_due(&self, now: Instant) -> bool {
        self.state == GateState::Idle && now >= self.next_fire
    }

    /// Open a popup and draw the next fire time.
    pub fn offer<R: Rng + ?Sized>(
        &mut self,
        now: Instant,
        rng: &mut R,
        cfg: &MinigameConfig,
    ) -> Result<u64, MinigameError> {
        if self.state != GateState::Idle {
            return Err(MinigameError::Busy);
        }
        self.state = GateState::Offered;
        self.offer_id += 1;
        self.next_fire = draw_next_fire(now, rng, cfg);
        Ok(self.offer_id)
    }

    /// Close the popup `offer_id`. Returns `false` if that offer is no
    /// longer open.
    pub fn resolve(&mut self, offer_id: u64, response: OfferResponse) -> bool {
        if self.state != GateState::Offered || offer_id != self.offer_id {
            return false;
        }
        self.state = match response {
            OfferResponse::Accepted => GateState::Running,
            _ => GateState::Idle,
        };
        true
    }

    /// Enter `Running` without a popup.
    pub fn claim(&mut self) -> Result<(), MinigameError> {
        if self.state != GateState::Idle {
            return Err(MinigameError::Busy);
        }
        self.state = GateState::Running;
        Ok(())
    }

    /// Leave `Running`, whatever the outcome.
    pub fn finish(&mut self) {
        if self.state == GateState::Running {
            self.state = GateState::Idle;
        }
    }
}

fn draw_next_fire<R: Rng + ?Sized>(now: Instant, rng: &mut R, cfg: &MinigameConfig) -> Instant {
    let secs = rng.gen_range(cfg.interval_min_secs..=cfg.interval_max_secs);
    // Validated intervals never overflow; fire at once rather than panic.
    now.checked_add(Duration::from_secs(secs)).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn cfg(min: u64, max: u64) -> MinigameConfig {
        MinigameConfig {
            interval_min_secs: min,
            interval_max_secs: max,
            popup_timeout_secs: 60,
            accept_reward: 10.0,
            decline_penalty: 10.0,
            timeout_penalty: 25.0,
            sleep_cost: 15.0,
            win_happiness: 15.0,
            loss_happiness: 10.0,
        }
    }

    #[test]
    fn fire_time_within_interval() {
        let mut rng = Pcg64::seed_from_u64(1);
        let t0 = Instant::now();
        for _ in 0..50 {
            let gate = MinigameGate::new(t0, &mut rng, &cfg(600, 1800));
            let wait = gate.next_fire() - t0;
            assert!(wait >= Duration::from_secs(600) && wait <= Duration::from_secs(1800));
        }
    }

    #[test]
    fn overflowing_interval_fires_at_once() {
        let mut rng = Pcg64::seed_from_u64(1);
        let t0 = Instant::now();
        let gate = MinigameGate::new(t0, &mut rng, &cfg(u64::MAX, u64::MAX));
        assert_eq!(gate.next_fire(), t0);
    }

    #[test]
    fn second_offer_is_rejected_while_pending() {
        let mut rng = Pcg64::seed_from_u64(2);
        let t0 = Instant::now();
        let mut gate = MinigameGate::new(t0, &mut rng, &cfg(900, 900));
        let now = t0 + Duration::from_secs(900);
        assert!(gate.is_due(now));
        gate.offer(now, &mut rng, &cfg(900, 900)).unwrap();
        assert!(!gate.is_due(now));
        assert!(matches!(
            gate.offer(now, &mut rng, &cfg(900, 900)),
            Err(MinigameError::Busy)
        ));
    }

    #[test]
    fn offer_redraws_fire_time() {
        let mut rng = Pcg64::seed_from_u64(3);
        let t0 = Instant::now();
        let mut gate = MinigameGate::new(t0, &mut rng, &cfg(900, 900));
        let now = t0 + Duration::from_secs(1000);
        gate.offer(now, &mut rng, &cfg(900, 900)).unwrap();
        assert_eq!(gate.next_fire(), now + Duration::from_secs(900));
    }

    #[test]
    fn stale_offer_id_is_ignored() {
        let mut rng = Pcg64::seed_from_u64(4);
        let t0 = Instant::now();
        let c = cfg(10, 10);
        let mut gate = MinigameGate::new(t0, &mut rng, &c);
        let first = gate.offer(t0, &mut rng, &c).unwrap();
        assert!(gate.resolve(first, OfferResponse::Declined));
        let second = gate.offer(t0, &mut rng, &c).unwrap();
        assert!(!gate.resolve(first, OfferResponse::TimedOut));
        assert_eq!(gate.state(), GateState::Offered);
        assert!(gate.resolve(second, OfferResponse::Accepted));
        assert_eq!(gate.state(), GateState::Running);
    }

    #[test]
    fn claim_respects_mutual_exclusion() {
        let mut rng = Pcg64::seed_from_u64(5);
        let t0 = Instant::now();
        let mut gate = MinigameGate::new(t0, &mut rng, &cfg(10, 10));
        gate.claim().unwrap();
        assert!(matches!(gate.claim(), Err(MinigameError::Busy)));
        gate.finish();
        assert_eq!(gate.state(), GateState::Idle);
    }
}
