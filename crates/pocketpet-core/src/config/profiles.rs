//! Built-in difficulty profiles.
//!
//! Each profile is a complete [`Config`]; picking one replaces every
//! constant. The presets are mutually incompatible tunings of the same
//! engine, so they are never merged.

use serde::{Deserialize, Serialize};

use super::{
    ActionsConfig, AdminConfig, Config, DeathConfig, DecayConfig, MinigameConfig, PauseConfig,
    PetConfig, RouletteConfig, SessionConfig, SleepConfig,
};

/// Profile used when the caller names none.
pub const DEFAULT_PROFILE: &str = "half-day";

/// A named preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rationale: String,
    pub config: Config,
}

/// Returns all built-in profiles.
pub fn builtin_profiles() -> Vec<Profile> {
    vec![half_day_profile(), full_day_profile(), classic_profile()]
}

/// Find a built-in profile by ID.
pub fn find_profile(id: &str) -> Option<Profile> {
    builtin_profiles().into_iter().find(|p| p.id == id)
}

/// Get profile IDs for listing.
pub fn profile_ids() -> Vec<&'static str> {
    vec!["half-day", "full-day", "classic"]
}

// Settings every profile shares.

fn pet() -> PetConfig {
    PetConfig {
        name: "Mini-Diego".to_string(),
        initial_stat: 50.0,
    }
}

fn popup_minigame(interval_min_secs: u64, interval_max_secs: u64) -> MinigameConfig {
    MinigameConfig {
        interval_min_secs,
        interval_max_secs,
        popup_timeout_secs: 60,
        accept_reward: 10.0,
        decline_penalty: 10.0,
        timeout_penalty: 25.0,
        sleep_cost: 15.0,
        win_happiness: 15.0,
        loss_happiness: 10.0,
    }
}

fn roulette() -> RouletteConfig {
    RouletteConfig {
        flash_cycles: 3,
        flash_half_period_ms: 200,
        stagger_ms: 300,
    }
}

fn actions() -> ActionsConfig {
    ActionsConfig {
        feed_increase: 10.0,
        shower_increase: 40.0,
    }
}

fn death() -> DeathConfig {
    DeathConfig {
        hunger_min: 0.0,
        hunger_max: 90.0,
    }
}

fn admin() -> AdminConfig {
    AdminConfig {
        passphrase: "admin123".to_string(),
        time_cut_secs: 3600,
    }
}

fn sleep(gain_per_minute: f64, optimal_hours: f64) -> SleepConfig {
    SleepConfig {
        gain_per_minute,
        oversleep_happiness_per_minute: 0.5,
        optimal_hours,
        overtime_divisor_minutes: 6.0,
    }
}

// ============================================================================
// BUILT-IN PROFILES
// ============================================================================

/// The `half-day` config, also `Config::default()`.
pub(crate) fn half_day() -> Config {
    Config {
        seed: None,
        pet: pet(),
        session: SessionConfig {
            duration_secs: 12 * 3600,
        },
        decay: DecayConfig {
            hunger_per_hour: 50.0,
            sleep_per_hour: 90.0,
            hygiene_per_two_hours: 80.0,
            sleep_reduction: 0.8,
        },
        sleep: sleep(4.5, 6.0),
        minigame: popup_minigame(900, 900),
        roulette: roulette(),
        actions: actions(),
        death: death(),
        pause: PauseConfig { budget_secs: 0 },
        admin: admin(),
    }
}

/// Half-day profile
///
/// Twelve hours of steep decay. The pet needs attention roughly every hour.
fn half_day_profile() -> Profile {
    Profile {
        id: "half-day".to_string(),
        name: "Half Day".to_string(),
        description: "12 hour session with steep decay and frequent minigames".to_string(),
        rationale: indoc::indoc! {"
            The session lasts twelve hours, so the meters drain fast:
            half the hunger bar and most of the sleep bar go every
            waking hour, and hygiene loses 80 points every two hours.

            Sleep refills at 4.5 points a minute, a full bar in under
            25 minutes, and oversleeping starts to hurt after 6 hours.

            A minigame is offered every 15 minutes. Pausing is disabled.
        "}
        .to_string(),
        config: half_day(),
    }
}

/// Full-day profile
///
/// The same rules stretched over twenty-four hours.
fn full_day_profile() -> Profile {
    let mut config = half_day();
    config.session.duration_secs = 24 * 3600;
    config.decay = DecayConfig {
        hunger_per_hour: 17.0,
        sleep_per_hour: 30.0,
        hygiene_per_two_hours: 27.0,
        sleep_reduction: 0.8,
    };
    config.sleep = sleep(1.5, 7.0);

    Profile {
        id: "full-day".to_string(),
        name: "Full Day".to_string(),
        description: "24 hour session with decay at a third of half-day".to_string(),
        rationale: indoc::indoc! {"
            Doubling the session length while keeping half-day rates
            would make the pet unwinnable, so every decay rate is cut
            to roughly a third.

            Sleep refills more slowly (1.5 per minute) and the pet can
            sleep 7 hours before oversleeping costs happiness.

            Minigames still arrive every 15 minutes. Pausing is disabled.
        "}
        .to_string(),
        config,
    }
}

/// Classic profile
///
/// Gentle decay, irregular minigames and a pause allowance.
fn classic_profile() -> Profile {
    let mut config = half_day();
    config.session.duration_secs = 24 * 3600;
    config.decay = DecayConfig {
        hunger_per_hour: 10.0,
        sleep_per_hour: 15.0,
        hygiene_per_two_hours: 20.0,
        sleep_reduction: 0.8,
    };
    config.sleep = sleep(1.5, 7.0);
    config.minigame = popup_minigame(600, 1800);
    config.pause = PauseConfig {
        budget_secs: 7 * 3600,
    };

    Profile {
        id: "classic".to_string(),
        name: "Classic".to_string(),
        description: "24 hour session, gentle decay, pause allowance of 7 hours".to_string(),
        rationale: indoc::indoc! {"
            The relaxed ruleset: meters drain slowly enough to leave
            the pet alone for a few hours at a time.

            Minigames arrive at random between 10 and 30 minutes apart
            instead of on a fixed beat.

            Up to 7 hours of pause can be spent over the session. The
            countdown keeps running while paused; only decay and
            minigames stop.
        "}
        .to_string(),
        config,
    }
}
