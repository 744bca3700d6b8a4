//! Profile inspection commands.
//!
//! Profiles are complete configurations; `config show --profile ID`
//! exports one as TOML.

use clap::Subcommand;
use pocketpet_core::{builtin_profiles, find_profile, ConfigError, DEFAULT_PROFILE};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// List all built-in profiles
    List,

    /// Show details for a specific profile
    Show {
        /// Profile ID (e.g., "half-day", "full-day", "classic")
        id: String,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProfileAction::List => list_profiles(),
        ProfileAction::Show { id } => show_profile(&id),
    }
}

fn list_profiles() -> Result<(), Box<dyn std::error::Error>> {
    println!("Available Profiles:");
    println!();

    for profile in builtin_profiles() {
        let default = if profile.id == DEFAULT_PROFILE {
            " [DEFAULT]"
        } else {
            ""
        };
        println!("  {} - {}{}", profile.id, profile.name, default);
        println!("    {}", profile.description);
        println!();
    }

    Ok(())
}

fn show_profile(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let profile = find_profile(id).ok_or_else(|| ConfigError::UnknownProfile(id.to_string()))?;
    let cfg = &profile.config;

    println!("{} ({})", profile.name, profile.id);
    println!("{}", "=".repeat(profile.name.len() + profile.id.len() + 3));
    println!();
    println!("Description: {}", profile.description);
    println!();
    println!("Rationale:");
    for line in profile.rationale.lines() {
        println!("  {}", line);
    }
    println!();

    println!("Session:");
    println!("  Duration: {} h", cfg.session.duration_secs / 3600);
    println!("  Pet: {} (stats start at {})", cfg.pet.name, cfg.pet.initial_stat);
    println!();

    println!("Decay:");
    println!("  Hunger: -{} per hour", cfg.decay.hunger_per_hour);
    println!("  Sleep: -{} per hour", cfg.decay.sleep_per_hour);
    println!("  Hygiene: -{} every two hours", cfg.decay.hygiene_per_two_hours);
    println!("  Reduction while asleep: {}%", cfg.decay.sleep_reduction * 100.0);
    println!();

    println!("Sleep:");
    println!("  Gain: +{} per minute", cfg.sleep.gain_per_minute);
    println!("  Optimal: {} h", cfg.sleep.optimal_hours);
    println!();

    println!("Minigames:");
    if cfg.minigame.interval_min_secs == cfg.minigame.interval_max_secs {
        println!("  Every {} min", cfg.minigame.interval_min_secs / 60);
    } else {
        println!(
            "  Every {}-{} min",
            cfg.minigame.interval_min_secs / 60,
            cfg.minigame.interval_max_secs / 60
        );
    }
    println!("  Popup timeout: {} s", cfg.minigame.popup_timeout_secs);
    println!();

    println!("Pause:");
    if cfg.pause.budget_secs == 0 {
        println!("  Disabled");
    } else {
        println!("  Budget: {} h", cfg.pause.budget_secs / 3600);
    }

    Ok(())
}
