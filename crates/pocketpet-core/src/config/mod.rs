//! TOML-based engine configuration.
//!
//! Every rate, threshold, penalty and interval the engine uses comes from
//! here. Files are strict: all keys are required and unknown keys are
//! rejected, so a missing constant stops the program at startup instead of
//! silently running with a different difficulty.
//!
//! The default file lives at `~/.config/pocketpet/config.toml`. Built-in
//! presets are in [`profiles`].

pub mod profiles;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub use profiles::{builtin_profiles, find_profile, profile_ids, Profile, DEFAULT_PROFILE};

/// Pet identity and starting stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PetConfig {
    pub name: String,
    /// Value every stat starts at.
    pub initial_stat: f64,
}

/// Session countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub duration_secs: u64,
}

/// Hourly decay rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecayConfig {
    pub hunger_per_hour: f64,
    pub sleep_per_hour: f64,
    pub hygiene_per_two_hours: f64,
    /// Fraction of the awake rate removed while asleep (0.8 leaves 20%).
    pub sleep_reduction: f64,
}

/// Sleep gain and oversleep penalties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SleepConfig {
    pub gain_per_minute: f64,
    /// Happiness lost per minute asleep once sleep is already full.
    pub oversleep_happiness_per_minute: f64,
    pub optimal_hours: f64,
    /// Minutes of overtime per happiness point lost.
    pub overtime_divisor_minutes: f64,
}

/// Minigame scheduling and popup outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MinigameConfig {
    pub interval_min_secs: u64,
    pub interval_max_secs: u64,
    pub popup_timeout_secs: u64,
    pub accept_reward: f64,
    pub decline_penalty: f64,
    pub timeout_penalty: f64,
    pub sleep_cost: f64,
    pub win_happiness: f64,
    pub loss_happiness: f64,
}

/// Roulette feedback timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouletteConfig {
    pub flash_cycles: u32,
    pub flash_half_period_ms: u64,
    pub stagger_ms: u64,
}

/// User action amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionsConfig {
    pub feed_increase: f64,
    pub shower_increase: f64,
}

/// Hunger death thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeathConfig {
    /// Starvation at or below this value.
    pub hunger_min: f64,
    /// Obesity strictly above this value.
    pub hunger_max: f64,
}

/// Pause budget. Zero disables pausing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PauseConfig {
    pub budget_secs: u64,
}

/// Administrative surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    pub passphrase: String,
    /// Seconds removed by one "cut time" command.
    pub time_cut_secs: u64,
}

/// Longest session a config may ask for.
pub const MAX_SESSION_SECS: u64 = 30 * 24 * 3600;
const MAX_FLASH_CYCLES: u32 = 20;
const MAX_ROULETTE_STEP_MS: u64 = 10_000;

/// Engine configuration.
///
/// Serialized to/from TOML. `Config::default()` is the `half-day` profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Fixed RNG seed; entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub pet: PetConfig,
    pub session: SessionConfig,
    pub decay: DecayConfig,
    pub sleep: SleepConfig,
    pub minigame: MinigameConfig,
    pub roulette: RouletteConfig,
    pub actions: ActionsConfig,
    pub death: DeathConfig,
    pub pause: PauseConfig,
    pub admin: AdminConfig,
}

impl Default for Config {
    fn default() -> Self {
        profiles::half_day()
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("not a leaf key".to_string()))
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// `~/.config/pocketpet/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("pocketpet")
            .join("config.toml")
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is missing a key, has an
    /// unknown key, or holds an out-of-range value.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Persist to disk, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a leaf value by dot-separated key. The result is validated before
    /// it replaces `self`. `seed` takes a number, or `none` to clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value does not parse, or
    /// the updated config fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        // Absent from the serialized tree while unset.
        if key == "seed" {
            self.seed = match value {
                "none" => None,
                _ => Some(value.parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: e.to_string(),
                    }
                })?),
            };
            return Ok(());
        }

        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, key: &str, message: &str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: message.to_string(),
                })
            }
        }
        fn non_negative(value: f64, key: &str) -> Result<(), ConfigError> {
            check(value.is_finite() && value >= 0.0, key, "must be a finite value >= 0")
        }
        fn in_stat_range(value: f64, key: &str) -> Result<(), ConfigError> {
            check(
                value.is_finite() && (0.0..=100.0).contains(&value),
                key,
                "must be within 0..=100",
            )
        }

        check(!self.pet.name.trim().is_empty(), "pet.name", "must not be empty")?;
        in_stat_range(self.pet.initial_stat, "pet.initial_stat")?;
        check(
            (1..=MAX_SESSION_SECS).contains(&self.session.duration_secs),
            "session.duration_secs",
            "must be within 1..=2592000 (30 days)",
        )?;

        non_negative(self.decay.hunger_per_hour, "decay.hunger_per_hour")?;
        non_negative(self.decay.sleep_per_hour, "decay.sleep_per_hour")?;
        non_negative(self.decay.hygiene_per_two_hours, "decay.hygiene_per_two_hours")?;
        check(
            (0.0..=1.0).contains(&self.decay.sleep_reduction),
            "decay.sleep_reduction",
            "must be within 0..=1",
        )?;

        non_negative(self.sleep.gain_per_minute, "sleep.gain_per_minute")?;
        non_negative(
            self.sleep.oversleep_happiness_per_minute,
            "sleep.oversleep_happiness_per_minute",
        )?;
        check(
            self.sleep.optimal_hours > 0.0 && self.sleep.optimal_hours <= 24.0,
            "sleep.optimal_hours",
            "must be within (0, 24]",
        )?;
        check(
            self.sleep.overtime_divisor_minutes > 0.0
                && self.sleep.overtime_divisor_minutes <= 24.0 * 60.0,
            "sleep.overtime_divisor_minutes",
            "must be within (0, 1440]",
        )?;

        let mg = &self.minigame;
        check(mg.interval_min_secs > 0, "minigame.interval_min_secs", "must be > 0")?;
        check(
            mg.interval_max_secs >= mg.interval_min_secs,
            "minigame.interval_max_secs",
            "must be >= minigame.interval_min_secs",
        )?;
        check(
            mg.interval_max_secs <= self.session.duration_secs,
            "minigame.interval_max_secs",
            "must be <= session.duration_secs",
        )?;
        check(
            mg.popup_timeout_secs > 0 && mg.popup_timeout_secs <= self.session.duration_secs,
            "minigame.popup_timeout_secs",
            "must be within 1..=session.duration_secs",
        )?;
        non_negative(mg.accept_reward, "minigame.accept_reward")?;
        non_negative(mg.decline_penalty, "minigame.decline_penalty")?;
        non_negative(mg.timeout_penalty, "minigame.timeout_penalty")?;
        non_negative(mg.sleep_cost, "minigame.sleep_cost")?;
        non_negative(mg.win_happiness, "minigame.win_happiness")?;
        non_negative(mg.loss_happiness, "minigame.loss_happiness")?;

        check(
            (1..=MAX_FLASH_CYCLES).contains(&self.roulette.flash_cycles),
            "roulette.flash_cycles",
            "must be within 1..=20",
        )?;
        check(
            self.roulette.flash_half_period_ms <= MAX_ROULETTE_STEP_MS,
            "roulette.flash_half_period_ms",
            "must be <= 10000",
        )?;
        check(
            self.roulette.stagger_ms <= MAX_ROULETTE_STEP_MS,
            "roulette.stagger_ms",
            "must be <= 10000",
        )?;

        non_negative(self.actions.feed_increase, "actions.feed_increase")?;
        non_negative(self.actions.shower_increase, "actions.shower_increase")?;

        in_stat_range(self.death.hunger_min, "death.hunger_min")?;
        in_stat_range(self.death.hunger_max, "death.hunger_max")?;
        check(
            self.death.hunger_max > self.death.hunger_min,
            "death.hunger_max",
            "must be > death.hunger_min",
        )?;
        check(
            self.pet.initial_stat > self.death.hunger_min
                && self.pet.initial_stat <= self.death.hunger_max,
            "pet.initial_stat",
            "pet would die before the session starts",
        )?;

        check(!self.admin.passphrase.is_empty(), "admin.passphrase", "must not be empty")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = cfg.to_toml_string().unwrap();
        let parsed = Config::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn missing_key_is_fatal() {
        let cfg = Config::default();
        let toml_str = cfg
            .to_toml_string()
            .unwrap()
            .lines()
            .filter(|line| !line.starts_with("hunger_per_hour"))
            .collect::<Vec<_>>()
            .join("\n");
        let err = Config::from_toml_str(&toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut toml_str = Config::default().to_toml_string().unwrap();
        toml_str = toml_str.replacen("[pet]\n", "[pet]\ncolour = \"green\"\n", 1);
        assert!(Config::from_toml_str(&toml_str).is_err());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("minigame.popup_timeout_secs").as_deref(), Some("60"));
        assert_eq!(cfg.get("admin.passphrase").as_deref(), Some("admin123"));
        assert!(cfg.get("minigame.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("actions.feed_increase", "12.5").unwrap();
        assert_eq!(cfg.actions.feed_increase, 12.5);
        cfg.set("session.duration_secs", "1800").unwrap();
        assert_eq!(cfg.session.duration_secs, 1800);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("actions.pet_increase", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_result() {
        let mut cfg = Config::default();
        let before = cfg.clone();
        assert!(cfg.set("minigame.interval_max_secs", "1").is_err());
        assert_eq!(cfg, before);
    }

    #[test]
    fn validate_rejects_inverted_interval() {
        let mut cfg = Config::default();
        cfg.minigame.interval_min_secs = 100;
        cfg.minigame.interval_max_secs = 50;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "minigame.interval_max_secs"
        ));
    }

    #[test]
    fn validate_rejects_interval_beyond_session() {
        let mut cfg = Config::default();
        cfg.minigame.interval_max_secs = u64::MAX;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "minigame.interval_max_secs"
        ));
    }

    #[test]
    fn validate_rejects_huge_optimal_sleep() {
        let mut cfg = Config::default();
        cfg.sleep.optimal_hours = 1e300;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "sleep.optimal_hours"
        ));
        cfg.sleep.optimal_hours = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_overlong_session() {
        let mut cfg = Config::default();
        cfg.session.duration_secs = MAX_SESSION_SECS + 1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "session.duration_secs"
        ));
    }

    #[test]
    fn validate_rejects_slow_roulette() {
        let mut cfg = Config::default();
        cfg.roulette.stagger_ms = u64::MAX;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "roulette.stagger_ms"
        ));
    }

    #[test]
    fn set_seed_when_absent() {
        let mut cfg = Config::default();
        assert_eq!(cfg.seed, None);
        cfg.set("seed", "5").unwrap();
        assert_eq!(cfg.seed, Some(5));
        assert_eq!(cfg.get("seed").as_deref(), Some("5"));
        cfg.set("seed", "none").unwrap();
        assert_eq!(cfg.seed, None);
        assert!(matches!(
            cfg.set("seed", "-1"),
            Err(ConfigError::InvalidValue { key, .. }) if key == "seed"
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.seed = Some(99);
        cfg.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }
}
