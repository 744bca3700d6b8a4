use std::path::{Path, PathBuf};

use clap::Subcommand;
use pocketpet_core::{find_profile, Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a full config as TOML
    Show {
        /// Export a built-in profile instead of the config file
        #[arg(long)]
        profile: Option<String>,
    },
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "decay.hunger_per_hour", "pet.name")
        key: String,
        /// Config file to read instead of the default one
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Set a config value and save the file
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
        /// Config file to write instead of the default one
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default config file path
    Path,
    /// Check that a config file is complete and in range
    Validate {
        /// Config file to check
        path: PathBuf,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { profile } => {
            let config = resolve(profile.as_deref(), None)?;
            print!("{}", config.to_toml_string()?);
        }
        ConfigAction::Get { key, config } => {
            let config = resolve(None, config.as_deref())?;
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value, config } => {
            let path = config.unwrap_or_else(Config::default_path);
            let mut current = if path.exists() {
                Config::load(&path)?
            } else {
                Config::default()
            };
            current.set(&key, &value)?;
            current.save(&path)?;
            println!("ok");
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
        }
        ConfigAction::Validate { path } => {
            Config::load(&path)?;
            println!("{} is valid", path.display());
        }
    }
    Ok(())
}

/// Pick the config a command runs with: an explicit file, a built-in
/// profile, the default file if it exists, or the default profile.
pub fn resolve(profile: Option<&str>, path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return Config::load(path);
    }
    if let Some(id) = profile {
        return find_profile(id)
            .map(|p| p.config)
            .ok_or_else(|| ConfigError::UnknownProfile(id.to_string()));
    }

    let default_path = Config::default_path();
    if default_path.exists() {
        tracing::debug!(path = %default_path.display(), "loading config file");
        Config::load(&default_path)
    } else {
        Ok(Config::default())
    }
}
