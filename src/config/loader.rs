// Configuration loader
// Loads settings from ~/.scorelink/config.toml, then applies environment overrides

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;

const TARGET_NAME_ENV: &str = "SCORELINK_TARGET_NAME";
const EVENT_NAME_ENV: &str = "SCORELINK_EVENT_NAME";

/// Default config location: ~/.scorelink/config.toml
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".scorelink").join("config.toml"))
}

/// Load configuration from `path` (or the default location).
///
/// A missing file is not an error; built-in defaults are used instead.
pub fn load_config_from(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    let mut config = if config_path.exists() {
        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        tracing::debug!(path = %config_path.display(), "Loaded configuration");
        config
    } else {
        if path.is_some() {
            bail!("Config file not found: {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        Config::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(name) = lookup(TARGET_NAME_ENV).filter(|v| !v.is_empty()) {
        config.discovery.target_name = name;
    }
    if let Some(event) = lookup(EVENT_NAME_ENV).filter(|v| !v.is_empty()) {
        config.game.event_name = event;
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.discovery.target_name.trim().is_empty() {
        bail!("discovery.target_name must not be empty");
    }
    if config.discovery.interval_ms == 0 {
        bail!("discovery.interval_ms must be greater than zero");
    }
    if config.discovery.resolve_timeout_ms == 0 {
        bail!("discovery.resolve_timeout_ms must be greater than zero");
    }
    if config.push.connect_timeout_secs == 0 || config.push.timeout_secs == 0 {
        bail!("push timeouts must be greater than zero");
    }
    Ok(())
}
