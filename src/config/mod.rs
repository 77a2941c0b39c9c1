mod types;

pub use types::*;

use anyhow::{Context, Result};
use reqwest::Url;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./trimline.toml", "~/.config/trimline/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_url("render_url", &config.services.render_url)?;
    validate_url("suggest_url", &config.services.suggest_url)?;

    if config.services.timeout_secs == 0 {
        anyhow::bail!("Service timeout cannot be 0");
    }

    if config.playback.frame_rate_hz == 0 {
        anyhow::bail!("Frame rate cannot be 0");
    }

    if config.playback.notify_interval_ms == 0 {
        anyhow::bail!("Notification interval cannot be 0");
    }

    let interval = config.analysis.sprite_interval_sec;
    if !(interval.is_finite() && interval > 0.0) {
        anyhow::bail!("Sprite interval must be positive, got {}", interval);
    }

    Ok(())
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("Service URL '{}' is empty", name);
    }
    let url = Url::parse(value).with_context(|| format!("Invalid service URL '{}': {}", name, value))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Service URL '{}' must use http or https: {}", name, value);
    }
    Ok(())
}
