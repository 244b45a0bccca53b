use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::model::DEFAULT_VOLUME_PERCENT;

pub const DEFAULT_CONFIG_FILE: &str = "tunestream.toml";
pub const API_URL_ENV_VAR: &str = "TUNESTREAM_API_URL";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// Transport timeout; none by default
    pub request_timeout_secs: Option<u64>,
    pub log_dir: PathBuf,
    pub default_volume: u8,
    /// Length of one simulated playback second
    pub tick_interval_ms: u64,
    pub token_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: None,
            log_dir: PathBuf::from(".logs"),
            default_volume: DEFAULT_VOLUME_PERCENT,
            tick_interval_ms: 1000,
            token_file: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from `tunestream.toml` when present, or defaults.
    /// `TUNESTREAM_API_URL` overrides the file.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Config::default(),
        };

        if let Ok(url) = std::env::var(API_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                config.api_base_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(contents).context("Failed to parse config TOML")?;
        anyhow::ensure!(config.tick_interval_ms > 0, "tick_interval_ms must be positive");
        anyhow::ensure!(
            config.default_volume <= 100,
            "default_volume must be between 0 and 100"
        );
        Ok(config)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
