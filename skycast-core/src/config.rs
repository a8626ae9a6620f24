use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    model::Coordinates, provider::openweather::DEFAULT_BASE_URL, units::TemperatureUnit,
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fixed position used instead of device geolocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl HomeLocation {
    pub fn coordinates(&self) -> Result<Coordinates> {
        Coordinates::new(self.latitude, self.longitude)
            .context("Invalid [home] coordinates in config file")
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// unit = "fahrenheit"
///
/// [home]
/// latitude = 52.37
/// longitude = 4.89
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Override for the weather service root, mostly for testing.
    pub base_url: Option<String>,

    pub timeout_secs: Option<u64>,

    pub unit: Option<TemperatureUnit>,

    pub home: Option<HomeLocation>,
}

impl Config {
    /// Load config from disk (or defaults if absent) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_from_disk()?;
        cfg.apply_env_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_from_disk() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// A non-empty value from the environment wins over the stored key.
    pub fn apply_env_api_key(&mut self, value: Option<String>) {
        if let Some(key) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1))
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit.unwrap_or_default()
    }

    pub fn home_coordinates(&self) -> Result<Option<Coordinates>> {
        self.home.as_ref().map(HomeLocation::coordinates).transpose()
    }
}
