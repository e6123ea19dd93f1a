use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_CITY: &str = "Baja";
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 300_000;

/// Upstream URLs. Overridable so tests can aim the fetcher at a local server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    #[serde(default = "default_onecall_url")]
    pub onecall_url: String,

    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,
}

fn default_geocoding_url() -> String {
    "https://api.openweathermap.org/geo/1.0/direct".to_string()
}

fn default_onecall_url() -> String {
    "https://api.openweathermap.org/data/3.0/onecall".to_string()
}

fn default_icon_base_url() -> String {
    "https://openweathermap.org/img/wn".to_string()
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

const fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            onecall_url: default_onecall_url(),
            icon_base_url: default_icon_base_url(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "London"
/// refresh_interval_ms = 300000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// City shown on startup, before anything is submitted.
    #[serde(default = "default_city")]
    pub default_city: String,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: default_city(),
            refresh_interval_ms: default_refresh_interval_ms(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// The configured API key, rejecting a missing or blank one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `cityweather configure` or pass --api-key."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Replace the default city; blank input leaves it unchanged.
    pub fn set_default_city(&mut self, city: &str) {
        let city = city.trim();
        if !city.is_empty() {
            self.default_city = city.to_string();
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if cfg.refresh_interval_ms == 0 {
            return Err(anyhow!(
                "refresh_interval_ms must be greater than zero in {}",
                path.display()
            ));
        }

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
