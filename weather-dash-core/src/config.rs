use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    geo::GeoPoint,
    model::{TemperatureUnit, Theme},
};

/// Value shipped in templates before a real key is entered.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// Upstream base URLs. Overridable so tests can point at a mock server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Current-conditions and 5 day / 3 hour forecast API.
    pub weather_base: String,
    pub onecall_base: String,
    pub geocoding_base: String,
    pub ip_primary: String,
    pub ip_backup: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather_base: "https://api.openweathermap.org/data/2.5".to_string(),
            onecall_base: "https://api.openweathermap.org/data/3.0".to_string(),
            geocoding_base: "https://api.openweathermap.org/geo/1.0".to_string(),
            ip_primary: "http://ip-api.com/json".to_string(),
            ip_backup: "https://ipapi.co/json".to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint rooted at `base`, using the same paths as the real services.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            weather_base: format!("{base}/data/2.5"),
            onecall_base: format!("{base}/data/3.0"),
            geocoding_base: format!("{base}/geo/1.0"),
            ip_primary: format!("{base}/ip-api/json"),
            ip_backup: format!("{base}/ipapi/json"),
        }
    }
}

/// A fixed device position, standing in for a GPS receiver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "DeviceConfig::default_accuracy")]
    pub accuracy_m: f64,
}

impl DeviceConfig {
    fn default_accuracy() -> f64 {
        50.0
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// unit = "celsius"
/// theme = "dark"
///
/// [device]
/// latitude = 35.7
/// longitude = 51.4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap API key.
    pub api_key: Option<String>,
    pub unit: TemperatureUnit,
    pub theme: Theme,
    pub endpoints: Endpoints,
    pub device: Option<DeviceConfig>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
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
        let dirs = ProjectDirs::from("dev", "weather-dash", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The API key, unless it is missing, blank, or still the placeholder.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
    }

    pub fn is_api_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Flip the theme and return the new value.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }
}
