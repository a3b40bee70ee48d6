use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::convert::Locale;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn wind_suffix(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            )),
        }
    }
}

/// Autocomplete tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Quiet period after the last keystroke before a lookup fires.
    pub debounce_ms: u64,
    /// How long a cached result set stays valid.
    pub ttl_ms: u64,
    /// Maximum number of geocoder candidates.
    pub limit: u8,
}

impl SuggestConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            ttl_ms: 120_000,
            limit: 5,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// lang = "ru"
///
/// [suggest]
/// debounce_ms = 300
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub units: Units,
    pub lang: String,
    pub base_url: String,
    pub suggest: SuggestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: Units::default(),
            lang: "en".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            suggest: SuggestConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    /// The API key from the environment takes precedence over the file.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            cfg.apply_env_api_key(&key);
        }
        Ok(cfg)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
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

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    fn apply_env_api_key(&mut self, key: &str) {
        let key = key.trim();
        if !key.is_empty() {
            self.api_key = Some(key.to_string());
        }
    }

    /// Returns the API key or a hint on how to configure one.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `skycast configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn locale(&self) -> Locale {
        Locale::from_lang(&self.lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("skycast configure"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config {
            api_key: Some("   ".into()),
            ..Config::default()
        };
        assert!(cfg.require_api_key().is_err());
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = Config {
            api_key: Some("FILE_KEY".into()),
            ..Config::default()
        };

        cfg.apply_env_api_key("  ");
        assert_eq!(cfg.require_api_key().unwrap(), "FILE_KEY");

        cfg.apply_env_api_key("ENV_KEY");
        assert_eq!(cfg.require_api_key().unwrap(), "ENV_KEY");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"
            lang = "ru"

            [suggest]
            debounce_ms = 250
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.locale(), Locale::Ru);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.suggest.debounce(), Duration::from_millis(250));
        assert_eq!(cfg.suggest.ttl(), Duration::from_millis(120_000));
        assert_eq!(cfg.suggest.limit, 5);
    }

    #[test]
    fn toml_roundtrip_keeps_units() {
        let cfg = Config {
            units: Units::Imperial,
            ..Config::default()
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn unknown_units_error() {
        let err = Units::try_from("kelvinish").unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
        for units in Units::all() {
            assert_eq!(Units::try_from(units.as_str()).unwrap(), *units);
        }
    }

    #[test]
    fn missing_file_loads_defaults() {
        let cfg = Config::load_from(std::path::Path::new("/nonexistent/skycast/config.toml"))
            .expect("missing file is not an error");
        assert_eq!(cfg, Config::default());
    }
}
