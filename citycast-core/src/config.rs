use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::{model::Coordinates, provider::ProviderId};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Unit system requested from the weather provider. Only metric is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
        }
    }
}

/// What to do when current conditions resolve but the forecast lookup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastPolicy {
    /// Show current conditions without a forecast.
    #[default]
    Lenient,
    /// Fail the whole lookup.
    Strict,
}

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub units: UnitSystem,

    /// Fetch the 5-day forecast alongside current conditions.
    pub forecast: bool,

    pub forecast_policy: ForecastPolicy,

    /// Per-call limit for every external request.
    pub timeout_secs: u64,

    /// Position used in place of device geolocation.
    pub home: Option<Coordinates>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: UnitSystem::default(),
            forecast: true,
            forecast_policy: ForecastPolicy::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            home: None,
            providers: HashMap::new(),
        }
    }
}

/// Everything the resolver needs, passed in explicitly at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    pub weather_api_key: String,
    pub image_api_key: String,
    pub unit_system: UnitSystem,
    pub forecast: bool,
    pub forecast_policy: ForecastPolicy,
    pub timeout: Duration,
}

impl ResolverConfig {
    pub fn new(weather_api_key: impl Into<String>, image_api_key: impl Into<String>) -> Self {
        Self {
            weather_api_key: weather_api_key.into(),
            image_api_key: image_api_key.into(),
            unit_system: UnitSystem::Metric,
            forecast: true,
            forecast_policy: ForecastPolicy::Lenient,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
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
        let dirs = ProjectDirs::from("dev", "citycast", "citycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    /// Returns the stored API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    fn api_key_with<F>(&self, provider_id: ProviderId, env: &F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        env(provider_id.env_var())
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.provider_api_key(provider_id).map(str::to_owned))
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured for provider '{provider_id}'.\n\
                     Hint: run `citycast configure {provider_id}` or set {}.",
                    provider_id.env_var()
                )
            })
    }

    /// Build the resolver settings, letting environment variables override stored keys.
    pub fn resolver_config(&self) -> Result<ResolverConfig> {
        self.resolver_config_with(|name| std::env::var(name).ok())
    }

    pub fn resolver_config_with<F>(&self, env: F) -> Result<ResolverConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(ResolverConfig {
            weather_api_key: self.api_key_with(ProviderId::OpenWeather, &env)?,
            image_api_key: self.api_key_with(ProviderId::Unsplash, &env)?,
            unit_system: self.units,
            forecast: self.forecast,
            forecast_policy: self.forecast_policy,
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn resolver_config_errors_when_keys_missing() {
        let cfg = Config::default();
        let err = cfg.resolver_config_with(no_env).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured for provider 'openweather'"));
        assert!(msg.contains("Hint: run `citycast configure openweather`"));
    }

    #[test]
    fn resolver_config_uses_stored_keys_and_defaults() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());
        cfg.upsert_provider_api_key(ProviderId::Unsplash, "PHOTO_KEY".into());

        let rc = cfg.resolver_config_with(no_env).expect("both keys configured");

        assert_eq!(rc.weather_api_key, "OPEN_KEY");
        assert_eq!(rc.image_api_key, "PHOTO_KEY");
        assert_eq!(rc.unit_system, UnitSystem::Metric);
        assert_eq!(rc.forecast_policy, ForecastPolicy::Lenient);
        assert_eq!(rc.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(rc.forecast);
    }

    #[test]
    fn environment_overrides_stored_key() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());

        let rc = cfg
            .resolver_config_with(|name| match name {
                "CITYCAST_WEATHER_API_KEY" => Some("ENV_OPEN".into()),
                "CITYCAST_IMAGE_API_KEY" => Some("ENV_PHOTO".into()),
                _ => None,
            })
            .unwrap();

        assert_eq!(rc.weather_api_key, "ENV_OPEN");
        assert_eq!(rc.image_api_key, "ENV_PHOTO");
    }

    #[test]
    fn upsert_replaces_existing_key() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::Unsplash, "OLD".into());
        cfg.upsert_provider_api_key(ProviderId::Unsplash, "NEW".into());

        assert_eq!(cfg.provider_api_key(ProviderId::Unsplash), Some("NEW"));
        assert!(cfg.is_provider_configured(ProviderId::Unsplash));
        assert!(!cfg.is_provider_configured(ProviderId::OpenWeather));
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            forecast_policy = "strict"

            [home]
            lat = 48.85
            lon = 2.35

            [providers.openweather]
            api_key = "abc"
            "#,
        )
        .unwrap();

        assert!(cfg.forecast);
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.forecast_policy, ForecastPolicy::Strict);
        assert_eq!(cfg.home, Some(Coordinates { lat: 48.85, lon: 2.35 }));
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("abc"));
    }
}
