use crate::{
    error::ProviderError,
    model::{CurrentConditions, ForecastSeries, LocationImage, LocationQuery},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod openweather;
pub mod unsplash;

pub use openweather::OpenWeatherProvider;
pub use unsplash::UnsplashProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    Unsplash,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::Unsplash => "unsplash",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::Unsplash]
    }

    /// Environment variable that overrides the stored API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "CITYCAST_WEATHER_API_KEY",
            ProviderId::Unsplash => "CITYCAST_IMAGE_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "unsplash" => Ok(ProviderId::Unsplash),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, unsplash."
            )),
        }
    }
}

/// Source of current conditions and the 3-hour forecast.
///
/// Implementations must derive the location parameters of both calls from the
/// same query so that both answers describe the same place.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &LocationQuery) -> Result<CurrentConditions, ProviderError>;

    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSeries, ProviderError>;
}

/// Photo search keyed by free text.
#[async_trait]
pub trait ImageProvider: Send + Sync + Debug {
    /// `Ok(None)` when the search succeeded but found nothing.
    async fn search(&self, text: &str) -> Result<Option<LocationImage>, ProviderError>;
}
