use std::{future::Future, sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use crate::{
    config::{DEFAULT_TIMEOUT_SECS, ForecastPolicy, ResolverConfig},
    error::{ProviderError, ResolutionError},
    model::{LocationImage, LocationQuery, Resolution},
    provider::{ImageProvider, OpenWeatherProvider, UnsplashProvider, WeatherProvider},
};

/// Turns a [`LocationQuery`] into conditions, forecast and a photo.
#[derive(Debug, Clone)]
pub struct QueryResolver {
    weather: Arc<dyn WeatherProvider>,
    images: Arc<dyn ImageProvider>,
    forecast: bool,
    forecast_policy: ForecastPolicy,
    timeout: Duration,
}

impl QueryResolver {
    pub fn new(weather: Arc<dyn WeatherProvider>, images: Arc<dyn ImageProvider>) -> Self {
        Self {
            weather,
            images,
            forecast: true,
            forecast_policy: ForecastPolicy::Lenient,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Construct the OpenWeather + Unsplash resolver from explicit settings.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let weather =
            OpenWeatherProvider::new(config.weather_api_key.clone(), config.unit_system);
        let images = UnsplashProvider::new(config.image_api_key.clone());

        Self::new(Arc::new(weather), Arc::new(images))
            .with_forecast(config.forecast)
            .with_forecast_policy(config.forecast_policy)
            .with_timeout(config.timeout)
    }

    pub fn with_forecast(mut self, enabled: bool) -> Self {
        self.forecast = enabled;
        self
    }

    pub fn with_forecast_policy(mut self, policy: ForecastPolicy) -> Self {
        self.forecast_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn resolve(&self, query: &LocationQuery) -> Result<Resolution, ResolutionError> {
        let query = query.validate()?;
        let label = query.to_string();

        let current = bounded(self.timeout, "weather provider", self.weather.current(&query));

        let (current, forecast) = if self.forecast {
            let forecast =
                bounded(self.timeout, "weather provider", self.weather.forecast(&query));
            let (current, forecast) = tokio::join!(current, forecast);
            (current, Some(forecast))
        } else {
            (current.await, None)
        };

        let conditions = current.map_err(|err| {
            debug!(query = %label, error = %err, "current conditions lookup failed");
            err.into_resolution_error(&label)
        })?;

        let forecast = match forecast {
            None => None,
            Some(Ok(series)) => Some(series),
            Some(Err(err)) => match self.forecast_policy {
                ForecastPolicy::Lenient => {
                    warn!(query = %label, error = %err, "forecast lookup failed, continuing without forecast");
                    None
                }
                ForecastPolicy::Strict => return Err(err.into_resolution_error(&label)),
            },
        };

        let image = self.lookup_image(&conditions.location_name).await;

        info!(
            query = %label,
            location = %conditions.location_name,
            forecast_days = forecast.as_ref().map_or(0, |f| f.daily.len()),
            image = image.is_some(),
            "resolved query"
        );

        Ok(Resolution {
            conditions,
            forecast,
            image,
        })
    }

    /// Best effort: any failure degrades to no image.
    async fn lookup_image(&self, location_name: &str) -> Option<LocationImage> {
        if location_name.trim().is_empty() {
            debug!("resolved location has no name, skipping photo search");
            return None;
        }

        match bounded(self.timeout, "image provider", self.images.search(location_name)).await {
            Ok(Some(image)) => Some(image),
            Ok(None) => {
                debug!(location = location_name, "no photo found");
                None
            }
            Err(err) => {
                warn!(location = location_name, error = %err, "photo lookup failed, continuing without image");
                None
            }
        }
    }
}

async fn bounded<T, F>(timeout: Duration, provider: &'static str, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or_else(|_| {
            Err(ProviderError::Timeout {
                provider,
                timeout,
            })
        })
}
