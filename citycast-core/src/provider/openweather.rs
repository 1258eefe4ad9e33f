use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::UnitSystem,
    error::{ProviderError, truncate_body},
    model::{
        Condition, ConditionCategory, CurrentConditions, ForecastEntry, ForecastSeries,
        LocationQuery,
    },
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const PROVIDER: &str = "OpenWeather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    units: UnitSystem,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, units: UnitSystem) -> Self {
        Self {
            api_key,
            units,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch(&self, endpoint: &str, query: &LocationQuery) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);

        let mut params = location_params(query);
        params.push(("appid", self.api_key.clone()));
        params.push(("units", self.units.as_str().to_string()));

        debug!(endpoint, %query, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ProviderError::Transport {
            provider: PROVIDER,
            source,
        })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body: truncate_body(&body),
            });
        }

        check_reported_status(&body)?;

        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &LocationQuery) -> Result<CurrentConditions, ProviderError> {
        let body = self.fetch("weather", query).await?;
        parse_current(&body)
    }

    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSeries, ProviderError> {
        let body = self.fetch("forecast", query).await?;
        parse_forecast(&body)
    }
}

/// Location part of the query string, shared by every endpoint.
pub(crate) fn location_params(query: &LocationQuery) -> Vec<(&'static str, String)> {
    match query {
        LocationQuery::Place(name) => vec![("q", name.clone())],
        LocationQuery::Coordinates(c) => {
            vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())]
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwStatus {
    cod: Option<serde_json::Value>,
    message: Option<serde_json::Value>,
}

/// OpenWeather sometimes reports errors in the body with a `cod` field.
fn check_reported_status(body: &str) -> Result<(), ProviderError> {
    let Ok(status) = serde_json::from_str::<OwStatus>(body) else {
        return Ok(());
    };

    let code = match status.cod {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.parse::<u64>().ok(),
        _ => None,
    };

    match code {
        Some(code) if code != 200 => Err(ProviderError::Status {
            provider: PROVIDER,
            status: u16::try_from(code)
                .ok()
                .and_then(|c| StatusCode::from_u16(c).ok())
                .unwrap_or(StatusCode::NOT_FOUND),
            body: status
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| truncate_body(body)),
        }),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn condition(weather: &[OwWeather]) -> Condition {
    weather
        .first()
        .map(|w| Condition {
            category: ConditionCategory::from_provider(&w.main),
            icon: w.icon.clone(),
            description: w.description.clone(),
        })
        .unwrap_or_else(Condition::unknown)
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|source| ProviderError::Decode {
        provider: PROVIDER,
        source,
    })
}

pub(crate) fn parse_current(body: &str) -> Result<CurrentConditions, ProviderError> {
    let parsed: OwCurrentResponse = decode(body)?;

    Ok(CurrentConditions {
        condition: condition(&parsed.weather),
        location_name: parsed.name,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        wind_speed_mps: parsed.wind.speed,
        cloudiness_pct: parsed.clouds.all,
        sunrise: parsed.sys.sunrise,
        sunset: parsed.sys.sunset,
        observed_at: unix_to_utc(parsed.dt).unwrap_or_else(Utc::now),
    })
}

pub(crate) fn parse_forecast(body: &str) -> Result<ForecastSeries, ProviderError> {
    let parsed: OwForecastResponse = decode(body)?;

    let mut entries: Vec<ForecastEntry> = parsed
        .list
        .iter()
        .filter_map(|e| {
            let timestamp = unix_to_utc(e.dt)?;
            Some(ForecastEntry {
                timestamp,
                temp_min_c: e.main.temp_min.unwrap_or(e.main.temp),
                temp_max_c: e.main.temp_max.unwrap_or(e.main.temp),
                condition: condition(&e.weather),
            })
        })
        .collect();
    entries.sort_by_key(|e| e.timestamp);

    Ok(ForecastSeries::new(parsed.city.name, entries))
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}
