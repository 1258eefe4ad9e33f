use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// What the user asked for: a place name or a position.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Place(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    pub fn place(name: impl Into<String>) -> Self {
        LocationQuery::Place(name.into())
    }

    pub fn coordinates(lat: f64, lon: f64) -> Self {
        LocationQuery::Coordinates(Coordinates { lat, lon })
    }

    /// Build a query from loosely supplied parts, e.g. command-line flags.
    ///
    /// A place name wins over coordinates. A lone latitude or longitude is rejected.
    pub fn from_parts(
        place: Option<String>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Self, ResolutionError> {
        match (place, lat, lon) {
            (Some(place), _, _) => Ok(LocationQuery::Place(place)),
            (None, Some(lat), Some(lon)) => Ok(LocationQuery::coordinates(lat, lon)),
            (None, Some(_), None) | (None, None, Some(_)) => Err(ResolutionError::InvalidQuery(
                "both latitude and longitude are required".to_string(),
            )),
            (None, None, None) => Err(ResolutionError::InvalidQuery(
                "a place name or coordinates are required".to_string(),
            )),
        }
    }

    /// Normalize the query, failing locally if it cannot be sent to a provider.
    pub fn validate(&self) -> Result<LocationQuery, ResolutionError> {
        match self {
            LocationQuery::Place(name) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(ResolutionError::InvalidQuery(
                        "place name is empty".to_string(),
                    ));
                }
                Ok(LocationQuery::Place(trimmed.to_string()))
            }
            LocationQuery::Coordinates(c) => {
                if !c.lat.is_finite() || !(-90.0..=90.0).contains(&c.lat) {
                    return Err(ResolutionError::InvalidQuery(format!(
                        "latitude {} is out of range",
                        c.lat
                    )));
                }
                if !c.lon.is_finite() || !(-180.0..=180.0).contains(&c.lon) {
                    return Err(ResolutionError::InvalidQuery(format!(
                        "longitude {} is out of range",
                        c.lon
                    )));
                }
                Ok(self.clone())
            }
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Place(name) => f.write_str(name),
            LocationQuery::Coordinates(c) => write!(f, "{:.4}, {:.4}", c.lat, c.lon),
        }
    }
}

/// Primary weather group reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionCategory {
    Clear,
    Clouds,
    Rain,
    Thunderstorm,
    Snow,
    Drizzle,
    Mist,
    Other,
}

impl ConditionCategory {
    pub fn from_provider(main: &str) -> Self {
        match main.trim().to_lowercase().as_str() {
            "clear" => ConditionCategory::Clear,
            "clouds" => ConditionCategory::Clouds,
            "rain" => ConditionCategory::Rain,
            "thunderstorm" => ConditionCategory::Thunderstorm,
            "snow" => ConditionCategory::Snow,
            "drizzle" => ConditionCategory::Drizzle,
            "mist" => ConditionCategory::Mist,
            _ => ConditionCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionCategory::Clear => "clear",
            ConditionCategory::Clouds => "clouds",
            ConditionCategory::Rain => "rain",
            ConditionCategory::Thunderstorm => "thunderstorm",
            ConditionCategory::Snow => "snow",
            ConditionCategory::Drizzle => "drizzle",
            ConditionCategory::Mist => "mist",
            ConditionCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition group plus the provider's icon code and description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub category: ConditionCategory,
    pub icon: String,
    pub description: String,
}

impl Condition {
    pub fn unknown() -> Self {
        Self {
            category: ConditionCategory::Other,
            icon: String::new(),
            description: "Unknown".to_string(),
        }
    }

    pub fn icon_url(&self) -> Option<String> {
        if self.icon.is_empty() {
            None
        } else {
            Some(format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub cloudiness_pct: u8,
    pub sunrise: i64,
    pub sunset: i64,
    pub observed_at: DateTime<Utc>,
    pub condition: Condition,
}

impl CurrentConditions {
    pub fn icon_url(&self) -> Option<String> {
        self.condition.icon_url()
    }
}

/// One 3-hour forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub condition: Condition,
}

/// One row of the day-by-day view, see [`crate::forecast::summarize_daily`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastSummary {
    pub date: NaiveDate,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub location_name: String,
    pub entries: Vec<ForecastEntry>,
    pub daily: Vec<DailyForecastSummary>,
}

impl ForecastSeries {
    pub fn new(location_name: String, entries: Vec<ForecastEntry>) -> Self {
        let daily = crate::forecast::summarize_daily(&entries);
        Self {
            location_name,
            entries,
            daily,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationImage {
    pub url: String,
}

/// Everything needed to render one answered query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub conditions: CurrentConditions,
    pub forecast: Option<ForecastSeries>,
    pub image: Option<LocationImage>,
}
