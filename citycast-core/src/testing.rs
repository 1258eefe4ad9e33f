//! Provider stubs shared by the unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::Notify,
};

use crate::{
    error::ProviderError,
    model::{CurrentConditions, ForecastSeries, LocationImage, LocationQuery},
    provider::{ImageProvider, WeatherProvider},
};

#[derive(Debug, Clone)]
pub(crate) enum Reply<T> {
    Ok(T),
    NotFound,
    Unreachable,
    Malformed,
    Hang,
    Panic,
}

impl<T: Clone> Reply<T> {
    async fn produce(&self) -> Result<T, ProviderError> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::NotFound => Err(ProviderError::Status {
                provider: "stub",
                status: StatusCode::NOT_FOUND,
                body: r#"{"cod":"404","message":"city not found"}"#.to_string(),
            }),
            Reply::Unreachable => Err(ProviderError::Timeout {
                provider: "stub",
                timeout: Duration::ZERO,
            }),
            Reply::Malformed => Err(ProviderError::Decode {
                provider: "stub",
                source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
            }),
            Reply::Hang => std::future::pending().await,
            Reply::Panic => panic!("stub provider failed hard"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct StubWeather {
    current: Reply<CurrentConditions>,
    forecast: Reply<ForecastSeries>,
    named: HashMap<String, CurrentConditions>,
    gates: HashMap<String, Arc<Notify>>,
    calls: Mutex<Vec<(&'static str, LocationQuery)>>,
}

impl StubWeather {
    /// Forecast defaults to two full days for whatever location the current reply names.
    pub(crate) fn new(current: Reply<CurrentConditions>) -> Self {
        let forecast = match &current {
            Reply::Ok(c) => Reply::Ok(fixtures::forecast(&c.location_name, 2, 8)),
            _ => Reply::NotFound,
        };
        Self {
            current,
            forecast,
            named: HashMap::new(),
            gates: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_forecast(mut self, forecast: Reply<ForecastSeries>) -> Self {
        self.forecast = forecast;
        self
    }

    /// Answer place queries for `place` with conditions named `place`.
    pub(crate) fn with_place(mut self, place: &str) -> Self {
        self.named
            .insert(place.to_string(), fixtures::conditions(place));
        self
    }

    /// Hold current-conditions replies for `place` until the returned handle is notified.
    pub(crate) fn gate(&mut self, place: &str) -> Arc<Notify> {
        self.gates
            .entry(place.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    pub(crate) fn calls(&self) -> Vec<(&'static str, LocationQuery)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn current(&self, query: &LocationQuery) -> Result<CurrentConditions, ProviderError> {
        self.calls.lock().unwrap().push(("current", query.clone()));

        if let LocationQuery::Place(name) = query {
            if let Some(gate) = self.gates.get(name) {
                gate.notified().await;
            }
            if let Some(conditions) = self.named.get(name) {
                return Ok(conditions.clone());
            }
        }
        self.current.produce().await
    }

    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSeries, ProviderError> {
        self.calls.lock().unwrap().push(("forecast", query.clone()));
        self.forecast.produce().await
    }
}

#[derive(Debug)]
pub(crate) struct StubImages {
    reply: Reply<Option<LocationImage>>,
    searches: Mutex<Vec<String>>,
}

impl StubImages {
    pub(crate) fn new(reply: Reply<Option<LocationImage>>) -> Self {
        Self {
            reply,
            searches: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for StubImages {
    async fn search(&self, text: &str) -> Result<Option<LocationImage>, ProviderError> {
        self.searches.lock().unwrap().push(text.to_string());
        self.reply.produce().await
    }
}

type Route = dyn Fn(&str) -> (u16, String) + Send + Sync;

/// Loopback HTTP server that answers every request through `route` (given the
/// request path) and records each request target.
pub(crate) struct RecordingServer {
    pub(crate) base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl RecordingServer {
    pub(crate) async fn start<F>(route: F) -> Self
    where
        F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let route: Arc<Route> = Arc::new(route);

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let seen = seen.clone();
                let route = route.clone();
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => head.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let head = String::from_utf8_lossy(&head);
                    let target = head
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or("/")
                        .to_string();
                    let path = target.split('?').next().unwrap_or("/").to_string();
                    seen.lock().unwrap().push(target);

                    let (status, body) = route(&path);
                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Path and decoded query pairs of a recorded request target.
pub(crate) fn split_target(target: &str) -> (String, Vec<(String, String)>) {
    let url = Url::parse(&format!("http://stub{target}")).unwrap();
    let pairs = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    (url.path().to_string(), pairs)
}

pub(crate) mod fixtures {
    use chrono::{Duration, TimeZone, Utc};

    use crate::model::{
        Condition, ConditionCategory, CurrentConditions, ForecastEntry, ForecastSeries,
        LocationImage,
    };

    pub(crate) fn conditions(name: &str) -> CurrentConditions {
        CurrentConditions {
            location_name: name.to_string(),
            temperature_c: 12.34,
            feels_like_c: 10.5,
            humidity_pct: 81,
            wind_speed_mps: 4.6,
            cloudiness_pct: 40,
            sunrise: 1717211417,
            sunset: 1717270859,
            observed_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            condition: Condition {
                category: ConditionCategory::Clouds,
                icon: "03d".to_string(),
                description: "scattered clouds".to_string(),
            },
        }
    }

    /// `days` UTC days of `per_day` entries spaced three hours apart.
    pub(crate) fn forecast(name: &str, days: usize, per_day: usize) -> ForecastSeries {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let entries = (0..days)
            .flat_map(|day| {
                (0..per_day).map(move |slot| {
                    let i = day * per_day + slot;
                    ForecastEntry {
                        timestamp: start
                            + Duration::days(day as i64)
                            + Duration::hours(3 * slot as i64),
                        temp_min_c: 5.0 + i as f64,
                        temp_max_c: 15.0 + i as f64,
                        condition: Condition {
                            category: ConditionCategory::Rain,
                            icon: format!("{i:02}d"),
                            description: "light rain".to_string(),
                        },
                    }
                })
            })
            .collect();
        ForecastSeries::new(name.to_string(), entries)
    }

    pub(crate) fn image() -> LocationImage {
        LocationImage {
            url: "https://images.unsplash.com/photo-1".to_string(),
        }
    }
}
