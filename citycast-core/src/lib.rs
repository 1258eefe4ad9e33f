//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather and photo provider abstractions with HTTP implementations
//! - The query resolver that fans out to the providers and reconciles their answers
//! - The view state machine and the session driving it
//!
//! It is used by `citycast-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod forecast;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod session;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::{Config, ForecastPolicy, ProviderConfig, ResolverConfig, UnitSystem};
pub use error::{ProviderError, ResolutionError};
pub use geolocation::{FixedLocation, GeolocationSource, NoGeolocation};
pub use model::{
    Condition, ConditionCategory, Coordinates, CurrentConditions, DailyForecastSummary,
    ForecastEntry, ForecastSeries, LocationImage, LocationQuery, Resolution,
};
pub use provider::{ImageProvider, ProviderId, WeatherProvider};
pub use resolver::QueryResolver;
pub use session::Session;
pub use view::{Effect, Generation, LoadedView, ViewState, ViewStateMachine};
