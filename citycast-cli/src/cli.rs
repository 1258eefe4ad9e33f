use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use citycast_core::{
    Config, Coordinates, Effect, FixedLocation, GeolocationSource, LocationQuery, NoGeolocation,
    ProviderId, QueryResolver, Session, ViewState,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tracing::{debug, info, warn};

use crate::render::{banner, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Current weather, forecast and a photo for any city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, "openweather" or "unsplash".
        provider: String,
    },

    /// Store the position used when no place is given.
    Home {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Show weather for a place, coordinates, or the configured home.
    Show {
        /// Place name, e.g. "Amsterdam".
        place: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Include the 5-day forecast.
        #[arg(long)]
        forecast: bool,

        /// Print the resolved data as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Look up places one after another; starts at the configured home.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Home { lat, lon } => set_home(lat, lon),
            Command::Show {
                place,
                lat,
                lon,
                forecast,
                json,
            } => show(place, lat, lon, forecast, json).await,
            Command::Interactive => interactive().await,
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    config.upsert_provider_api_key(id, api_key.to_string());
    config.save()?;
    info!(provider = %id, "api key saved");

    println!("Saved API key for {id} to {}", Config::config_file_path()?.display());
    Ok(())
}

fn set_home(lat: f64, lon: f64) -> anyhow::Result<()> {
    LocationQuery::coordinates(lat, lon).validate()?;

    let mut config = Config::load()?;
    config.home = Some(Coordinates { lat, lon });
    config.save()?;
    info!(lat, lon, "home position saved");

    println!("Home set to {lat}, {lon}");
    Ok(())
}

fn open_session(config: &Config) -> anyhow::Result<Session> {
    let resolver = QueryResolver::from_config(&config.resolver_config()?);
    Ok(Session::new(Arc::new(resolver)))
}

fn geolocation(config: &Config) -> Box<dyn GeolocationSource> {
    match config.home {
        Some(home) => Box::new(FixedLocation(home)),
        None => Box::new(NoGeolocation),
    }
}

async fn show(
    place: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    forecast: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut session = open_session(&config)?;

    if place.is_none() && lat.is_none() && lon.is_none() {
        if session.mount(geolocation(&config).as_ref()).await.is_none() {
            debug!("mount found no home position");
            bail!(
                "No location given.\n\
                 Hint: pass a place name, use --lat/--lon, or run `citycast home <lat> <lon>`."
            );
        }
    } else {
        session.submit(LocationQuery::from_parts(place, lat, lon)?);
    }

    session.settle().await;
    if forecast {
        session.toggle_forecast();
    }

    match session.state() {
        ViewState::Error(message) => {
            warn!(%message, "lookup failed");
            bail!("{message}")
        }
        ViewState::Loaded(view) if json => {
            println!("{}", serde_json::to_string_pretty(&view.resolution)?);
        }
        state => println!("{}", render(state)),
    }

    Ok(())
}

async fn interactive() -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut session = open_session(&config)?;

    match session.mount(geolocation(&config).as_ref()).await {
        Some(generation) => {
            debug!(generation, "mounted at home position");
            println!("{}", render(session.state()));
            println!("{}", render(session.settle().await));
        }
        None => {
            debug!("mount found no home position, waiting for input");
            println!("{}", render(session.state()));
        }
    }

    loop {
        let input = Text::new("City:")
            .with_help_message(":f toggles the forecast, :q quits")
            .prompt();

        let input = match input {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };

        match input.trim() {
            ":q" => break,
            ":f" => match session.toggle_forecast() {
                Effect::Render => println!("{}", render(session.state())),
                _ => println!("{}", banner("No forecast to show")),
            },
            _ => {
                let generation = session.submit(LocationQuery::place(input));
                debug!(generation, "lookup submitted");
                println!("{}", render(session.state()));
                println!("{}", render(session.settle().await));
            }
        }
    }

    Ok(())
}
