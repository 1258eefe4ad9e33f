use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use citycast_core::{DailyForecastSummary, LoadedView, ViewState};

pub fn render(state: &ViewState) -> String {
    render_in(state, &Local)
}

pub fn render_in<Tz>(state: &ViewState, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match state {
        ViewState::Idle => "Enter a city to look up the weather.".to_string(),
        ViewState::Loading => "Loading...".to_string(),
        ViewState::Error(message) => banner(message),
        ViewState::Loaded(view) => render_loaded(view, tz),
    }
}

/// Inline, non-blocking error line.
pub fn banner(message: &str) -> String {
    format!("⚠  {message}")
}

fn render_loaded<Tz>(view: &LoadedView, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let c = &view.resolution.conditions;
    let mut lines = vec![c.location_name.clone()];

    if let Some(image) = &view.resolution.image {
        lines.push(format!("📷 {}", image.url));
    }
    lines.push(format!(
        "{:.1}°C  {} ({})",
        c.temperature_c, c.condition.description, c.condition.category
    ));
    if let Some(icon) = c.icon_url() {
        lines.push(format!("   {icon}"));
    }
    lines.extend([
        format!("🌡 Feels like: {:.1}°C", c.feels_like_c),
        format!("💧 Humidity:   {}%", c.humidity_pct),
        format!("🌬 Wind speed: {} m/s", c.wind_speed_mps),
        format!("🌅 Sunrise:    {}", clock(c.sunrise, tz)),
        format!("🌇 Sunset:     {}", clock(c.sunset, tz)),
        format!("☁️ Cloudiness: {}%", c.cloudiness_pct),
    ]);

    match &view.resolution.forecast {
        Some(forecast) if view.forecast_visible => {
            lines.push(String::new());
            lines.push("5-day forecast".to_string());
            lines.extend(forecast.daily.iter().map(forecast_row));
        }
        Some(_) => {
            lines.push(String::new());
            lines.push("(:f shows the forecast)".to_string());
        }
        None => {}
    }

    lines.join("\n")
}

fn forecast_row(day: &DailyForecastSummary) -> String {
    format!(
        "{}  {:>5.1}°C / {:>5.1}°C  {}",
        day.date.format("%a %d %b"),
        day.temp_min_c,
        day.temp_max_c,
        day.condition.description
    )
}

fn clock<Tz>(ts: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(tz).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
