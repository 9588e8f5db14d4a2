use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use meteo_core::{
    Config, Error, ForecastService, LocationResolver, OpenMeteoClient, ResolvedLocation,
    WeatherSnapshot,
};

const MAX_QUERY_LEN: usize = 80;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather for a place name")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather and the 5-day forecast for a place.
    Show {
        /// Place name, e.g. "Pune" or "San Francisco".
        place: String,

        /// Print the raw normalized snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file and print its location.
    InitConfig,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Show { place, json } => show(&place, json).await,
            Command::InitConfig => {
                let config = Config::default();
                config.save()?;
                println!("Wrote {}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn show(place: &str, json: bool) -> anyhow::Result<()> {
    let place = place.trim();
    if place.is_empty() {
        bail!("A place name is required.");
    }
    if place.len() > MAX_QUERY_LEN {
        bail!("Place query too long (max {MAX_QUERY_LEN} characters).");
    }

    let config = Config::load()?;
    let client = match &config.endpoints {
        Some(e) => OpenMeteoClient::with_endpoints(e.geocode.clone(), e.forecast.clone()),
        None => OpenMeteoClient::new(),
    };

    let resolver = LocationResolver::new(Arc::new(client.clone()), config.cache_ttl_secs);
    let forecasts = ForecastService::new(Arc::new(client), config.cache_ttl_secs);

    let location = match resolver.resolve(place).await {
        Ok(location) => location,
        Err(Error::NotFound) => bail!("No results for '{place}'. Try a different spelling."),
        Err(err) => {
            // Upstream detail goes to the log, never to the user.
            tracing::error!(%err, "geocoding failed");
            bail!("Weather service unavailable. Try again later.");
        }
    };

    let snapshot = match forecasts.fetch(&location).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::error!(%err, "forecast fetch failed");
            bail!("Weather service unavailable. Try again later.");
        }
    };

    if json {
        let combined = serde_json::json!({
            "location": location,
            "weather": snapshot,
        });
        println!("{}", serde_json::to_string_pretty(&combined)?);
    } else {
        print_report(&location, &snapshot);
    }

    Ok(())
}

fn print_report(location: &ResolvedLocation, snapshot: &WeatherSnapshot) {
    let region = location
        .admin1
        .as_deref()
        .map(|a| format!(", {a}"))
        .unwrap_or_default();
    let country = location.country.as_deref().unwrap_or("?");
    println!(
        "{}{region} — {country} ({:.2}, {:.2})",
        location.name, location.latitude, location.longitude
    );

    let c = &snapshot.current;
    let mut line = String::new();
    if let Some(code) = c.weathercode {
        line.push_str(weathercode_label(code));
    }
    if let Some(t) = c.temperature {
        if !line.is_empty() {
            line.push_str(", ");
        }
        line.push_str(&format!("{t:.0}°C"));
    }
    if let Some(feels) = c.apparent_temperature {
        line.push_str(&format!(" (feels like {feels:.0}°C)"));
    }
    if !line.is_empty() {
        println!("{line}");
    }

    let mut meta = Vec::new();
    if let Some(h) = c.humidity {
        meta.push(format!("humidity {h:.0}%"));
    }
    if let Some(w) = c.windspeed {
        meta.push(format!("wind {w} km/h"));
    }
    if let Some(p) = c.precipitation {
        meta.push(format!("precip {p} mm"));
    }
    if !meta.is_empty() {
        println!("{}", meta.join("  "));
    }
    if let Some(time) = &c.time {
        println!("Local time {time} ({})", snapshot.timezone);
    }
    println!(
        "Fetched at {}",
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if !snapshot.daily.is_empty() {
        println!();
        println!("{}-day forecast:", snapshot.daily.len());
        for day in &snapshot.daily {
            let label = day.weathercode.map(weathercode_label).unwrap_or("-");
            println!(
                "  {}  {}..{}  rain {}  {}",
                day.date,
                fmt_temp(day.temp_min),
                fmt_temp(day.temp_max),
                day.precipitation_sum
                    .map(|p| format!("{p} mm"))
                    .unwrap_or_else(|| "-".to_string()),
                label,
            );
        }
    }
}

fn fmt_temp(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.0}°")).unwrap_or_else(|| "-".to_string())
}

/// Human-readable label for a WMO weather code.
fn weathercode_label(code: i32) -> &'static str {
    match code {
        0 => "Clear",
        1..=3 => "Partly cloudy",
        45 | 48 => "Fog",
        51..=57 => "Drizzle",
        61..=67 => "Rain",
        71..=77 => "Snow",
        80..=82 => "Showers",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Cloudy",
    }
}
