use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw location record from the geocoding upstream, before selection.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoCandidate {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub admin1: Option<String>,
}

/// The single best-match location chosen by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone; `"UTC"` when the upstream omitted one.
    pub timezone: String,
    pub population: Option<u64>,
    pub admin1: Option<String>,
}

/// Current conditions as reported by the forecast upstream, merged with the
/// hourly metrics aligned to the observation timestamp. Every field is
/// optional: a missing upstream sub-section degrades to nulls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub winddirection: Option<f64>,
    pub weathercode: Option<i32>,
    /// Upstream local-time string, e.g. "2026-08-30T14:00".
    pub time: Option<String>,
    pub apparent_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
}

/// One day of the reshaped forecast, chronological within the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: String,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub weathercode: Option<i32>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

/// Normalized weather for one location. Built fresh per fetch and replaced
/// wholesale on cache refresh, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub timezone: String,
    pub current: CurrentConditions,
    pub daily: Vec<DailyForecastEntry>,
}
