//! Upstream data capabilities consumed by the core.
//!
//! The resolver and forecast service only see these traits; the concrete
//! Open-Meteo client lives in [`open_meteo`]. Tests substitute in-memory
//! fakes.

use crate::error::Result;
use crate::model::GeoCandidate;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

pub mod open_meteo;

/// Forward geocoding: free-text place name to candidate locations.
#[async_trait]
pub trait GeocodeApi: Send + Sync + Debug {
    /// Returns up to `count` candidates for `name`. An empty vector means
    /// the upstream found nothing (also used when the payload carried no
    /// results field at all).
    async fn search(&self, name: &str, count: u8, language: &str) -> Result<Vec<GeoCandidate>>;
}

/// Weather forecast lookup by coordinates, timezone inferred upstream.
#[async_trait]
pub trait ForecastApi: Send + Sync + Debug {
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<RawForecast>;
}

/// Forecast payload as the upstream reports it, before normalization.
/// Sub-sections are all optional; the normalizer degrades missing pieces
/// to null fields rather than rejecting the payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawForecast {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub current_weather: Option<RawCurrentWeather>,
    #[serde(default)]
    pub hourly: Option<RawHourly>,
    #[serde(default)]
    pub daily: Option<RawDaily>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCurrentWeather {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub windspeed: Option<f64>,
    #[serde(default)]
    pub winddirection: Option<f64>,
    #[serde(default)]
    pub weathercode: Option<i32>,
    #[serde(default)]
    pub time: Option<String>,
}

/// Parallel hourly sequences, index-aligned with `time`. Metric values are
/// `Option` so JSON nulls inside an array cannot fail deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawHourly {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub apparent_temperature: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub relativehumidity_2m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub precipitation: Option<Vec<Option<f64>>>,
}

/// Parallel daily sequences, index-aligned with `time`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDaily {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub temperature_2m_min: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub precipitation_sum: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub weathercode: Option<Vec<Option<i32>>>,
    #[serde(default)]
    pub sunrise: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub sunset: Option<Vec<Option<String>>>,
}
