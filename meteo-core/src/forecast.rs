//! Forecast fetching and normalization: aligns hourly metrics to the
//! current-conditions timestamp and reshapes the daily block into one
//! record per day.

use std::sync::Arc;

use chrono::Utc;

use crate::cache::TtlCache;
use crate::error::Result;
use crate::model::{CurrentConditions, DailyForecastEntry, ResolvedLocation, WeatherSnapshot};
use crate::provider::{ForecastApi, RawForecast};

/// Fetches and normalizes weather for resolved locations.
#[derive(Debug)]
pub struct ForecastService {
    api: Arc<dyn ForecastApi>,
    cache: TtlCache<WeatherSnapshot>,
}

impl ForecastService {
    pub fn new(api: Arc<dyn ForecastApi>, ttl_secs: u64) -> Self {
        Self {
            api,
            cache: TtlCache::new(ttl_secs),
        }
    }

    /// Return the normalized snapshot for `location`, consulting the
    /// coordinate-keyed cache first.
    pub async fn fetch(&self, location: &ResolvedLocation) -> Result<WeatherSnapshot> {
        // Coordinates exactly as resolved, no rounding.
        let key = format!("{},{}", location.latitude, location.longitude);

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(%key, "forecast cache hit");
            return Ok(hit);
        }

        let raw = self
            .api
            .forecast(location.latitude, location.longitude)
            .await?;

        let snapshot = normalize(raw, &location.timezone);
        self.cache.set(&key, snapshot.clone());
        Ok(snapshot)
    }
}

/// Reshape a raw upstream payload into a [`WeatherSnapshot`]. Missing
/// sub-sections become null fields; this function cannot fail.
fn normalize(raw: RawForecast, location_timezone: &str) -> WeatherSnapshot {
    let mut current = CurrentConditions::default();

    if let Some(cw) = &raw.current_weather {
        current.temperature = cw.temperature;
        current.windspeed = cw.windspeed;
        current.winddirection = cw.winddirection;
        current.weathercode = cw.weathercode;
        current.time = cw.time.clone();

        if let Some(hourly) = &raw.hourly {
            // Align on the exact observation timestamp; index 0 when the
            // hourly block does not carry it.
            let idx = cw
                .time
                .as_ref()
                .and_then(|t| hourly.time.iter().position(|h| h == t))
                .unwrap_or(0);

            current.apparent_temperature = metric_at(&hourly.apparent_temperature, idx);
            current.humidity = metric_at(&hourly.relativehumidity_2m, idx);
            current.precipitation = metric_at(&hourly.precipitation, idx);
        }
    }

    let daily = raw
        .daily
        .as_ref()
        .map(|d| {
            d.time
                .iter()
                .enumerate()
                .map(|(i, date)| DailyForecastEntry {
                    date: date.clone(),
                    temp_max: metric_at(&d.temperature_2m_max, i),
                    temp_min: metric_at(&d.temperature_2m_min, i),
                    precipitation_sum: metric_at(&d.precipitation_sum, i),
                    weathercode: metric_at(&d.weathercode, i),
                    sunrise: metric_at(&d.sunrise, i),
                    sunset: metric_at(&d.sunset, i),
                })
                .collect()
        })
        .unwrap_or_default();

    WeatherSnapshot {
        fetched_at: Utc::now(),
        timezone: raw
            .timezone
            .unwrap_or_else(|| location_timezone.to_string()),
        current,
        daily,
    }
}

/// Value at `idx` of an optional parallel metric sequence; `None` when the
/// sequence is missing, too short, or holds a null at that index.
fn metric_at<T: Clone>(seq: &Option<Vec<Option<T>>>, idx: usize) -> Option<T> {
    seq.as_ref().and_then(|v| v.get(idx).cloned().flatten())
}
