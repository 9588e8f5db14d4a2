use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::GeoCandidate;

use super::{ForecastApi, GeocodeApi, RawForecast};

const GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for both Open-Meteo upstreams (geocoding + forecast).
/// No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    geocode_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::with_endpoints(GEOCODE_URL.to_string(), FORECAST_URL.to_string())
    }

    /// Client pointed at explicit endpoints; used by config overrides and
    /// mock-server tests.
    pub fn with_endpoints(geocode_url: String, forecast_url: String) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            geocode_url,
            forecast_url,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("failed to reach {what}: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("failed to read {what} response body: {e}")))?;

        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "{what} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Malformed(format!("failed to parse {what} JSON: {e}")))
    }
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    /// Absent entirely when the upstream has no matches.
    #[serde(default)]
    results: Option<Vec<GeoCandidate>>,
}

#[async_trait]
impl GeocodeApi for OpenMeteoClient {
    async fn search(&self, name: &str, count: u8, language: &str) -> Result<Vec<GeoCandidate>> {
        let count = count.to_string();
        let query = [
            ("name", name),
            ("count", count.as_str()),
            ("language", language),
            ("format", "json"),
        ];

        tracing::debug!(name, "querying geocoding upstream");
        let parsed: GeocodeResponse = self
            .get_json(&self.geocode_url, &query, "geocoding")
            .await?;

        // Missing results field is the same as an empty list.
        Ok(parsed.results.unwrap_or_default())
    }
}

#[async_trait]
impl ForecastApi for OpenMeteoClient {
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<RawForecast> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let query = [
            ("latitude", lat.as_str()),
            ("longitude", lon.as_str()),
            ("timezone", "auto"),
            ("current_weather", "true"),
            (
                "hourly",
                "apparent_temperature,relativehumidity_2m,precipitation,temperature_2m",
            ),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min,precipitation_sum,weathercode,sunrise,sunset",
            ),
            ("forecast_days", "5"),
        ];

        tracing::debug!(latitude, longitude, "querying forecast upstream");
        self.get_json(&self.forecast_url, &query, "forecast").await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenMeteoClient {
        OpenMeteoClient::with_endpoints(
            format!("{}/v1/search", server.uri()),
            format!("{}/v1/forecast", server.uri()),
        )
    }

    #[tokio::test]
    async fn search_parses_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Pune"))
            .and(query_param("count", "5"))
            .and(query_param("language", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"results":[{"name":"Pune","country":"India","latitude":18.52,"longitude":73.86,"timezone":"Asia/Kolkata","population":2935744,"admin1":"Maharashtra"}]}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let got = client_for(&server).search("Pune", 5, "en").await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "Pune");
        assert_eq!(got[0].population, Some(2_935_744));
        assert_eq!(got[0].timezone.as_deref(), Some("Asia/Kolkata"));
    }

    #[tokio::test]
    async fn search_without_results_field_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"generationtime_ms":0.5}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let got = client_for(&server).search("nowhere", 5, "en").await.unwrap();
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("x", 5, "en").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn unparseable_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("x", 5, "en").await.unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[tokio::test]
    async fn forecast_requests_five_days_with_auto_timezone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("timezone", "auto"))
            .and(query_param("forecast_days", "5"))
            .and(query_param("current_weather", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"timezone":"Asia/Kolkata","current_weather":{"temperature":29.1,"windspeed":8.4,"winddirection":240.0,"weathercode":3,"time":"2026-08-30T14:00"}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let got = client_for(&server).forecast(18.52, 73.86).await.unwrap();
        assert_eq!(got.timezone.as_deref(), Some("Asia/Kolkata"));
        let current = got.current_weather.unwrap();
        assert_eq!(current.temperature, Some(29.1));
        assert_eq!(current.time.as_deref(), Some("2026-08-30T14:00"));
        assert!(got.hourly.is_none());
        assert!(got.daily.is_none());
    }

    #[tokio::test]
    async fn hourly_nulls_inside_arrays_still_parse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"hourly":{"time":["2026-08-30T00:00","2026-08-30T01:00"],"temperature_2m":[21.0,null],"precipitation":[null,0.2]}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let got = client_for(&server).forecast(0.0, 0.0).await.unwrap();
        let hourly = got.hourly.unwrap();
        assert_eq!(hourly.temperature_2m, Some(vec![Some(21.0), None]));
        assert_eq!(hourly.precipitation, Some(vec![None, Some(0.2)]));
    }
}
