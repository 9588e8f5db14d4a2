//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - A generic TTL cache with lazy eviction
//! - Place-name resolution against a geocoding upstream
//! - Forecast fetching and normalization into a uniform snapshot
//! - Configuration and the typed error taxonomy
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod model;
pub mod provider;

pub use cache::TtlCache;
pub use config::Config;
pub use error::Error;
pub use forecast::ForecastService;
pub use geocode::LocationResolver;
pub use model::{CurrentConditions, DailyForecastEntry, ResolvedLocation, WeatherSnapshot};
pub use provider::open_meteo::OpenMeteoClient;
pub use provider::{ForecastApi, GeocodeApi};
