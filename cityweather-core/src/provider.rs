use crate::{
    Config,
    error::{Result, WeatherError},
    model::{Coordinates, WeatherSnapshot},
    provider::openweather::OpenWeatherFetcher,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// The two upstream calls behind one display cycle.
///
/// Both are single-shot: no retries, errors are returned as produced.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    /// Resolve a place name to coordinates. The first match wins.
    async fn resolve_city(&self, city: &str) -> Result<Coordinates>;

    /// Fetch current and forecast weather for a coordinate, metric units.
    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot>;
}

/// Construct the OpenWeather fetcher from config.
pub fn fetcher_from_config(config: &Config) -> Result<Arc<dyn WeatherFetcher>> {
    let api_key = config
        .api_key()
        .map_err(|e| WeatherError::Config(e.to_string()))?;

    let fetcher = OpenWeatherFetcher::new(api_key.to_owned(), config.endpoints.clone())?;
    Ok(Arc::new(fetcher))
}
