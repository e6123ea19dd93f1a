use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::Endpoints,
    error::{CITY_NOT_FOUND, INVALID_CITY, Result, UPSTREAM_FAILED, WeatherError},
    model::{Coordinates, WeatherSnapshot},
};

use super::WeatherFetcher;

const USER_AGENT: &str = concat!("cityweather/", env!("CARGO_PKG_VERSION"));
const GEOCODE_LIMIT: &str = "1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OpenWeatherFetcher {
    api_key: String,
    endpoints: Endpoints,
    http: Client,
}

impl OpenWeatherFetcher {
    pub fn new(api_key: String, endpoints: Endpoints) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(WeatherError::Config(
                "OpenWeather API key must not be empty".to_string(),
            ));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            endpoints,
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    lat: f64,
    lon: f64,
}

#[async_trait]
impl WeatherFetcher for OpenWeatherFetcher {
    async fn resolve_city(&self, city: &str) -> Result<Coordinates> {
        debug!(city, "Resolving city via OpenWeather geocoding");

        let res = self
            .http
            .get(&self.endpoints.geocoding_url)
            .query(&[
                ("q", city),
                ("limit", GEOCODE_LIMIT),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let body = success_body(res, "geocoding").await.map_err(|failure| {
            failure.unwrap_or_else(|| WeatherError::InvalidCity(INVALID_CITY.to_string()))
        })?;

        let entries: Vec<OwGeoEntry> = serde_json::from_str(&body)?;

        let first = entries.into_iter().next().ok_or_else(|| {
            debug!(city, "Geocoding returned no matches");
            WeatherError::InvalidCity(CITY_NOT_FOUND.to_string())
        })?;

        debug!(city, resolved = %first.name, lat = first.lat, lon = first.lon, "City resolved");

        Ok(Coordinates {
            latitude: first.lat,
            longitude: first.lon,
            name: first.name,
        })
    }

    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot> {
        debug!(lat = latitude, lon = longitude, "Fetching OpenWeather one-call data");

        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let res = self
            .http
            .get(&self.endpoints.onecall_url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let body = success_body(res, "one-call").await.map_err(|failure| {
            failure.unwrap_or_else(|| WeatherError::Upstream(UPSTREAM_FAILED.to_string()))
        })?;

        Ok(serde_json::from_str(&body)?)
    }
}

/// Reads the body of a successful response.
///
/// `Err(None)` means the status was not a success and the caller picks the
/// error; `Err(Some(_))` is a transport failure while reading the body.
async fn success_body(
    res: Response,
    call: &'static str,
) -> std::result::Result<String, Option<WeatherError>> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| Some(WeatherError::from(e)))?;

    if !status.is_success() {
        warn!(
            call,
            %status,
            body = %truncate_body(&body),
            "OpenWeather request failed"
        );
        return Err(None);
    }

    Ok(body)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
