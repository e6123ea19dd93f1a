//! Core library for the `cityweather` app.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather fetcher (geocoding + one-call weather)
//! - Weather card rendering behind a `Renderer` capability
//! - The display controller with its refresh timer
//!
//! It is used by `cityweather-cli`, but can also be embedded by other front ends
//! that bring their own `Renderer`.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod render;

pub use config::{Config, Endpoints};
pub use controller::{AppSettings, AppState, CycleOutcome, DisplayState, WeatherApp};
pub use error::WeatherError;
pub use model::{Coordinates, DailyWeather, WeatherSnapshot};
pub use provider::{WeatherFetcher, fetcher_from_config, openweather::OpenWeatherFetcher};
pub use render::{
    CardOptions, CardTemplates, CardZone, HtmlRegion, RenderError, Renderer, WeatherCard,
};
