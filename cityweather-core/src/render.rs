//! Presentation of a display cycle.
//!
//! The controller never touches markup directly. It builds a [`WeatherCard`]
//! and hands it, or an error message, to a [`Renderer`]. [`HtmlRegion`] is the
//! in-memory display region; front ends wrap it to push the markup somewhere
//! visible.

use chrono::{DateTime, FixedOffset, Local, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tera::{Context, Tera};
use thiserror::Error;

use crate::{config::Endpoints, model::DailyWeather};

pub const NO_SUMMARY: &str = "No summary available";

const CARD_HTML: &str = "card.html";
const CARD_TEXT: &str = "card.txt";
const ERROR_HTML: &str = "error.html";

const CARD_HTML_TEMPLATE: &str = r#"<h2>Weather in {{ card.city }}</h2>
<p><strong>Date:</strong> {{ card.date }}</p>
<p><strong>Sunrise:</strong> {{ card.sunrise }}</p>
<p><strong>Sunset:</strong> {{ card.sunset }}</p>
<p><strong>Moonrise:</strong> {{ card.moonrise }}</p>
<p><strong>Moonset:</strong> {{ card.moonset }}</p>
<p><strong>Moon phase:</strong> {{ card.moon_phase }}</p>
<p><strong>Summary:</strong> {{ card.summary }}</p><br>
<p><strong>Temperature:</strong><br>
    <strong>Day:</strong> {{ card.temp.day }}°C <br>
    <strong>Min:</strong> {{ card.temp.min }}°C <br>
    <strong>Max:</strong> {{ card.temp.max }}°C <br>
    <strong>Night:</strong> {{ card.temp.night }}°C <br>
    <strong>Evening:</strong> {{ card.temp.evening }}°C <br>
    <strong>Morning:</strong> {{ card.temp.morning }}°C <br> <br></p>
<p><strong>Feels like:</strong><br>
    <strong>Morning:</strong> {{ card.feels_like.morning }}°C <br>
    <strong>Day:</strong> {{ card.feels_like.day }}°C <br>
    <strong>Evening:</strong> {{ card.feels_like.evening }}°C <br>
    <strong>Night:</strong> {{ card.feels_like.night }}°C <br> <br></p>
<p><strong>Pressure:</strong> {{ card.pressure }}hPa</p>
<p><strong>Humidity:</strong> {{ card.humidity }}%</p>
<p><strong>Atmospheric temperature:</strong> {{ card.dew_point }}°C</p>
<p><strong>Wind Speed:</strong> {{ card.wind_speed }}km/h</p>
{%- if card.wind_gust %}
<p><strong>Wind Gust:</strong> {{ card.wind_gust }}km/h</p>
{%- endif %}
<p><strong>Wind degrees:</strong> {{ card.wind_deg }}°</p>
<p><strong>Cloudiness:</strong> {{ card.clouds }}%</p>
<p><strong>UV Index:</strong> {{ card.uvi }}</p>
<p><strong>Probability of precipitation:</strong> {{ card.pop }}</p>
{%- if card.rain %}
<p><strong>Rain:</strong> {{ card.rain }}mm</p>
{%- endif %}
{%- if card.snow %}
<p><strong>Snow:</strong> {{ card.snow }}mm</p>
{%- endif %}
{%- if card.condition %}
<p><strong>Weather ID:</strong> {{ card.condition.id }}</p>
<p><strong>Weather main:</strong> {{ card.condition.main }}</p>
<p><strong>Weather description:</strong> {{ card.condition.description }}</p>
<p><strong>Weather icon:</strong> {{ card.condition.icon }}</p>
<img src="{{ card.condition.icon_url }}" alt="Weather icon" width="150px" height="150px">
{%- endif %}
"#;

const CARD_TEXT_TEMPLATE: &str = r#"Weather in {{ card.city }}
Date: {{ card.date }}
Sunrise: {{ card.sunrise }}
Sunset: {{ card.sunset }}
Moonrise: {{ card.moonrise }}
Moonset: {{ card.moonset }}
Moon phase: {{ card.moon_phase }}
Summary: {{ card.summary }}

Temperature:
  Day: {{ card.temp.day }}°C
  Min: {{ card.temp.min }}°C
  Max: {{ card.temp.max }}°C
  Night: {{ card.temp.night }}°C
  Evening: {{ card.temp.evening }}°C
  Morning: {{ card.temp.morning }}°C
Feels like:
  Morning: {{ card.feels_like.morning }}°C
  Day: {{ card.feels_like.day }}°C
  Evening: {{ card.feels_like.evening }}°C
  Night: {{ card.feels_like.night }}°C

Pressure: {{ card.pressure }}hPa
Humidity: {{ card.humidity }}%
Atmospheric temperature: {{ card.dew_point }}°C
Wind Speed: {{ card.wind_speed }}km/h
{%- if card.wind_gust %}
Wind Gust: {{ card.wind_gust }}km/h
{%- endif %}
Wind degrees: {{ card.wind_deg }}°
Cloudiness: {{ card.clouds }}%
UV Index: {{ card.uvi }}
Probability of precipitation: {{ card.pop }}
{%- if card.rain %}
Rain: {{ card.rain }}mm
{%- endif %}
{%- if card.snow %}
Snow: {{ card.snow }}mm
{%- endif %}
{%- if card.condition %}
Weather: {{ card.condition.main }} ({{ card.condition.description }}, id {{ card.condition.id }})
Icon: {{ card.condition.icon_url }}
{%- endif %}
"#;

const ERROR_HTML_TEMPLATE: &str = r#"<p class="errorDisplay">{{ message }}</p>"#;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template rendering failed: {0}")]
    Template(#[from] tera::Error),

    #[error("Failed to write rendered output: {0}")]
    Io(#[from] std::io::Error),
}

/// Surface that shows the outcome of a display cycle.
///
/// Implementations are shared between concurrent cycles, so they take `&self`
/// and keep their own interior mutability. The last call wins.
pub trait Renderer: Send + Sync {
    fn clear(&self) -> Result<(), RenderError>;

    fn render_weather(&self, card: &WeatherCard) -> Result<(), RenderError>;

    fn render_error(&self, message: &str) -> Result<(), RenderError>;
}

/// Timezone clock times are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardZone {
    /// This machine's zone, with the offset looked up per timestamp so
    /// daylight saving changes are honored.
    Local,
    Fixed(FixedOffset),
}

impl CardZone {
    fn format(self, at: DateTime<Utc>, fmt: &str) -> String {
        match self {
            Self::Local => at.with_timezone(&Local).format(fmt).to_string(),
            Self::Fixed(offset) => at.with_timezone(&offset).format(fmt).to_string(),
        }
    }
}

impl From<FixedOffset> for CardZone {
    fn from(offset: FixedOffset) -> Self {
        Self::Fixed(offset)
    }
}

/// How cards are formatted: the timezone used for clock times and where
/// condition icons are served from.
#[derive(Debug, Clone)]
pub struct CardOptions {
    pub zone: CardZone,
    pub icon_base_url: String,
}

impl CardOptions {
    pub fn new(zone: impl Into<CardZone>, icon_base_url: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            icon_base_url: icon_base_url.into(),
        }
    }

    /// Local timezone of this machine, icons from the configured endpoint.
    pub fn local(endpoints: &Endpoints) -> Self {
        Self::new(CardZone::Local, endpoints.icon_base_url.clone())
    }

    pub fn icon_url(&self, icon: &str) -> String {
        format!("{}/{icon}.png", self.icon_base_url.trim_end_matches('/'))
    }
}

impl Default for CardOptions {
    fn default() -> Self {
        Self::local(&Endpoints::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureRow {
    pub day: String,
    pub min: String,
    pub max: String,
    pub night: String,
    pub evening: String,
    pub morning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeelsLikeRow {
    pub morning: String,
    pub day: String,
    pub evening: String,
    pub night: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardCondition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
    pub icon_url: String,
}

/// Display-ready view of one day, every value already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherCard {
    pub city: String,
    pub date: String,
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
    pub summary: String,
    pub temp: TemperatureRow,
    pub feels_like: FeelsLikeRow,
    pub pressure: String,
    pub humidity: String,
    pub dew_point: String,
    pub wind_speed: String,
    pub wind_gust: Option<String>,
    pub wind_deg: String,
    pub clouds: String,
    pub uvi: String,
    pub pop: String,
    pub rain: Option<String>,
    pub snow: Option<String>,
    pub condition: Option<CardCondition>,
}

impl WeatherCard {
    pub fn new(city: &str, day: &DailyWeather, options: &CardOptions) -> Self {
        let zone = options.zone;

        Self {
            city: city.to_string(),
            date: format_date(day.dt, zone),
            sunrise: format_time(day.sunrise, zone),
            sunset: format_time(day.sunset, zone),
            moonrise: format_time(day.moonrise, zone),
            moonset: format_time(day.moonset, zone),
            moon_phase: format_number(day.moon_phase),
            summary: day
                .summary
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(NO_SUMMARY)
                .to_string(),
            temp: TemperatureRow {
                day: format_number(day.temp.day),
                min: format_number(day.temp.min),
                max: format_number(day.temp.max),
                night: format_number(day.temp.night),
                evening: format_number(day.temp.eve),
                morning: format_number(day.temp.morn),
            },
            feels_like: FeelsLikeRow {
                morning: format_number(day.feels_like.morn),
                day: format_number(day.feels_like.day),
                evening: format_number(day.feels_like.eve),
                night: format_number(day.feels_like.night),
            },
            pressure: format_number(day.pressure),
            humidity: format_number(day.humidity),
            dew_point: format_number(day.dew_point),
            wind_speed: format_kmh(day.wind_speed),
            wind_gust: day.wind_gust.map(format_kmh),
            wind_deg: format_number(day.wind_deg),
            clouds: format_number(day.clouds),
            uvi: format_number(day.uvi),
            pop: format_number(day.pop),
            rain: present_amount(day.rain),
            snow: present_amount(day.snow),
            condition: day.weather.first().map(|w| CardCondition {
                id: w.id,
                main: w.main.clone(),
                description: w.description.clone(),
                icon: w.icon.clone(),
                icon_url: options.icon_url(&w.icon),
            }),
        }
    }
}

/// Compiled card and error templates.
#[derive(Debug)]
pub struct CardTemplates {
    tera: Tera,
}

impl CardTemplates {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (CARD_HTML, CARD_HTML_TEMPLATE),
            (CARD_TEXT, CARD_TEXT_TEMPLATE),
            (ERROR_HTML, ERROR_HTML_TEMPLATE),
        ])?;
        // Plain text output must not be HTML-escaped.
        tera.autoescape_on(vec![".html"]);
        Ok(Self { tera })
    }

    pub fn card_html(&self, card: &WeatherCard) -> Result<String, RenderError> {
        self.render_card(CARD_HTML, card)
    }

    pub fn card_text(&self, card: &WeatherCard) -> Result<String, RenderError> {
        self.render_card(CARD_TEXT, card)
    }

    pub fn error_html(&self, message: &str) -> Result<String, RenderError> {
        let mut ctx = Context::new();
        ctx.insert("message", message);
        Ok(self.tera.render(ERROR_HTML, &ctx)?)
    }

    fn render_card(&self, template: &str, card: &WeatherCard) -> Result<String, RenderError> {
        let mut ctx = Context::new();
        ctx.insert("card", card);
        Ok(self.tera.render(template, &ctx)?)
    }
}

/// In-memory display region holding the current HTML fragment.
#[derive(Debug)]
pub struct HtmlRegion {
    templates: Arc<CardTemplates>,
    content: RwLock<String>,
}

impl HtmlRegion {
    pub fn new() -> Result<Self, RenderError> {
        Ok(Self::with_templates(Arc::new(CardTemplates::new()?)))
    }

    pub fn with_templates(templates: Arc<CardTemplates>) -> Self {
        Self {
            templates,
            content: RwLock::new(String::new()),
        }
    }

    /// Current markup; empty after [`Renderer::clear`].
    pub fn html(&self) -> String {
        self.content.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.content.read().is_empty()
    }

    pub fn templates(&self) -> &CardTemplates {
        &self.templates
    }
}

impl Renderer for HtmlRegion {
    fn clear(&self) -> Result<(), RenderError> {
        self.content.write().clear();
        Ok(())
    }

    fn render_weather(&self, card: &WeatherCard) -> Result<(), RenderError> {
        let html = self.templates.card_html(card)?;
        *self.content.write() = html;
        Ok(())
    }

    fn render_error(&self, message: &str) -> Result<(), RenderError> {
        let html = self.templates.error_html(message)?;
        *self.content.write() = html;
        Ok(())
    }
}

/// Metres per second to kilometres per hour, rounded to two decimals.
pub fn mps_to_kmh(mps: f64) -> f64 {
    (mps * 3.6 * 100.0).round() / 100.0
}

fn format_kmh(mps: f64) -> String {
    format!("{:.2}", mps_to_kmh(mps))
}

/// Numbers print the way the provider sent them: `15`, not `15.0`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Clock time for an epoch timestamp. `0` is the provider's "no event" value.
pub fn format_time(epoch_secs: i64, zone: CardZone) -> String {
    if epoch_secs == 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|dt| zone.format(dt, "%H:%M:%S"))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_date(epoch_secs: i64, zone: CardZone) -> String {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|dt| zone.format(dt, "%Y-%m-%d"))
        .unwrap_or_else(|| "-".to_string())
}

fn present_amount(amount: Option<f64>) -> Option<String> {
    amount.filter(|v| *v > 0.0).map(format_number)
}
