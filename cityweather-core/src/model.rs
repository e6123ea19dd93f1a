use serde::{Deserialize, Serialize};

/// Result of a geocoding lookup. Produced per display cycle, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Canonical name as spelled by the provider.
    pub name: String,
}

/// One-call payload, kept as the provider sent it (metric units).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub timezone_offset: Option<i64>,
    #[serde(default)]
    pub current: Option<CurrentWeather>,
    #[serde(default)]
    pub daily: Vec<DailyWeather>,
}

impl WeatherSnapshot {
    /// Today's entry, the one the weather card shows.
    pub fn today(&self) -> Option<&DailyWeather> {
        self.daily.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyWeather {
    pub dt: i64,
    pub sunrise: i64,
    pub sunset: i64,
    /// `0` when the moon does not rise that day.
    #[serde(default)]
    pub moonrise: i64,
    #[serde(default)]
    pub moonset: i64,
    #[serde(default)]
    pub moon_phase: f64,
    #[serde(default)]
    pub summary: Option<String>,
    pub temp: DailyTemperature,
    pub feels_like: FeelsLike,
    pub pressure: f64,
    pub humidity: f64,
    pub dew_point: f64,
    /// Metres per second.
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_gust: Option<f64>,
    pub wind_deg: f64,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub clouds: f64,
    #[serde(default)]
    pub pop: f64,
    /// Millimetres; absent on dry days.
    #[serde(default)]
    pub rain: Option<f64>,
    #[serde(default)]
    pub snow: Option<f64>,
    #[serde(default)]
    pub uvi: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTemperature {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeelsLike {
    pub day: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_daily_entry_without_optional_fields() {
        let json = serde_json::json!({
            "lat": 51.51,
            "lon": -0.13,
            "daily": [{
                "dt": 1_700_000_000,
                "sunrise": 1_699_990_000,
                "sunset": 1_700_020_000,
                "temp": { "day": 15, "min": 9.5, "max": 16, "night": 10, "eve": 13, "morn": 9.8 },
                "feels_like": { "day": 14, "night": 9, "eve": 12, "morn": 8 },
                "pressure": 1012,
                "humidity": 70,
                "dew_point": 7.1,
                "wind_speed": 4.2,
                "wind_deg": 230,
                "clouds": 40
            }]
        });

        let snapshot: WeatherSnapshot = serde_json::from_value(json).unwrap();
        let today = snapshot.today().unwrap();

        assert_eq!(today.temp.day, 15.0);
        assert_eq!(today.moonrise, 0);
        assert!(today.summary.is_none());
        assert!(today.rain.is_none());
        assert!(today.wind_gust.is_none());
        assert!(today.weather.is_empty());
        assert!(snapshot.current.is_none());
    }

    #[test]
    fn today_is_none_for_empty_daily() {
        let snapshot: WeatherSnapshot =
            serde_json::from_value(serde_json::json!({ "lat": 0.0, "lon": 0.0 })).unwrap();
        assert!(snapshot.today().is_none());
    }
}
