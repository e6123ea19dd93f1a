#![allow(dead_code)]

use chrono::FixedOffset;
use cityweather_core::CardOptions;

pub const API_KEY: &str = "test-key";

pub fn utc_card_options() -> CardOptions {
    CardOptions::new(
        FixedOffset::east_opt(0).expect("zero offset is valid"),
        "https://openweathermap.org/img/wn",
    )
}

/// Geocoding answer for "London" as the provider sends it.
pub fn london_geocode() -> serde_json::Value {
    serde_json::json!([
        { "name": "London", "lat": 51.51, "lon": -0.13, "country": "GB" }
    ])
}

/// One-call answer with a single daily entry, `temp.day = 15`.
pub fn onecall_response() -> serde_json::Value {
    serde_json::json!({
        "lat": 51.51,
        "lon": -0.13,
        "timezone": "Europe/London",
        "timezone_offset": 0,
        "current": {
            "dt": 1_700_049_600,
            "temp": 14.2,
            "feels_like": 13.1,
            "humidity": 72,
            "weather": [
                { "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }
            ]
        },
        "daily": [{
            "dt": 1_700_049_600,
            "sunrise": 1_700_033_400,
            "sunset": 1_700_065_800,
            "moonrise": 1_700_040_000,
            "moonset": 1_700_070_000,
            "moon_phase": 0.08,
            "summary": "Expect a day of partly cloudy with rain",
            "temp": { "day": 15, "min": 9.5, "max": 16.2, "night": 10, "eve": 13.4, "morn": 9.8 },
            "feels_like": { "day": 14.3, "night": 9, "eve": 12.6, "morn": 8.1 },
            "pressure": 1012,
            "humidity": 70,
            "dew_point": 7.1,
            "wind_speed": 4.2,
            "wind_deg": 230,
            "wind_gust": 9.7,
            "weather": [
                { "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }
            ],
            "clouds": 40,
            "pop": 0.62,
            "rain": 1.3,
            "uvi": 1.5
        }]
    })
}
