use thiserror::Error;

/// Errors raised at the fetcher boundary.
///
/// The controller never inspects the variant; it renders the `Display` text in
/// place of the weather card, so these messages are user-facing.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Submitted city text was empty after trimming.
    #[error("Please enter a city")]
    EmptyCity,

    /// Geocoding rejected the request or returned no match.
    #[error("{0}")]
    InvalidCity(String),

    /// The weather endpoint answered with a non-success status.
    #[error("{0}")]
    Upstream(String),

    /// The weather payload carried no daily entry to show.
    #[error("No daily forecast available")]
    MissingForecast,

    /// The request never got an answer. Held without its URL, which carries
    /// the API key.
    #[error("{0}")]
    Transport(reqwest::Error),

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// The fetcher could not be constructed.
    #[error("{0}")]
    Config(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

pub(crate) const INVALID_CITY: &str = "Please enter a valid city";
pub(crate) const CITY_NOT_FOUND: &str = "City not found, Please enter a valid city";
pub(crate) const UPSTREAM_FAILED: &str = "Could not fetch data from the API";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_rendered_verbatim() {
        assert_eq!(WeatherError::EmptyCity.to_string(), "Please enter a city");
        assert_eq!(
            WeatherError::InvalidCity(CITY_NOT_FOUND.into()).to_string(),
            "City not found, Please enter a valid city"
        );
        assert_eq!(
            WeatherError::Upstream(UPSTREAM_FAILED.into()).to_string(),
            "Could not fetch data from the API"
        );
    }

    #[test]
    fn decode_error_keeps_serde_message() {
        let serde_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let expected = serde_err.to_string();
        let err = WeatherError::from(serde_err);
        assert_eq!(err.to_string(), expected);
    }
}
