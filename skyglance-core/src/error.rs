//! Error types for weather lookups.
//!
//! Failures fall into two user-visible buckets: the city could not be found, or
//! the data could not be fetched. Malformed payloads are treated like network
//! failures.

use reqwest::StatusCode;
use thiserror::Error;

/// Remote endpoint a request was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Geocoding,
    CurrentWeather,
    Forecast,
    UvIndex,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Geocoding => "geocoding",
            Endpoint::CurrentWeather => "current weather",
            Endpoint::Forecast => "forecast",
            Endpoint::UvIndex => "UV index",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geolocation failures reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        body: String,
    },

    #[error("Malformed OpenWeather {endpoint} response: {detail}")]
    Malformed { endpoint: Endpoint, detail: String },

    #[error("Geolocation error: {0}")]
    Geolocation(#[from] LocationError),
}

impl WeatherError {
    /// Message suitable for an alert in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::NotFound(_) => "City not found",
            WeatherError::Geolocation(_) => "Unable to determine your location.",
            WeatherError::Network(_)
            | WeatherError::Status { .. }
            | WeatherError::Malformed { .. } => "Failed to fetch weather.",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::NotFound(_))
    }

    pub(crate) fn malformed(endpoint: Endpoint, detail: impl std::fmt::Display) -> Self {
        WeatherError::Malformed { endpoint, detail: detail.to_string() }
    }
}
