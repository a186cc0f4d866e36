//! Core library for the `skyglance` weather card.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the [`WeatherProvider`] trait
//! - Fetching, city suggestions and UV lookups
//! - A pure display formatter and the [`RenderTarget`] it is written to
//! - [`WeatherSession`], which owns the state and applies only current results
//!
//! It is used by `skyglance-cli`, but can also be reused by other front ends.

pub mod config;
pub mod display;
pub mod error;
pub mod fetch;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod session;
pub mod suggest;
pub mod units;
pub mod uv;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use display::{DisplayModel, RenderTarget, Slot, SlotContent, SlotUpdate, compute_display};
pub use error::{LocationError, WeatherError};
pub use geolocation::{FixedPosition, Geolocation};
pub use model::{
    CitySuggestion, Coordinates, DisplayPreferences, ForecastSample, ForecastSeries,
    LocationQuery, SuggestionList, WeatherBundle, WeatherSnapshot,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use session::{Outcome, WeatherSession};
pub use units::TemperatureUnit;
pub use uv::{UvDisplay, UvLevel};
