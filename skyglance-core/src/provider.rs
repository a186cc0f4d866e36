use crate::{
    Config,
    error::WeatherError,
    model::{CitySuggestion, Coordinates, ForecastSeries, LocationQuery, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Read-only access to a weather data source.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions. A location the source does not know yields
    /// [`WeatherError::NotFound`].
    async fn current(&self, query: &LocationQuery) -> Result<WeatherSnapshot, WeatherError>;

    /// 5-day / 3-hour forecast for the same kind of query.
    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSeries, WeatherError>;

    /// Cities whose names match `prefix`, at most `limit` of them.
    async fn geocode(&self, prefix: &str, limit: usize)
    -> Result<Vec<CitySuggestion>, WeatherError>;

    async fn uv_index(&self, coordinates: Coordinates) -> Result<f64, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key()?;
    let base_url = config.base_url.as_deref().unwrap_or(openweather::DEFAULT_BASE_URL);

    let provider = OpenWeatherProvider::with_base_url(api_key, base_url, config.timeout())?;
    Ok(provider)
}
