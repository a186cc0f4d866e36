//! Current weather + forecast acquisition.

use tracing::debug;

use crate::{
    error::WeatherError,
    model::{Coordinates, LocationQuery, WeatherBundle},
    provider::WeatherProvider,
};

/// Fetch current conditions, then the forecast for the same location.
///
/// Nothing is returned unless both requests succeed, so callers can replace
/// their stored pair wholesale or keep the old one.
pub async fn fetch_weather<P>(provider: &P, query: &LocationQuery) -> Result<WeatherBundle, WeatherError>
where
    P: WeatherProvider + ?Sized,
{
    if matches!(query, LocationQuery::City(name) if name.trim().is_empty()) {
        return Err(WeatherError::NotFound(String::new()));
    }

    let snapshot = provider.current(query).await?;
    debug!(location = %snapshot.location_label(), "current weather received");

    let forecast = provider.forecast(query).await?;
    debug!(samples = forecast.samples.len(), "forecast received");

    Ok(WeatherBundle { snapshot, forecast })
}

/// Resolve a position to the city name the provider reports for it.
pub async fn reverse_resolve<P>(provider: &P, coordinates: Coordinates) -> Result<String, WeatherError>
where
    P: WeatherProvider + ?Sized,
{
    let snapshot = provider.current(&LocationQuery::Coordinates(coordinates)).await?;
    if snapshot.city.trim().is_empty() {
        return Err(WeatherError::NotFound(coordinates.to_string()));
    }
    Ok(snapshot.city)
}
