//! In-memory provider used by unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Notify;

use crate::{
    display::{RenderTarget, Slot},
    error::{Endpoint, WeatherError},
    model::{
        CitySuggestion, Coordinates, ForecastSample, ForecastSeries, LocationQuery,
        WeatherSnapshot,
    },
    provider::WeatherProvider,
};

pub(crate) fn snapshot(city: &str, country: &str, temperature_c: f64) -> WeatherSnapshot {
    WeatherSnapshot {
        city: city.to_string(),
        country: country.to_string(),
        sunrise: DateTime::<Utc>::from_timestamp(1_760_000_000, 0).unwrap_or_default(),
        sunset: DateTime::<Utc>::from_timestamp(1_760_043_000, 0).unwrap_or_default(),
        temperature_c,
        feels_like_c: temperature_c + 2.0,
        humidity_pct: 65,
        wind_speed_mps: 3.6,
        visibility_m: Some(10_000),
        condition: "scattered clouds".to_string(),
        icon: "03d".to_string(),
        coordinates: Coordinates::new(13.75, 100.5167),
    }
}

pub(crate) fn forecast(samples: &[(DateTime<Utc>, f64)]) -> ForecastSeries {
    ForecastSeries::new(
        samples
            .iter()
            .map(|&(time, temperature_c)| ForecastSample { time, temperature_c })
            .collect(),
    )
}

pub(crate) fn suggestion(name: &str, country: &str) -> CitySuggestion {
    CitySuggestion {
        name: name.to_string(),
        country: country.to_string(),
        state: None,
        coordinates: Coordinates::new(0.0, 0.0),
    }
}

fn unavailable(endpoint: Endpoint) -> WeatherError {
    WeatherError::Status {
        endpoint,
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "unavailable".to_string(),
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeProvider {
    cities: HashMap<String, WeatherSnapshot>,
    forecast_fails: bool,
    position_city: Option<String>,
    suggestions: Option<Vec<CitySuggestion>>,
    uv: Option<f64>,
    gates: HashMap<String, Arc<Notify>>,
    calls: Mutex<Vec<(Endpoint, String)>>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_city(mut self, snapshot: WeatherSnapshot) -> Self {
        self.cities.insert(snapshot.city.to_lowercase(), snapshot);
        self
    }

    pub(crate) fn with_failing_forecast(mut self) -> Self {
        self.forecast_fails = true;
        self
    }

    /// City returned for coordinate lookups.
    pub(crate) fn with_position_city(mut self, city: &str) -> Self {
        self.position_city = Some(city.to_lowercase());
        self
    }

    pub(crate) fn with_suggestions(mut self, items: Vec<CitySuggestion>) -> Self {
        self.suggestions = Some(items);
        self
    }

    pub(crate) fn with_uv(mut self, value: f64) -> Self {
        self.uv = Some(value);
        self
    }

    /// Current-weather lookups for `city` wait until the returned handle is notified.
    pub(crate) fn gate(&mut self, city: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.insert(city.to_lowercase(), notify.clone());
        notify
    }

    pub(crate) fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().iter().filter(|(e, _)| *e == endpoint).count()
    }

    fn record(&self, endpoint: Endpoint, arg: String) {
        self.calls.lock().push((endpoint, arg));
    }

    fn lookup(&self, query: &LocationQuery) -> Option<&WeatherSnapshot> {
        match query {
            LocationQuery::City(name) => self.cities.get(&name.to_lowercase()),
            LocationQuery::Coordinates(_) => {
                self.position_city.as_ref().and_then(|c| self.cities.get(c))
            }
        }
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn current(&self, query: &LocationQuery) -> Result<WeatherSnapshot, WeatherError> {
        self.record(Endpoint::CurrentWeather, query.to_string());

        let gate = match query {
            LocationQuery::City(name) => self.gates.get(&name.to_lowercase()),
            LocationQuery::Coordinates(_) => None,
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.lookup(query).cloned().ok_or_else(|| WeatherError::NotFound(query.to_string()))
    }

    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSeries, WeatherError> {
        self.record(Endpoint::Forecast, query.to_string());

        if self.forecast_fails {
            return Err(unavailable(Endpoint::Forecast));
        }
        let snapshot = self.lookup(query).ok_or_else(|| unavailable(Endpoint::Forecast))?;
        Ok(forecast(&[(Utc::now(), snapshot.temperature_c)]))
    }

    async fn geocode(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<CitySuggestion>, WeatherError> {
        self.record(Endpoint::Geocoding, prefix.to_string());

        let items = self.suggestions.clone().ok_or_else(|| unavailable(Endpoint::Geocoding))?;
        Ok(items.into_iter().take(limit).collect())
    }

    async fn uv_index(&self, coordinates: Coordinates) -> Result<f64, WeatherError> {
        self.record(Endpoint::UvIndex, coordinates.to_string());
        self.uv.ok_or_else(|| unavailable(Endpoint::UvIndex))
    }
}

/// Render target that remembers the latest content of every slot.
#[derive(Debug, Default)]
pub(crate) struct RecordingTarget {
    pub(crate) texts: HashMap<Slot, String>,
    pub(crate) images: HashMap<Slot, (String, String)>,
    pub(crate) alerts: Vec<String>,
    pub(crate) writes: Vec<Slot>,
}

impl RecordingTarget {
    pub(crate) fn text(&self, slot: Slot) -> Option<&str> {
        self.texts.get(&slot).map(String::as_str)
    }
}

impl RenderTarget for RecordingTarget {
    fn set_text(&mut self, slot: Slot, text: &str) {
        self.writes.push(slot);
        self.texts.insert(slot, text.to_string());
    }

    fn set_image(&mut self, slot: Slot, url: &str, alt: &str) {
        self.writes.push(slot);
        self.images.insert(slot, (url.to_string(), alt.to_string()));
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
