use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::units::TemperatureUnit;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// What to look up: a free-text city name or a position.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    pub fn city(name: impl Into<String>) -> Self {
        LocationQuery::City(name.into())
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name),
            LocationQuery::Coordinates(c) => write!(f, "({c})"),
        }
    }
}

/// Current conditions for one location. Temperatures in Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    /// Not every station reports visibility.
    pub visibility_m: Option<u32>,
    pub condition: String,
    pub icon: String,
    pub coordinates: Coordinates,
}

impl WeatherSnapshot {
    /// `Bangkok, TH`
    pub fn location_label(&self) -> String {
        if self.country.is_empty() {
            self.city.clone()
        } else {
            format!("{}, {}", self.city, self.country)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
}

/// 3-hourly samples, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub samples: Vec<ForecastSample>,
}

impl ForecastSeries {
    pub fn new(samples: Vec<ForecastSample>) -> Self {
        Self { samples }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Current conditions and the forecast fetched alongside them.
///
/// The two halves are only ever stored or replaced together so that the
/// display never mixes a snapshot with another city's forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherBundle {
    pub snapshot: WeatherSnapshot,
    pub forecast: ForecastSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub coordinates: Coordinates,
}

impl CitySuggestion {
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

impl std::fmt::Display for CitySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            Some(state) if !state.is_empty() => {
                write!(f, "{}, {} ({})", self.name, self.country, state)
            }
            _ => f.write_str(&self.label()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionList {
    pub items: Vec<CitySuggestion>,
}

impl SuggestionList {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn labels(&self) -> Vec<String> {
        self.items.iter().map(CitySuggestion::label).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayPreferences {
    pub unit: TemperatureUnit,
}
