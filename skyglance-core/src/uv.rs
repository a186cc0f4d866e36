use tracing::debug;

use crate::{model::Coordinates, provider::WeatherProvider};

pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvLevel {
    Low,
    Moderate,
    High,
}

impl UvLevel {
    /// `> 7` is High, `> 5` is Moderate, anything else Low.
    pub fn classify(value: f64) -> Self {
        if value > 7.0 {
            UvLevel::High
        } else if value > 5.0 {
            UvLevel::Moderate
        } else {
            UvLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UvLevel::Low => "Low",
            UvLevel::Moderate => "Moderate",
            UvLevel::High => "High",
        }
    }
}

impl std::fmt::Display for UvLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text for the UV value and status slots.
#[derive(Debug, Clone, PartialEq)]
pub struct UvDisplay {
    pub value: String,
    pub status: String,
}

impl UvDisplay {
    pub fn from_value(value: f64) -> Self {
        Self { value: value.to_string(), status: UvLevel::classify(value).to_string() }
    }

    pub fn placeholder() -> Self {
        Self { value: PLACEHOLDER.to_string(), status: PLACEHOLDER.to_string() }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value == PLACEHOLDER
    }
}

/// Fetch the UV index for `coordinates`, degrading to placeholders on error.
pub async fn fetch_uv<P>(provider: &P, coordinates: Coordinates) -> UvDisplay
where
    P: WeatherProvider + ?Sized,
{
    match provider.uv_index(coordinates).await {
        Ok(value) => UvDisplay::from_value(value),
        Err(e) => {
            debug!(error = %e, %coordinates, "UV index lookup failed");
            UvDisplay::placeholder()
        }
    }
}
