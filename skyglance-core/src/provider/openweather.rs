use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    config::DEFAULT_TIMEOUT_SECS,
    error::{Endpoint, WeatherError},
    model::{
        CitySuggestion, Coordinates, ForecastSample, ForecastSeries, LocationQuery,
        WeatherSnapshot,
    },
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_base_url(
        api_key: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_body(
        &self,
        endpoint: Endpoint,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(StatusCode, String), WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%endpoint, ?params, "sending OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        Ok((status, body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let (status, body) = self.get_body(endpoint, path, params).await?;

        if !status.is_success() {
            return Err(WeatherError::Status { endpoint, status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::malformed(endpoint, e))
    }
}

fn location_params(query: &LocationQuery) -> Vec<(&'static str, String)> {
    let mut params = match query {
        LocationQuery::City(name) => vec![("q", name.clone())],
        LocationQuery::Coordinates(c) => vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())],
    };
    params.push(("units", "metric".to_string()));
    params
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

/// The part of every current-weather body that survives an error reply.
#[derive(Debug, Deserialize)]
struct OwStatus {
    #[serde(default)]
    cod: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: Option<String>,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwUvResponse {
    value: f64,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &LocationQuery) -> Result<WeatherSnapshot, WeatherError> {
        let (status, body) = self
            .get_body(Endpoint::CurrentWeather, "/data/2.5/weather", &location_params(query))
            .await?;

        // Any rejected lookup means the location is unknown to the service.
        let cod = serde_json::from_str::<OwStatus>(&body).ok().and_then(|s| s.cod);
        if !status.is_success() || cod.as_ref().is_some_and(|cod| !cod_is_ok(cod)) {
            warn!(%status, %query, body = %truncate_body(&body), "current weather lookup rejected");
            return Err(WeatherError::NotFound(query.to_string()));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::malformed(Endpoint::CurrentWeather, e))?;

        let sunrise = unix_to_utc(parsed.sys.sunrise)
            .ok_or_else(|| WeatherError::malformed(Endpoint::CurrentWeather, "invalid sunrise"))?;
        let sunset = unix_to_utc(parsed.sys.sunset)
            .ok_or_else(|| WeatherError::malformed(Endpoint::CurrentWeather, "invalid sunset"))?;

        let (condition, icon) = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        Ok(WeatherSnapshot {
            city: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            sunrise,
            sunset,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            visibility_m: parsed.visibility,
            condition,
            icon,
            coordinates: Coordinates::new(parsed.coord.lat, parsed.coord.lon),
        })
    }

    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSeries, WeatherError> {
        let parsed: OwForecastResponse = self
            .get_json(Endpoint::Forecast, "/data/2.5/forecast", &location_params(query))
            .await?;

        let samples = parsed
            .list
            .into_iter()
            .map(|entry| {
                let time = parse_dt_txt(&entry.dt_txt).ok_or_else(|| {
                    WeatherError::malformed(
                        Endpoint::Forecast,
                        format!("invalid dt_txt '{}'", entry.dt_txt),
                    )
                })?;
                Ok(ForecastSample { time, temperature_c: entry.main.temp })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        Ok(ForecastSeries::new(samples))
    }

    async fn geocode(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<CitySuggestion>, WeatherError> {
        let parsed: Vec<OwGeoEntry> = self
            .get_json(
                Endpoint::Geocoding,
                "/geo/1.0/direct",
                &[("q", prefix.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        Ok(parsed
            .into_iter()
            .take(limit)
            .map(|g| CitySuggestion {
                name: g.name,
                country: g.country,
                state: g.state,
                coordinates: Coordinates::new(g.lat, g.lon),
            })
            .collect())
    }

    async fn uv_index(&self, coordinates: Coordinates) -> Result<f64, WeatherError> {
        let parsed: OwUvResponse = self
            .get_json(
                Endpoint::UvIndex,
                "/data/2.5/uvi",
                &[("lat", coordinates.lat.to_string()), ("lon", coordinates.lon.to_string())],
            )
            .await?;

        Ok(parsed.value)
    }
}

/// OpenWeather reports `cod` as either `200` or `"200"`.
fn cod_is_ok(cod: &serde_json::Value) -> bool {
    match cod {
        serde_json::Value::Number(n) => n.as_i64() == Some(200),
        serde_json::Value::String(s) => s.trim() == "200",
        _ => false,
    }
}

fn parse_dt_txt(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok().map(|ndt| ndt.and_utc())
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
