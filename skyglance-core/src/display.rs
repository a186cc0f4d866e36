//! Turns fetched data into per-slot text.
//!
//! [`compute_display`] is pure: it takes the fetched pair, the user's unit
//! preference and "today" in the viewer's timezone, and returns a
//! [`DisplayModel`]. Writing that model anywhere is the job of a
//! [`RenderTarget`].

use chrono::{DateTime, NaiveDate, TimeZone};
use std::fmt::Display;

use crate::{
    model::{DisplayPreferences, ForecastSeries, SuggestionList, WeatherBundle},
    units::{TemperatureUnit, format_temperature},
    uv::UvDisplay,
};

const HUMIDITY_HIGH_ABOVE_PCT: u8 = 70;
const VISIBILITY_CLEAR_ABOVE_M: u32 = 8000;

/// Shown when a reading is missing.
pub const MISSING: &str = "--";

/// Named place in the UI that shows one piece of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Location,
    Condition,
    WeatherIcon,
    CurrentTemperature,
    FeelsLike,
    TempRange,
    Humidity,
    HumidityStatus,
    Wind,
    Visibility,
    VisibilityStatus,
    UvIndex,
    UvStatus,
    Sunrise,
    Sunset,
    Clock,
    Date,
    Suggestions,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Location => "location",
            Slot::Condition => "condition",
            Slot::WeatherIcon => "weather-icon",
            Slot::CurrentTemperature => "current-temperature",
            Slot::FeelsLike => "feels-like",
            Slot::TempRange => "temp-range",
            Slot::Humidity => "humidity",
            Slot::HumidityStatus => "humidity-status",
            Slot::Wind => "wind",
            Slot::Visibility => "visibility",
            Slot::VisibilityStatus => "visibility-status",
            Slot::UvIndex => "uv-index",
            Slot::UvStatus => "uv-status",
            Slot::Sunrise => "sunrise",
            Slot::Sunset => "sunset",
            Slot::Clock => "clock",
            Slot::Date => "date",
            Slot::Suggestions => "suggestions",
        }
    }

    /// Slots whose text depends on the temperature unit.
    pub const fn temperature_slots() -> &'static [Slot] {
        &[Slot::CurrentTemperature, Slot::FeelsLike, Slot::TempRange]
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotContent {
    Text(String),
    Image { url: String, alt: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotUpdate {
    pub slot: Slot,
    pub content: SlotContent,
}

impl SlotUpdate {
    pub fn text(slot: Slot, text: impl Into<String>) -> Self {
        Self { slot, content: SlotContent::Text(text.into()) }
    }

    pub fn image(slot: Slot, url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self { slot, content: SlotContent::Image { url: url.into(), alt: alt.into() } }
    }
}

/// Whatever surface shows the weather card.
pub trait RenderTarget: Send {
    fn set_text(&mut self, slot: Slot, text: &str);

    fn set_image(&mut self, slot: Slot, url: &str, alt: &str);

    /// Blocking, user-visible error.
    fn alert(&mut self, message: &str);
}

pub fn render<R: RenderTarget + ?Sized>(target: &mut R, updates: &[SlotUpdate]) {
    for update in updates {
        match &update.content {
            SlotContent::Text(text) => target.set_text(update.slot, text),
            SlotContent::Image { url, alt } => target.set_image(update.slot, url, alt),
        }
    }
}

/// Today's temperature range in Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempRange {
    pub min_c: f64,
    pub max_c: f64,
    /// False when no forecast sample fell on today and the fallback was used.
    pub from_forecast: bool,
}

/// Min/max over the forecast samples that fall on `today` in `tz`.
///
/// With no same-day samples both ends are `fallback_c`.
pub fn day_range<Tz: TimeZone>(
    forecast: &ForecastSeries,
    today: NaiveDate,
    tz: &Tz,
    fallback_c: f64,
) -> TempRange {
    let mut same_day = forecast
        .samples
        .iter()
        .filter(|s| s.time.with_timezone(tz).date_naive() == today)
        .map(|s| s.temperature_c);

    let Some(first) = same_day.next() else {
        return TempRange { min_c: fallback_c, max_c: fallback_c, from_forecast: false };
    };

    let (min_c, max_c) = same_day.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
    TempRange { min_c, max_c, from_forecast: true }
}

pub fn humidity_status(humidity_pct: u8) -> &'static str {
    if humidity_pct > HUMIDITY_HIGH_ABOVE_PCT { "High" } else { "Good" }
}

pub fn visibility_status(visibility_m: u32) -> &'static str {
    if visibility_m > VISIBILITY_CLEAR_ABOVE_M { "Clear" } else { "Low" }
}

/// Metres as kilometres with one decimal, rounding half up: `250 -> "0.3 km"`.
pub fn format_visibility(visibility_m: u32) -> String {
    let tenths = (u64::from(visibility_m) + 50) / 100;
    format!("{}.{} km", tenths / 10, tenths % 10)
}

/// Upper-case the first letter of every space-separated word.
pub fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

fn format_time_of_day<Tz>(t: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    t.format("%I:%M %p").to_string()
}

/// Everything the weather card shows, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayModel {
    pub unit: TemperatureUnit,
    pub location: String,
    pub condition: String,
    pub icon_url: String,
    pub icon_alt: String,
    pub current_temperature: String,
    pub feels_like: String,
    pub temp_range: String,
    pub humidity: String,
    pub humidity_status: String,
    pub wind: String,
    pub visibility: String,
    pub visibility_status: String,
    pub sunrise: String,
    pub sunset: String,
}

impl DisplayModel {
    pub fn updates(&self) -> Vec<SlotUpdate> {
        vec![
            SlotUpdate::text(Slot::Condition, &self.condition),
            SlotUpdate::text(Slot::Location, &self.location),
            SlotUpdate::text(Slot::CurrentTemperature, &self.current_temperature),
            SlotUpdate::text(Slot::FeelsLike, &self.feels_like),
            SlotUpdate::text(Slot::TempRange, &self.temp_range),
            SlotUpdate::text(Slot::Humidity, &self.humidity),
            SlotUpdate::text(Slot::HumidityStatus, &self.humidity_status),
            SlotUpdate::text(Slot::Wind, &self.wind),
            SlotUpdate::text(Slot::Visibility, &self.visibility),
            SlotUpdate::text(Slot::VisibilityStatus, &self.visibility_status),
            SlotUpdate::text(Slot::Sunrise, &self.sunrise),
            SlotUpdate::text(Slot::Sunset, &self.sunset),
            SlotUpdate::image(Slot::WeatherIcon, &self.icon_url, &self.icon_alt),
        ]
    }
}

/// Format a fetched bundle for display.
///
/// The day range is derived from Celsius source values; unit conversion is
/// applied afterwards to every temperature.
pub fn compute_display<Tz>(
    bundle: &WeatherBundle,
    prefs: &DisplayPreferences,
    today: NaiveDate,
    tz: &Tz,
) -> DisplayModel
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let snapshot = &bundle.snapshot;
    let unit = prefs.unit;

    let range = day_range(&bundle.forecast, today, tz, snapshot.temperature_c);
    let temp = |c: f64| format_temperature(unit.from_celsius(c), unit);

    let (visibility, visibility_status) = match snapshot.visibility_m {
        Some(m) => (format_visibility(m), visibility_status(m).to_string()),
        None => (MISSING.to_string(), MISSING.to_string()),
    };

    DisplayModel {
        unit,
        location: snapshot.location_label(),
        condition: capitalize_words(&snapshot.condition),
        icon_url: icon_url(&snapshot.icon),
        icon_alt: snapshot.condition.clone(),
        current_temperature: temp(snapshot.temperature_c),
        feels_like: format!("Feels like {}", temp(snapshot.feels_like_c)),
        temp_range: format!("Min {} / Max {}", temp(range.min_c), temp(range.max_c)),
        humidity: format!("{}%", snapshot.humidity_pct),
        humidity_status: humidity_status(snapshot.humidity_pct).to_string(),
        wind: snapshot.wind_speed_mps.to_string(),
        visibility,
        visibility_status,
        sunrise: format_time_of_day(&snapshot.sunrise.with_timezone(tz)),
        sunset: format_time_of_day(&snapshot.sunset.with_timezone(tz)),
    }
}

pub fn uv_updates(uv: &UvDisplay) -> Vec<SlotUpdate> {
    vec![SlotUpdate::text(Slot::UvIndex, &uv.value), SlotUpdate::text(Slot::UvStatus, &uv.status)]
}

/// One `Name, CC` line per candidate; empty text clears the list.
pub fn suggestion_update(list: &SuggestionList) -> SlotUpdate {
    SlotUpdate::text(Slot::Suggestions, list.labels().join("\n"))
}

/// `03:04 PM` and `Monday, October 19, 2026`.
pub fn clock_updates<Tz>(now: &DateTime<Tz>) -> Vec<SlotUpdate>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    vec![
        SlotUpdate::text(Slot::Clock, format_time_of_day(now)),
        SlotUpdate::text(Slot::Date, now.format("%A, %B %-d, %Y").to_string()),
    ]
}
