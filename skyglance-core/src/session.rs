//! Session state and the operations that drive it.
//!
//! [`WeatherSession`] is the single writer of [`SessionState`]. Requests may
//! overlap; each one takes a [`Ticket`] for its resource and a completion is
//! applied only while its ticket is still the latest, so a slow earlier
//! response can never overwrite a newer one.

use chrono::{DateTime, Local, TimeZone};
use parking_lot::{Mutex, MutexGuard};
use std::fmt::Display;
use tracing::{debug, info, warn};

use crate::{
    display::{
        DisplayModel, RenderTarget, clock_updates, compute_display, render, suggestion_update,
        uv_updates,
    },
    error::WeatherError,
    fetch::{fetch_weather, reverse_resolve},
    geolocation::Geolocation,
    model::{
        CitySuggestion, Coordinates, DisplayPreferences, LocationQuery, SuggestionList,
        WeatherBundle,
    },
    provider::WeatherProvider,
    suggest::{should_query, suggest_cities},
    units::TemperatureUnit,
    uv::{UvDisplay, fetch_uv},
};

/// Kinds of request that supersede earlier requests of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Weather,
    UvIndex,
    Suggestions,
}

impl Resource {
    fn index(self) -> usize {
        match self {
            Resource::Weather => 0,
            Resource::UvIndex => 1,
            Resource::Suggestions => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    resource: Resource,
    seq: u64,
}

impl Ticket {
    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Monotonic per-resource request counters.
#[derive(Debug, Clone, Default)]
pub struct RequestGenerations {
    latest: [u64; 3],
}

impl RequestGenerations {
    pub fn issue(&mut self, resource: Resource) -> Ticket {
        let seq = &mut self.latest[resource.index()];
        *seq += 1;
        Ticket { resource, seq: *seq }
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest[ticket.resource.index()] == ticket.seq
    }
}

/// Result of an operation whose completion may have been overtaken.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Applied(T),
    /// A newer request for the same resource was issued first; nothing changed.
    Superseded,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(v) => Some(v),
            Outcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub weather: Option<WeatherBundle>,
    pub uv: Option<UvDisplay>,
    pub prefs: DisplayPreferences,
    pub suggestions: SuggestionList,
    /// Text currently in the search box.
    pub input: String,
    generations: RequestGenerations,
}

pub struct WeatherSession<P, R> {
    provider: P,
    state: Mutex<SessionState>,
    target: Mutex<R>,
}

impl<P, R> WeatherSession<P, R>
where
    P: WeatherProvider,
    R: RenderTarget,
{
    pub fn new(provider: P, target: R, prefs: DisplayPreferences) -> Self {
        Self {
            provider,
            state: Mutex::new(SessionState { prefs, ..SessionState::default() }),
            target: Mutex::new(target),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock()
    }

    pub fn target(&self) -> MutexGuard<'_, R> {
        self.target.lock()
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.state.lock().prefs.unit
    }

    /// Look up a city by name and show it.
    pub async fn search(&self, city: &str) -> Result<Outcome<DisplayModel>, WeatherError> {
        self.load(LocationQuery::city(city.trim())).await
    }

    /// Enter pressed in the search box.
    pub async fn submit(&self, input: &str) -> Result<Outcome<DisplayModel>, WeatherError> {
        self.clear_suggestions(input);
        self.search(input).await
    }

    /// Look up a position directly, without resolving it to a city first.
    pub async fn search_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<Outcome<DisplayModel>, WeatherError> {
        self.load(LocationQuery::Coordinates(coordinates)).await
    }

    /// Ask the platform where we are, resolve that to a city, and show it.
    ///
    /// The weather ticket is taken before the position is requested, so a
    /// search started while the platform is still answering supersedes it.
    pub async fn locate(
        &self,
        geolocation: &dyn Geolocation,
    ) -> Result<Outcome<DisplayModel>, WeatherError> {
        let ticket = self.state.lock().generations.issue(Resource::Weather);

        let resolved = match geolocation.current_position().await {
            Ok(coordinates) => reverse_resolve(&self.provider, coordinates).await,
            Err(e) => Err(WeatherError::from(e)),
        };

        if !self.state.lock().generations.is_latest(ticket) {
            debug!(seq = ticket.seq, "dropping superseded location lookup");
            return Ok(Outcome::Superseded);
        }

        match resolved {
            Ok(city) => {
                info!(%city, "position resolved");
                self.load_with(ticket, LocationQuery::city(city.trim())).await
            }
            Err(e) => {
                warn!(error = %e, "locating failed");
                self.target.lock().alert(e.user_message());
                Err(e)
            }
        }
    }

    async fn load(&self, query: LocationQuery) -> Result<Outcome<DisplayModel>, WeatherError> {
        let ticket = self.state.lock().generations.issue(Resource::Weather);
        self.load_with(ticket, query).await
    }

    async fn load_with(
        &self,
        ticket: Ticket,
        query: LocationQuery,
    ) -> Result<Outcome<DisplayModel>, WeatherError> {
        debug!(%query, seq = ticket.seq, "weather lookup started");

        let bundle = match fetch_weather(&self.provider, &query).await {
            Ok(bundle) => bundle,
            Err(e) => {
                if !self.state.lock().generations.is_latest(ticket) {
                    debug!(error = %e, seq = ticket.seq, "dropping failure of superseded lookup");
                    return Ok(Outcome::Superseded);
                }
                warn!(error = %e, %query, "weather lookup failed");
                self.target.lock().alert(e.user_message());
                return Err(e);
            }
        };

        let (model, coordinates) = {
            let mut state = self.state.lock();
            if !state.generations.is_latest(ticket) {
                debug!(%query, seq = ticket.seq, "dropping superseded weather result");
                return Ok(Outcome::Superseded);
            }

            let model = local_display(&bundle, &state.prefs);
            let coordinates = bundle.snapshot.coordinates;
            state.weather = Some(bundle);
            render(&mut *self.target.lock(), &model.updates());
            (model, coordinates)
        };
        info!(location = %model.location, "weather updated");

        self.refresh_uv(coordinates).await;
        Ok(Outcome::Applied(model))
    }

    /// Fetch and show the UV index. Failures show placeholders.
    pub async fn refresh_uv(&self, coordinates: Coordinates) -> Outcome<UvDisplay> {
        let ticket = self.state.lock().generations.issue(Resource::UvIndex);

        let uv = fetch_uv(&self.provider, coordinates).await;

        let mut state = self.state.lock();
        if !state.generations.is_latest(ticket) {
            debug!(seq = ticket.seq, "dropping superseded UV result");
            return Outcome::Superseded;
        }
        state.uv = Some(uv.clone());
        render(&mut *self.target.lock(), &uv_updates(&uv));
        Outcome::Applied(uv)
    }

    /// Flip °C/°F and redraw from the stored data. Never fetches.
    pub fn toggle_units(&self) -> TemperatureUnit {
        let mut state = self.state.lock();
        let unit = state.prefs.unit.toggled();
        self.apply_unit(&mut state, unit);
        unit
    }

    pub fn set_unit(&self, unit: TemperatureUnit) {
        let mut state = self.state.lock();
        self.apply_unit(&mut state, unit);
    }

    fn apply_unit(&self, state: &mut SessionState, unit: TemperatureUnit) {
        state.prefs.unit = unit;

        if let Some(bundle) = &state.weather {
            let model = local_display(bundle, &state.prefs);
            render(&mut *self.target.lock(), &model.updates());
        }
    }

    /// Recompute suggestions for the text now in the search box.
    pub async fn suggest(&self, input: &str) -> Outcome<SuggestionList> {
        let ticket = {
            let mut state = self.state.lock();
            state.input = input.to_string();
            state.generations.issue(Resource::Suggestions)
        };

        let list = if should_query(input) {
            suggest_cities(&self.provider, input).await
        } else {
            SuggestionList::default()
        };

        let mut state = self.state.lock();
        if !state.generations.is_latest(ticket) {
            return Outcome::Superseded;
        }
        state.suggestions = list.clone();
        render(&mut *self.target.lock(), &[suggestion_update(&list)]);
        Outcome::Applied(list)
    }

    /// Pick a candidate: fill the search box with its name and look it up.
    pub async fn select_suggestion(
        &self,
        candidate: &CitySuggestion,
    ) -> Result<Outcome<DisplayModel>, WeatherError> {
        self.clear_suggestions(&candidate.name);
        self.search(&candidate.name).await
    }

    fn clear_suggestions(&self, input: &str) {
        let mut state = self.state.lock();
        state.input = input.to_string();
        state.suggestions.clear();
        // Invalidates any lookup still in flight.
        state.generations.issue(Resource::Suggestions);
        render(&mut *self.target.lock(), &[suggestion_update(&state.suggestions)]);
    }

    pub fn tick_clock<Tz>(&self, now: &DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        render(&mut *self.target.lock(), &clock_updates(now));
    }
}

fn local_display(bundle: &WeatherBundle, prefs: &DisplayPreferences) -> DisplayModel {
    let today = Local::now().date_naive();
    compute_display(bundle, prefs, today, &Local)
}
