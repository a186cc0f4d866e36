//! City autosuggest.

use tracing::debug;

use crate::{model::SuggestionList, provider::WeatherProvider};

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 5;

/// Whether `input` is long enough to be worth a geocoding request.
pub fn should_query(input: &str) -> bool {
    input.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Look up cities matching `input`.
///
/// Short input and lookup failures both yield an empty list; suggestions are
/// a convenience and never surface errors.
pub async fn suggest_cities<P>(provider: &P, input: &str) -> SuggestionList
where
    P: WeatherProvider + ?Sized,
{
    let prefix = input.trim();
    if !should_query(prefix) {
        return SuggestionList::default();
    }

    match provider.geocode(prefix, MAX_SUGGESTIONS).await {
        Ok(mut items) => {
            items.truncate(MAX_SUGGESTIONS);
            SuggestionList { items }
        }
        Err(e) => {
            debug!(error = %e, prefix, "city suggestion lookup failed");
            SuggestionList::default()
        }
    }
}
