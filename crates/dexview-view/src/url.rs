//! Query-string codec for [`PageState`].
//!
//! Pure functions. Defaults are omitted when serializing, so the round trip
//! is canonical-equal rather than byte-equal.

use dexview_models::{Filters, PageState, SortField, SortOrder, SortSpec};
use url::form_urlencoded;

const QUERY: &str = "q";
const PAGE: &str = "page";
const SORT_FIELD: &str = "sortField";
const SORT_ORDER: &str = "sortOrder";
const CATEGORY: &str = "type";
const COHORT: &str = "generation";
const FAVORITES: &str = "favorites";

/// Parse a query string (leading `?` optional) into page state.
///
/// Missing values take their defaults; a missing, non-numeric, or zero page
/// becomes `1`. Unrecognized sort values are carried through unchanged.
#[must_use]
pub fn parse(query: &str) -> PageState {
    let mut state = PageState::default();
    let mut field = None;
    let mut order = None;
    let raw = query.strip_prefix('?').unwrap_or(query);

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            QUERY => state.query = value.into_owned(),
            PAGE => state.page = value.parse::<u32>().ok().filter(|page| *page > 0).unwrap_or(1),
            SORT_FIELD if !value.is_empty() => field = Some(SortField::parse(&value)),
            SORT_ORDER if !value.is_empty() => order = Some(SortOrder::parse(&value)),
            CATEGORY if !value.is_empty() => state.filters.category = Some(value.into_owned()),
            COHORT if !value.is_empty() => state.filters.cohort = Some(value.into_owned()),
            FAVORITES => state.filters.favorites_only = value == "true",
            _ => {}
        }
    }

    state.sort = SortSpec::new(field.unwrap_or_default(), order.unwrap_or_default());
    state
}

/// Serialize page state, omitting every value at its default.
#[must_use]
pub fn serialize(state: &PageState) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    if !state.query.is_empty() {
        out.append_pair(QUERY, &state.query);
    }
    if state.page > 1 {
        out.append_pair(PAGE, &state.page.to_string());
    }
    if !state.sort.is_default() {
        out.append_pair(SORT_FIELD, state.sort.field.as_str());
        out.append_pair(SORT_ORDER, state.sort.order.as_str());
    }
    append_filters(&mut out, &state.filters);
    out.finish()
}

fn append_filters(out: &mut form_urlencoded::Serializer<'_, String>, filters: &Filters) {
    if let Some(category) = filters.category.as_deref().filter(|value| !value.is_empty()) {
        out.append_pair(CATEGORY, category);
    }
    if let Some(cohort) = filters.cohort.as_deref().filter(|value| !value.is_empty()) {
        out.append_pair(COHORT, cohort);
    }
    if filters.favorites_only {
        out.append_pair(FAVORITES, "true");
    }
}
