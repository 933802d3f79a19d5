//! UI-facing view model.

use std::sync::Arc;

use dexview_client::ClientError;
use dexview_models::{DetailRecord, PageState};

/// Which data source currently feeds the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Paged listing with infinite scroll.
    #[default]
    Browse,
    /// Name search results; pagination suppressed.
    Search,
    /// Details of every favorite.
    Favorites,
}

impl ViewMode {
    /// Mode selected by `state`: a query wins over the favorites filter.
    #[must_use]
    pub fn for_state(state: &PageState) -> Self {
        if state.active_query().is_some() {
            Self::Search
        } else if state.filters.favorites_only {
            Self::Favorites
        } else {
            Self::Browse
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewSnapshot {
    /// Active mode.
    pub mode: ViewMode,
    /// Ordered, filtered, deduplicated records.
    pub items: Vec<Arc<DetailRecord>>,
    /// Whether another browse page can be loaded.
    pub has_more: bool,
    /// Whether a fetch for the active mode is in flight.
    pub loading: bool,
    /// Current error for the active mode, if any.
    pub error: Option<ClientError>,
}

impl ViewSnapshot {
    /// Ids of the visible items in order.
    #[must_use]
    pub fn ids(&self) -> Vec<u32> {
        self.items.iter().map(|record| record.id).collect()
    }

    /// Nothing to show and nothing pending.
    #[must_use]
    pub fn is_empty_state(&self) -> bool {
        self.items.is_empty() && !self.loading && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexview_models::Filters;

    #[test]
    fn query_takes_precedence_over_favorites() {
        let mut state = PageState {
            query: " pika ".into(),
            filters: Filters {
                favorites_only: true,
                ..Filters::default()
            },
            ..PageState::default()
        };
        assert_eq!(ViewMode::for_state(&state), ViewMode::Search);

        state.query = "   ".into();
        assert_eq!(ViewMode::for_state(&state), ViewMode::Favorites);

        state.filters.favorites_only = false;
        assert_eq!(ViewMode::for_state(&state), ViewMode::Browse);
    }

    #[test]
    fn default_snapshot_is_an_empty_state() {
        assert!(ViewSnapshot::default().is_empty_state());
    }
}
