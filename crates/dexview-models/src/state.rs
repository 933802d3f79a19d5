//! URL-driven page state: query, filters, sort, and page.
//!
//! # Design
//! - `PageState` is the single source of truth for what the view should show.
//! - Sort values outside the recognized set are carried verbatim so a URL
//!   written by a newer client survives a round-trip through an older one.

use std::fmt::{self, Display, Formatter};

/// Field used to order the view list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    /// Display name.
    Name,
    /// Catalog id.
    #[default]
    Id,
    /// First physical measurement.
    Height,
    /// Second physical measurement.
    Weight,
    /// Unrecognized value carried as given.
    Other(String),
}

impl SortField {
    /// Wire representation used in URLs.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Name => "name",
            Self::Id => "id",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::Other(value) => value,
        }
    }

    /// Interpret a URL value; unknown values pass through.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "name" => Self::Name,
            "id" => Self::Id,
            "height" => Self::Height,
            "weight" => Self::Weight,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for SortField {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Direction of the view ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
    /// Unrecognized value carried as given.
    Other(String),
}

impl SortOrder {
    /// Wire representation used in URLs.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::Other(value) => value,
        }
    }

    /// Interpret a URL value; unknown values pass through.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "asc" => Self::Asc,
            "desc" => Self::Desc,
            other => Self::Other(other.to_string()),
        }
    }

    /// Only an explicit `asc` sorts ascending.
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Asc)
    }
}

impl Display for SortOrder {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Sort field plus direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SortSpec {
    /// Field to compare.
    pub field: SortField,
    /// Direction to apply.
    pub order: SortOrder,
}

impl SortSpec {
    /// Build a sort spec.
    #[must_use]
    pub const fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Whether this is the default `id`/`asc` ordering.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Filters applied to the view list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Filters {
    /// Category tag the entries must carry.
    pub category: Option<String>,
    /// Cohort (generation) value selecting an id range.
    pub cohort: Option<String>,
    /// Restrict the view to favorited entries.
    pub favorites_only: bool,
}

impl Filters {
    /// Whether no filter is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none() && self.cohort.is_none() && !self.favorites_only
    }
}

/// Structured description of what should be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageState {
    /// Free-text search query.
    pub query: String,
    /// Active filters.
    pub filters: Filters,
    /// Active ordering.
    pub sort: SortSpec,
    /// 1-based page for the classic paginated mode.
    pub page: u32,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            query: String::new(),
            filters: Filters::default(),
            sort: SortSpec::default(),
            page: 1,
        }
    }
}

impl PageState {
    /// Trimmed query, or `None` when the query is blank.
    #[must_use]
    pub fn active_query(&self) -> Option<&str> {
        let trimmed = self.query.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}
