//! Client-local personalization records persisted in the key-value store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::DetailRecord;

/// Favorited entry as stored locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    /// Catalog id.
    pub id: u32,
    /// Display name captured at favorite time.
    pub name: String,
    /// Artwork URL captured at favorite time.
    #[serde(default)]
    pub image_url: Option<String>,
    /// When the entry was favorited.
    pub added_at: DateTime<Utc>,
}

/// Favorite payload before the store stamps `added_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteDraft {
    /// Catalog id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Artwork URL.
    pub image_url: Option<String>,
}

impl FavoriteDraft {
    /// Stamp the draft into a stored record.
    #[must_use]
    pub fn into_record(self, added_at: DateTime<Utc>) -> FavoriteRecord {
        FavoriteRecord {
            id: self.id,
            name: self.name,
            image_url: self.image_url,
            added_at,
        }
    }
}

impl From<&DetailRecord> for FavoriteDraft {
    fn from(record: &DetailRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            image_url: record.image_url().map(str::to_string),
        }
    }
}

/// Free-text note attached to a catalog id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteRecord {
    /// Catalog id.
    #[serde(rename = "pokemonId")]
    pub id: u32,
    /// Note body (trimmed, never empty).
    #[serde(rename = "note")]
    pub text: String,
    /// Last write time.
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Color scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light scheme.
    Light,
    /// Dark scheme.
    Dark,
    /// Follow the host preference.
    #[default]
    System,
}

impl Theme {
    /// Stored/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Parse a stored value, tolerating JSON quoting.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().trim_matches('"') {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// Next theme in the light → dark → system cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
            Self::System => Self::Light,
        }
    }
}
