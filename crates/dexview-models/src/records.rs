//! Remote catalog payloads: paginated listings and full detail records.

use serde::{Deserialize, Serialize};

/// Ids above this bound belong to alternate forms and are not catalog entries.
const FORM_ID_FLOOR: u32 = 10_000;

/// Paginated envelope returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginatedResponse<T> {
    /// Total number of entries the remote reports for the listing.
    pub count: u32,
    /// URL of the next page, when one exists.
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page, when one exists.
    #[serde(default)]
    pub previous: Option<String>,
    /// Entries on this page.
    pub results: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    /// Empty page that still reports the total `count`.
    #[must_use]
    pub const fn empty(count: u32) -> Self {
        Self {
            count,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

/// Minimal reference returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListItem {
    /// Display name.
    pub name: String,
    /// Canonical resource URL; the id is its last numeric segment.
    pub url: String,
}

impl ListItem {
    /// Catalog id parsed from [`ListItem::url`] (`0` when absent or out of range).
    #[must_use]
    pub fn id(&self) -> u32 {
        extract_id_from_url(&self.url)
    }
}

/// Parse the trailing numeric segment of a resource URL.
///
/// Returns `0` when no numeric segment exists or when the id belongs to an
/// alternate form (above 10000).
#[must_use]
pub fn extract_id_from_url(url: &str) -> u32 {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .filter(|id| *id <= FORM_ID_FLOOR)
        .unwrap_or(0)
}

/// Name plus URL pair used for nested references.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedResource {
    /// Resource name.
    pub name: String,
    /// Resource URL.
    #[serde(default)]
    pub url: String,
}

/// Full entity record keyed by integer id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailRecord {
    /// Catalog id (1-based).
    pub id: u32,
    /// Display name.
    pub name: String,
    /// First physical measurement (decimetres).
    #[serde(default)]
    pub height: Option<u32>,
    /// Second physical measurement (hectograms).
    #[serde(default)]
    pub weight: Option<u32>,
    /// Experience yield, when the remote provides it.
    #[serde(default)]
    pub base_experience: Option<u32>,
    /// Artwork references.
    #[serde(default)]
    pub sprites: Sprites,
    /// Ordered category tags.
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    /// Ordered capability tags.
    #[serde(default)]
    pub abilities: Vec<Ability>,
    /// Named numeric statistics.
    #[serde(default)]
    pub stats: Vec<Stat>,
}

impl DetailRecord {
    /// Preferred artwork URL: official artwork, falling back to the default sprite.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.sprites
            .other
            .official_artwork
            .front_default
            .as_deref()
            .or(self.sprites.front_default.as_deref())
    }

    /// Whether any category tag matches `category` exactly.
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.types.iter().any(|slot| slot.kind.name == category)
    }

    /// Category tag names in slot order.
    #[must_use]
    pub fn category_names(&self) -> Vec<&str> {
        self.types.iter().map(|slot| slot.kind.name.as_str()).collect()
    }
}

/// Artwork references for a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sprites {
    /// Default front sprite.
    #[serde(default)]
    pub front_default: Option<String>,
    /// Shiny front sprite.
    #[serde(default)]
    pub front_shiny: Option<String>,
    /// Alternate artwork sets.
    #[serde(default)]
    pub other: OtherSprites,
}

/// Alternate artwork sets nested under `sprites.other`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OtherSprites {
    /// Official artwork set.
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Artwork,
}

/// Single artwork entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artwork {
    /// Front-facing image URL.
    #[serde(default)]
    pub front_default: Option<String>,
}

/// Category tag with its display slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeSlot {
    /// Slot position (1-based).
    pub slot: u8,
    /// Category reference.
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

/// Capability tag, possibly hidden.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ability {
    /// Capability reference.
    pub ability: NamedResource,
    /// Whether the capability is hidden.
    #[serde(default)]
    pub is_hidden: bool,
    /// Slot position (1-based).
    pub slot: u8,
}

/// Named numeric statistic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stat {
    /// Base value.
    pub base_stat: u32,
    /// Effort yield.
    #[serde(default)]
    pub effort: u32,
    /// Statistic reference.
    pub stat: NamedResource,
}
