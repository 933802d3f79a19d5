//! Record builders and remote payload fixtures.

use dexview_models::{
    DetailRecord, ListItem, NamedResource, PaginatedResponse, Sprites, TypeSlot,
};
use serde_json::{Value, json};

/// Base URL used in fixture resource links.
pub const FIXTURE_API_BASE: &str = "https://pokeapi.co/api/v2";

/// Canonical resource URL for `id`.
#[must_use]
pub fn resource_url(id: u32) -> String {
    format!("{FIXTURE_API_BASE}/pokemon/{id}/")
}

/// List entry pointing at `id`.
#[must_use]
pub fn list_item(id: u32, name: &str) -> ListItem {
    ListItem {
        name: name.to_string(),
        url: resource_url(id),
    }
}

/// Builder for [`DetailRecord`] fixtures.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: DetailRecord,
}

impl RecordBuilder {
    /// Start a record with the given id and name and no measurements.
    #[must_use]
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            record: DetailRecord {
                id,
                name: name.to_string(),
                height: None,
                weight: None,
                base_experience: None,
                sprites: Sprites::default(),
                types: Vec::new(),
                abilities: Vec::new(),
                stats: Vec::new(),
            },
        }
    }

    /// Set the first measurement.
    #[must_use]
    pub fn height(mut self, value: u32) -> Self {
        self.record.height = Some(value);
        self
    }

    /// Set the second measurement.
    #[must_use]
    pub fn weight(mut self, value: u32) -> Self {
        self.record.weight = Some(value);
        self
    }

    /// Append a category tag.
    #[must_use]
    pub fn category(mut self, name: &str) -> Self {
        let slot = u8::try_from(self.record.types.len() + 1).unwrap_or(u8::MAX);
        self.record.types.push(TypeSlot {
            slot,
            kind: NamedResource {
                name: name.to_string(),
                url: String::new(),
            },
        });
        self
    }

    /// Finish the record.
    #[must_use]
    pub fn build(self) -> DetailRecord {
        self.record
    }
}

/// Simple record with a single `normal` category.
#[must_use]
pub fn detail_record(id: u32, name: &str) -> DetailRecord {
    RecordBuilder::new(id, name)
        .height(id)
        .weight(id * 10)
        .category("normal")
        .build()
}

/// Detail payload as the remote API returns it.
#[must_use]
pub fn detail_json(id: u32, name: &str, categories: &[&str]) -> Value {
    let types: Vec<Value> = categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            json!({"slot": index + 1, "type": {"name": category, "url": ""}})
        })
        .collect();
    json!({
        "id": id,
        "name": name,
        "height": 7,
        "weight": 69,
        "base_experience": 64,
        "sprites": {
            "front_default": format!("https://img.test/{id}.png"),
            "other": {"official-artwork": {"front_default": format!("https://img.test/art/{id}.png")}}
        },
        "types": types,
        "abilities": [{"ability": {"name": "overgrow", "url": ""}, "is_hidden": false, "slot": 1}],
        "stats": [{"base_stat": 45, "effort": 0, "stat": {"name": "hp", "url": ""}}]
    })
}

/// List payload with the given total and entries.
#[must_use]
pub fn list_json(count: u32, entries: &[(u32, &str)]) -> Value {
    let results: Vec<Value> = entries
        .iter()
        .map(|(id, name)| json!({"name": name, "url": resource_url(*id)}))
        .collect();
    json!({"count": count, "next": null, "previous": null, "results": results})
}

/// Typed list page with the given total and entries.
#[must_use]
pub fn list_page(count: u32, entries: &[(u32, &str)]) -> PaginatedResponse<ListItem> {
    PaginatedResponse {
        count,
        next: None,
        previous: None,
        results: entries
            .iter()
            .map(|(id, name)| list_item(*id, name))
            .collect(),
    }
}
