//! Output renderers and formatting helpers for CLI commands.

use std::sync::Arc;

use anyhow::anyhow;
use dexview_models::{DetailRecord, FavoriteRecord, NoteRecord, Theme};
use dexview_view::{ViewMode, ViewSnapshot};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

#[derive(Serialize)]
struct ViewDocument<'a> {
    url: &'a str,
    mode: &'static str,
    has_more: bool,
    error: Option<String>,
    items: Vec<&'a DetailRecord>,
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_view(
    url: &str,
    snapshot: &ViewSnapshot,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&ViewDocument {
            url,
            mode: mode_label(snapshot.mode),
            has_more: snapshot.has_more,
            error: snapshot.error.as_ref().map(ToString::to_string),
            items: snapshot.items.iter().map(AsRef::as_ref).collect(),
        }),
        OutputFormat::Table => {
            println!("view: {} ({})", display_url(url), mode_label(snapshot.mode));
            print_record_table(&snapshot.items);
            if snapshot.is_empty_state() {
                println!("no entries match");
            }
            if snapshot.has_more {
                println!("more available: pass --pages to load further");
            }
            if let Some(error) = &snapshot.error {
                println!("partial result: {error}");
            }
            Ok(())
        }
    }
}

pub(crate) fn render_records(
    records: &[Arc<DetailRecord>],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let items: Vec<&DetailRecord> = records.iter().map(AsRef::as_ref).collect();
            print_json(&items)
        }
        OutputFormat::Table => {
            print_record_table(records);
            if records.is_empty() {
                println!("no entries match");
            }
            Ok(())
        }
    }
}

pub(crate) fn render_detail(
    record: &DetailRecord,
    favorite: bool,
    note: Option<&NoteRecord>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "record": record,
            "favorite": favorite,
            "note": note,
        })),
        OutputFormat::Table => {
            println!("id: {}", record.id);
            println!("name: {}", record.name);
            println!("types: {}", format_categories(record));
            println!("height: {}", format_measure(record.height));
            println!("weight: {}", format_measure(record.weight));
            if let Some(experience) = record.base_experience {
                println!("base experience: {experience}");
            }
            if !record.abilities.is_empty() {
                let names: Vec<&str> = record
                    .abilities
                    .iter()
                    .map(|entry| entry.ability.name.as_str())
                    .collect();
                println!("abilities: {}", names.join(", "));
            }
            for stat in &record.stats {
                println!("  {:<16} {:>4}", stat.stat.name, stat.base_stat);
            }
            if let Some(image) = record.image_url() {
                println!("image: {image}");
            }
            println!("favorite: {}", if favorite { "yes" } else { "no" });
            if let Some(note) = note {
                println!("note: {} (updated {})", note.text, note.updated_at);
            }
            Ok(())
        }
    }
}

pub(crate) fn render_favorites(
    favorites: &[FavoriteRecord],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(favorites),
        OutputFormat::Table => {
            if favorites.is_empty() {
                println!("no favorites yet");
                return Ok(());
            }
            println!("{:>5} {:<24} ADDED", "ID", "NAME");
            for favorite in favorites {
                println!(
                    "{:>5} {:<24} {}",
                    favorite.id,
                    favorite.name,
                    favorite.added_at.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_notes(notes: &[NoteRecord], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(notes),
        OutputFormat::Table => {
            if notes.is_empty() {
                println!("no notes");
            }
            for note in notes {
                println!("#{:<5} {}", note.id, note.text);
            }
            Ok(())
        }
    }
}

pub(crate) fn render_theme(theme: Theme, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "theme": theme })),
        OutputFormat::Table => {
            println!("{}", theme.as_str());
            Ok(())
        }
    }
}

fn print_record_table(records: &[Arc<DetailRecord>]) {
    if records.is_empty() {
        return;
    }
    println!(
        "{:>5} {:<24} {:<18} {:>7} {:>7}",
        "ID", "NAME", "TYPES", "HEIGHT", "WEIGHT"
    );
    for record in records {
        println!(
            "{:>5} {:<24} {:<18} {:>7} {:>7}",
            record.id,
            record.name,
            format_categories(record),
            format_measure(record.height),
            format_measure(record.weight)
        );
    }
}

pub(crate) const fn mode_label(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::Browse => "browse",
        ViewMode::Search => "search",
        ViewMode::Favorites => "favorites",
    }
}

pub(crate) fn display_url(url: &str) -> &str {
    if url.is_empty() { "(defaults)" } else { url }
}

pub(crate) fn format_categories(record: &DetailRecord) -> String {
    let names = record.category_names();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join("/")
    }
}

pub(crate) fn format_measure(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexview_test_support::fixtures::RecordBuilder;

    #[test]
    fn categories_join_in_slot_order() {
        let record = RecordBuilder::new(6, "charizard")
            .category("fire")
            .category("flying")
            .build();
        assert_eq!(format_categories(&record), "fire/flying");
        assert_eq!(format_categories(&RecordBuilder::new(1, "x").build()), "-");
    }

    #[test]
    fn missing_measurements_render_as_dash() {
        assert_eq!(format_measure(None), "-");
        assert_eq!(format_measure(Some(69)), "69");
    }

    #[test]
    fn labels_cover_every_mode() {
        assert_eq!(mode_label(ViewMode::Browse), "browse");
        assert_eq!(mode_label(ViewMode::Search), "search");
        assert_eq!(mode_label(ViewMode::Favorites), "favorites");
        assert_eq!(display_url(""), "(defaults)");
        assert_eq!(display_url("q=char"), "q=char");
    }

    #[test]
    fn renderers_accept_both_formats() {
        let records = vec![Arc::new(RecordBuilder::new(25, "pikachu").height(4).build())];
        for format in [OutputFormat::Table, OutputFormat::Json] {
            render_records(&records, format).expect("records");
            render_detail(&records[0], true, None, format).expect("detail");
            render_theme(Theme::Dark, format).expect("theme");
            render_view("", &ViewSnapshot::default(), format).expect("view");
        }
    }
}
