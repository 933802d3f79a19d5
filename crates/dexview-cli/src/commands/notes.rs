//! Per-entry notes.

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliResult};
use crate::output::render_notes;

pub(crate) fn handle_notes_list(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    render_notes(&ctx.personalization.notes(), format)
}

pub(crate) fn handle_note_get(ctx: &AppContext, id: u32, format: OutputFormat) -> CliResult<()> {
    let notes: Vec<_> = ctx.personalization.note(id).into_iter().collect();
    render_notes(&notes, format)
}

pub(crate) fn handle_note_set(ctx: &AppContext, id: u32, text: &str) {
    match ctx.personalization.set_note(id, text) {
        Some(note) => println!("Saved note for #{}.", note.id),
        None => println!("Cleared note for #{id}."),
    }
}

pub(crate) fn handle_note_remove(ctx: &AppContext, id: u32) {
    if ctx.personalization.remove_note(id) {
        println!("Removed note for #{id}.");
    } else {
        println!("#{id} had no note.");
    }
}
