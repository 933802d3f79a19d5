//! URL state helpers that need neither the network nor the store.

use dexview_view::{ViewMode, parse, serialize};

use crate::cli::OutputFormat;
use crate::client::CliResult;
use crate::output::{display_url, mode_label, print_json};

pub(crate) fn handle_url_normalize(query: &str, format: OutputFormat) -> CliResult<()> {
    let canonical = normalize(query);
    match format {
        OutputFormat::Json => {
            let mode = ViewMode::for_state(&parse(&canonical));
            print_json(&serde_json::json!({
                "query": canonical,
                "mode": mode_label(mode),
            }))
        }
        OutputFormat::Table => {
            println!("{}", display_url(&canonical));
            Ok(())
        }
    }
}

/// Canonical form: parse, then serialize with defaults omitted.
fn normalize(query: &str) -> String {
    serialize(&parse(query))
}
