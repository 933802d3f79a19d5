//! Direct catalog lookups: name search and single-entry detail.

use dexview_models::SortSpec;
use dexview_view::derive_view;
use tracing::debug;

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_detail, render_records};

pub(crate) async fn handle_search(
    ctx: &AppContext,
    query: &str,
    format: OutputFormat,
) -> CliResult<()> {
    if query.trim().is_empty() {
        return Err(CliError::validation("search query must not be empty"));
    }
    let results = ctx.client.search_by_name(query).await;
    let ordered = derive_view(results, None, &SortSpec::default());
    debug!(query, results = ordered.len(), "search complete");
    render_records(&ordered, format)
}

pub(crate) async fn handle_show(
    ctx: &AppContext,
    target: &str,
    format: OutputFormat,
) -> CliResult<()> {
    let target = target.trim();
    if target.is_empty() {
        return Err(CliError::validation("an id or name is required"));
    }
    let record = match target.parse::<u32>() {
        Ok(0) => return Err(CliError::validation("ids start at 1")),
        Ok(id) => ctx
            .client
            .get_by_id(id)
            .await
            .map_err(|err| CliError::request(&format!("lookup of #{id}"), &err))?,
        Err(_) => ctx
            .client
            .get_by_name(target)
            .await
            .map_err(|err| CliError::request(&format!("lookup of '{target}'"), &err))?,
    };
    let favorite = ctx.personalization.is_favorite(record.id);
    let note = ctx.personalization.note(record.id);
    render_detail(&record, favorite, note.as_ref(), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexview_test_support::fixtures::{detail_json, list_json};
    use httpmock::prelude::*;

    use crate::client::test_support::context_for;

    #[tokio::test]
    async fn show_by_name_normalizes_the_name() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/pokemon/mr-mime");
            then.status(200).json_body(detail_json(122, "mr-mime", &["psychic"]));
        });
        let ctx = context_for(&server);

        handle_show(&ctx, "  Mr-Mime ", OutputFormat::Json)
            .await
            .expect("show");
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn show_by_id_surfaces_missing_entries_as_failures() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/9999");
            then.status(404).body("Not Found");
        });
        let ctx = context_for(&server);

        let err = handle_show(&ctx, "9999", OutputFormat::Table)
            .await
            .expect_err("missing");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(
            err.display_message(),
            "lookup of #9999 failed: API error (status 404)"
        );
    }

    #[tokio::test]
    async fn blank_and_zero_targets_are_validation_errors() {
        let server = MockServer::start_async().await;
        let ctx = context_for(&server);

        for target in ["   ", "0"] {
            let err = handle_show(&ctx, target, OutputFormat::Table)
                .await
                .expect_err("invalid");
            assert_eq!(err.exit_code(), 2);
        }
        let err = handle_search(&ctx, " ", OutputFormat::Table)
            .await
            .expect_err("blank query");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn search_lists_matches_without_failing_on_errors() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon");
            then.status(200)
                .json_body(list_json(2, &[(4, "charmander"), (1, "bulbasaur")]));
        });
        let detail = server.mock(|when, then| {
            when.method(GET).path("/pokemon/4");
            then.status(200).json_body(detail_json(4, "charmander", &["fire"]));
        });
        let ctx = context_for(&server);

        handle_search(&ctx, "char", OutputFormat::Table)
            .await
            .expect("search");
        detail.assert_calls(1);
    }
}
