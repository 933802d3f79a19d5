//! Browse, search, and favorites views driven through the view pipeline.

use anyhow::anyhow;
use dexview_models::{COHORTS, find_cohort};
use dexview_view::{ViewSnapshot, serialize};
use tracing::{info, warn};

use crate::cli::{BrowseArgs, OpenArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_view;

pub(crate) async fn handle_browse(
    ctx: &AppContext,
    args: &BrowseArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let state = args.page_state();
    if let Some(value) = state.filters.cohort.as_deref() {
        ensure_known_cohort(value)?;
    }
    let (url, snapshot) = load_view(ctx, &serialize(&state), args.pages).await?;
    render_view(&url, &snapshot, format)
}

pub(crate) async fn handle_open(
    ctx: &AppContext,
    args: &OpenArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let (url, snapshot) = load_view(ctx, &args.query, args.pages).await?;
    render_view(&url, &snapshot, format)
}

/// Apply `query`, then reveal up to `pages` browse pages.
///
/// A view that failed outright is an error; a partial one is rendered with
/// its error attached.
async fn load_view(
    ctx: &AppContext,
    query: &str,
    pages: u32,
) -> CliResult<(String, ViewSnapshot)> {
    let pipeline = ctx.pipeline();
    let url = pipeline.apply_url(query).await;
    for _ in 1..pages {
        if !pipeline.snapshot().has_more {
            break;
        }
        pipeline.on_sentinel_visible().await;
    }

    let snapshot = pipeline.snapshot();
    if let Some(error) = &snapshot.error {
        if snapshot.items.is_empty() {
            return Err(CliError::failure(anyhow!("failed to load view: {error}")));
        }
        warn!(error = %error, "rendering a partial view");
    }
    info!(url = %url, items = snapshot.items.len(), "view loaded");
    Ok((url, snapshot))
}

fn ensure_known_cohort(value: &str) -> CliResult<()> {
    if find_cohort(value).is_some() {
        return Ok(());
    }
    let known: Vec<&str> = COHORTS.iter().map(|cohort| cohort.value).collect();
    Err(CliError::validation(format!(
        "unknown generation '{value}' (expected one of {})",
        known.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexview_models::FavoriteDraft;
    use dexview_test_support::fixtures::{detail_json, list_json};
    use httpmock::prelude::*;

    use crate::client::test_support::context_for;

    fn mock_details(server: &MockServer, entries: &[(u32, &str, &str)]) {
        for (id, name, category) in entries {
            let path = format!("/pokemon/{id}");
            let body = detail_json(*id, name, &[*category]);
            server.mock(|when, then| {
                when.method(GET).path(path);
                then.status(200).json_body(body);
            });
        }
    }

    #[tokio::test]
    async fn browse_resolves_the_first_page_with_filters_applied() {
        let server = MockServer::start_async().await;
        let listing = server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("limit", "20")
                .query_param("offset", "0");
            then.status(200).json_body(list_json(
                3,
                &[(1, "bulbasaur"), (4, "charmander"), (5, "charmeleon")],
            ));
        });
        mock_details(
            &server,
            &[(1, "bulbasaur", "grass"), (4, "charmander", "fire"), (5, "charmeleon", "fire")],
        );
        let ctx = context_for(&server);
        let args = BrowseArgs {
            category: Some("fire".into()),
            sort_field: "name".into(),
            sort_order: "desc".into(),
            pages: 1,
            ..BrowseArgs::default()
        };

        let (url, snapshot) = load_view(&ctx, &serialize(&args.page_state()), args.pages)
            .await
            .expect("view");

        assert_eq!(url, "sortField=name&sortOrder=desc&type=fire");
        assert_eq!(snapshot.ids(), vec![5, 4]);
        assert!(!snapshot.has_more);
        listing.assert_calls(1);
    }

    #[tokio::test]
    async fn unknown_generation_is_rejected_before_any_request() {
        let server = MockServer::start_async().await;
        let ctx = context_for(&server);
        let args = BrowseArgs {
            generation: Some("42".into()),
            pages: 1,
            ..BrowseArgs::default()
        };

        let err = handle_browse(&ctx, &args, OutputFormat::Table)
            .await
            .expect_err("invalid generation");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("expected one of 1, 2"));
    }

    #[tokio::test]
    async fn failed_first_page_is_a_failure() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon");
            then.status(503).body("maintenance");
        });
        let ctx = context_for(&server);

        let err = load_view(&ctx, "", 1).await.expect_err("page failure");
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("503"));
    }

    #[tokio::test]
    async fn favorites_view_reads_the_local_store() {
        let server = MockServer::start_async().await;
        mock_details(&server, &[(25, "pikachu", "electric")]);
        let ctx = context_for(&server);
        ctx.personalization.add_favorite(FavoriteDraft {
            id: 25,
            name: "pikachu".into(),
            image_url: None,
        });

        let (url, snapshot) = load_view(&ctx, "?favorites=true", 1).await.expect("view");

        assert_eq!(url, "favorites=true");
        assert_eq!(snapshot.ids(), vec![25]);
    }
}
