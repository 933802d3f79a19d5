//! Favorites management against the local store.

use dexview_models::FavoriteDraft;

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_favorites;

pub(crate) fn handle_favorites_list(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    render_favorites(&ctx.personalization.favorites(), format)
}

pub(crate) async fn handle_favorites_add(ctx: &AppContext, id: u32) -> CliResult<()> {
    let draft = draft_for(ctx, id).await?;
    let record = ctx.personalization.add_favorite(draft);
    println!("Added #{} {} to favorites.", record.id, record.name);
    Ok(())
}

pub(crate) fn handle_favorites_remove(ctx: &AppContext, id: u32) {
    if ctx.personalization.remove_favorite(id) {
        println!("Removed #{id} from favorites.");
    } else {
        println!("#{id} was not a favorite.");
    }
}

/// Flip membership; only an addition needs the remote record.
pub(crate) async fn handle_favorites_toggle(ctx: &AppContext, id: u32) -> CliResult<()> {
    if ctx.personalization.is_favorite(id) {
        handle_favorites_remove(ctx, id);
        return Ok(());
    }
    let draft = draft_for(ctx, id).await?;
    let name = draft.name.clone();
    if ctx.personalization.toggle_favorite(draft) {
        println!("Added #{id} {name} to favorites.");
    }
    Ok(())
}

pub(crate) fn handle_favorites_clear(ctx: &AppContext) {
    let count = ctx.personalization.favorite_ids().len();
    ctx.personalization.clear_favorites();
    println!("Cleared {count} favorites.");
}

async fn draft_for(ctx: &AppContext, id: u32) -> CliResult<FavoriteDraft> {
    let record = ctx
        .client
        .get_by_id(id)
        .await
        .map_err(|err| CliError::request(&format!("lookup of #{id}"), &err))?;
    Ok(FavoriteDraft {
        id: record.id,
        name: record.name.clone(),
        image_url: record.image_url().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexview_test_support::fixtures::detail_json;
    use httpmock::prelude::*;

    use crate::client::test_support::context_for;

    #[tokio::test]
    async fn add_records_name_and_artwork_from_the_catalog() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/7");
            then.status(200).json_body(detail_json(7, "squirtle", &["water"]));
        });
        let ctx = context_for(&server);

        handle_favorites_add(&ctx, 7).await.expect("add");

        let favorites = ctx.personalization.favorites();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].name, "squirtle");
        assert_eq!(
            favorites[0].image_url.as_deref(),
            Some("https://img.test/art/7.png")
        );
    }

    #[tokio::test]
    async fn toggle_removes_without_touching_the_network() {
        let server = MockServer::start_async().await;
        let detail = server.mock(|when, then| {
            when.method(GET).path("/pokemon/7");
            then.status(200).json_body(detail_json(7, "squirtle", &["water"]));
        });
        let ctx = context_for(&server);

        handle_favorites_toggle(&ctx, 7).await.expect("add");
        assert!(ctx.personalization.is_favorite(7));
        handle_favorites_toggle(&ctx, 7).await.expect("remove");
        assert!(!ctx.personalization.is_favorite(7));
        detail.assert_calls(1);
    }

    #[tokio::test]
    async fn failed_lookup_leaves_favorites_untouched() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/8");
            then.status(500).body("boom");
        });
        let ctx = context_for(&server);

        let err = handle_favorites_add(&ctx, 8).await.expect_err("lookup fails");
        assert_eq!(err.exit_code(), 3);
        assert!(ctx.personalization.favorites().is_empty());

        handle_favorites_clear(&ctx);
        handle_favorites_list(&ctx, OutputFormat::Json).expect("list");
    }
}
