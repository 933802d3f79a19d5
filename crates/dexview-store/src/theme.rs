//! Theme preference, stored as a bare string.

use dexview_models::Theme;
use tracing::warn;

use crate::backend::KeyValueStore;
use crate::error::StoreResult;

/// Storage key for the theme preference.
pub const THEME_KEY: &str = "app-theme";

/// Read the theme, falling back to [`Theme::System`].
pub fn load(store: &dyn KeyValueStore) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(raw)) => Theme::parse(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "unknown stored theme; using default");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(err) => {
            warn!(error = %err, "failed to read theme; using default");
            Theme::default()
        }
    }
}

/// Persist `theme`.
///
/// # Errors
///
/// Returns the backend failure.
pub fn save(store: &dyn KeyValueStore, theme: Theme) -> StoreResult<()> {
    store.set(THEME_KEY, theme.as_str())
}
