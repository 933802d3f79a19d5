//! Environment overrides layered over [`CatalogConfig::default`].

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::defaults::STATE_DIR_NAME;
use crate::error::{ConfigError, ConfigResult};
use crate::model::CatalogConfig;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "DEXVIEW_";

const API_URL: &str = "DEXVIEW_API_URL";
const TIMEOUT_SECS: &str = "DEXVIEW_TIMEOUT_SECS";
const PAGE_SIZE: &str = "DEXVIEW_PAGE_SIZE";
const BATCH_SIZE: &str = "DEXVIEW_BATCH_SIZE";
const BATCH_DELAY_MS: &str = "DEXVIEW_BATCH_DELAY_MS";
const CHUNK_SIZE: &str = "DEXVIEW_CHUNK_SIZE";
const SEARCH_LIMIT: &str = "DEXVIEW_SEARCH_LIMIT";
const SEARCH_DEBOUNCE_MS: &str = "DEXVIEW_SEARCH_DEBOUNCE_MS";
const MAX_ID: &str = "DEXVIEW_MAX_ID";
const STATE_DIR: &str = "DEXVIEW_STATE_DIR";

/// Load configuration from the process environment.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when an override fails to parse or the
/// resulting configuration fails validation.
pub fn load_from_env() -> ConfigResult<CatalogConfig> {
    load_from_lookup(|name| std::env::var(name).ok())
}

/// Load configuration using `lookup` to resolve variables.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when an override fails to parse or the
/// resulting configuration fails validation.
pub fn load_from_lookup<F>(lookup: F) -> ConfigResult<CatalogConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = CatalogConfig::default();
    let read = |name: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(url) = read(API_URL) {
        config.api_base_url = url;
    }
    if let Some(secs) = parse_var::<u64>(TIMEOUT_SECS, read(TIMEOUT_SECS))? {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(size) = parse_var::<u32>(PAGE_SIZE, read(PAGE_SIZE))? {
        config.page_size = size;
    }
    if let Some(size) = parse_var::<usize>(BATCH_SIZE, read(BATCH_SIZE))? {
        config.batch_size = size;
    }
    if let Some(millis) = parse_var::<u64>(BATCH_DELAY_MS, read(BATCH_DELAY_MS))? {
        config.batch_delay = Duration::from_millis(millis);
    }
    if let Some(size) = parse_var::<usize>(CHUNK_SIZE, read(CHUNK_SIZE))? {
        config.chunk_size = size;
    }
    if let Some(limit) = parse_var::<usize>(SEARCH_LIMIT, read(SEARCH_LIMIT))? {
        config.search_limit = limit;
    }
    if let Some(millis) = parse_var::<u64>(SEARCH_DEBOUNCE_MS, read(SEARCH_DEBOUNCE_MS))? {
        config.search_debounce = Duration::from_millis(millis);
    }
    if let Some(max_id) = parse_var::<u32>(MAX_ID, read(MAX_ID))? {
        config.max_id = max_id;
    }
    config.state_dir = read(STATE_DIR).map(PathBuf::from).or_else(|| {
        read("XDG_DATA_HOME")
            .map(|base| PathBuf::from(base).join(STATE_DIR_NAME))
            .or_else(|| {
                read("HOME").map(|home| {
                    PathBuf::from(home)
                        .join(".local")
                        .join("share")
                        .join(STATE_DIR_NAME)
                })
            })
    });

    config.validate()?;
    debug!(
        api = %config.api_base_url,
        page_size = config.page_size,
        batch_size = config.batch_size,
        "catalog configuration loaded"
    );
    Ok(config)
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>) -> ConfigResult<Option<T>> {
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| ConfigError::invalid(name, Some(raw.as_str()), "must be a number"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = load_from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = load_from_lookup(lookup_from(&[
            (API_URL, "http://127.0.0.1:9000/api"),
            (TIMEOUT_SECS, "5"),
            (PAGE_SIZE, "10"),
            (BATCH_DELAY_MS, " 25 "),
            (SEARCH_DEBOUNCE_MS, "0"),
            (STATE_DIR, "/tmp/dexview-state"),
        ]))
        .expect("overrides");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.page_size, 10);
        assert_eq!(config.batch_delay, Duration::from_millis(25));
        assert!(config.search_debounce.is_zero());
        assert_eq!(
            config.require_state_dir().expect("state dir"),
            std::path::Path::new("/tmp/dexview-state")
        );
    }

    #[test]
    fn state_dir_falls_back_to_home() {
        let config = load_from_lookup(lookup_from(&[("HOME", "/home/ash")])).expect("home");
        assert_eq!(
            config.state_dir,
            Some(PathBuf::from("/home/ash/.local/share/dexview"))
        );
        let bare = load_from_lookup(lookup_from(&[])).expect("bare");
        assert_eq!(bare.require_state_dir(), Err(ConfigError::MissingHome));
    }

    #[test]
    fn unparsable_numbers_are_reported() {
        let err = load_from_lookup(lookup_from(&[(BATCH_SIZE, "many")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidField {
                field: BATCH_SIZE.to_string(),
                value: Some("many".to_string()),
                reason: "must be a number",
            }
        );
    }

    #[test]
    fn validation_runs_after_overrides() {
        let err = load_from_lookup(lookup_from(&[(PAGE_SIZE, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { field, .. } if field == "page_size"));
    }
}
