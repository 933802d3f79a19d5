//! Typed configuration consumed by the client, view pipeline, and CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};

/// Effective catalog configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Base URL of the remote catalog API (no trailing slash required).
    pub api_base_url: String,
    /// Upper bound for each outbound call.
    pub request_timeout: Duration,
    /// Calls slower than this are logged at `warn`.
    pub slow_call_threshold: Duration,
    /// Entries per list page.
    pub page_size: u32,
    /// Maximum ids per batch dispatch.
    pub batch_size: usize,
    /// Batch window measured from the first queued request.
    pub batch_delay: Duration,
    /// Ids fetched concurrently inside one dispatch.
    pub chunk_size: usize,
    /// Quiet period after the last query edit before a search starts.
    pub search_debounce: Duration,
    /// Maximum number of search matches resolved to full records.
    pub search_limit: usize,
    /// Listing size requested when building the search index.
    pub search_listing_limit: u32,
    /// Highest id kept in browse mode.
    pub max_id: u32,
    /// Resolved/loaded ratio above which the next page is prefetched.
    pub prefetch_ratio: f64,
    /// Directory holding the local personalization store, if configured.
    pub state_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: defaults::API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            slow_call_threshold: Duration::from_millis(defaults::SLOW_CALL_THRESHOLD_MS),
            page_size: defaults::PAGE_SIZE,
            batch_size: defaults::BATCH_SIZE,
            batch_delay: Duration::from_millis(defaults::BATCH_DELAY_MS),
            chunk_size: defaults::CHUNK_SIZE,
            search_debounce: Duration::from_millis(defaults::SEARCH_DEBOUNCE_MS),
            search_limit: defaults::SEARCH_LIMIT,
            search_listing_limit: defaults::SEARCH_LISTING_LIMIT,
            max_id: defaults::MAX_ID,
            prefetch_ratio: defaults::PREFETCH_RATIO,
            state_dir: None,
        }
    }
}

impl CatalogConfig {
    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when the base URL is not an HTTP(S)
    /// URL, a size is zero, the chunk size
    /// exceeds the batch size, or the prefetch ratio falls outside `(0, 1]`.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.api_base_url).map_err(|_| {
            ConfigError::invalid("api_base_url", Some(self.api_base_url.as_str()), "must be a URL")
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "api_base_url",
                Some(self.api_base_url.as_str()),
                "must use http or https",
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::invalid("page_size", None, "must be positive"));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("batch_size", None, "must be positive"));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::invalid("chunk_size", None, "must be positive"));
        }
        if self.chunk_size > self.batch_size {
            return Err(ConfigError::invalid(
                "chunk_size",
                None,
                "must not exceed batch_size",
            ));
        }
        if self.search_limit == 0 {
            return Err(ConfigError::invalid(
                "search_limit",
                None,
                "must be positive",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::invalid(
                "request_timeout",
                None,
                "must be positive",
            ));
        }
        if !(self.prefetch_ratio > 0.0 && self.prefetch_ratio <= 1.0) {
            return Err(ConfigError::invalid(
                "prefetch_ratio",
                None,
                "must be within (0, 1]",
            ));
        }
        Ok(())
    }

    /// Directory for the local store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingHome`] when no directory was configured or
    /// derived from the environment.
    pub fn require_state_dir(&self) -> ConfigResult<&Path> {
        self.state_dir.as_deref().ok_or(ConfigError::MissingHome)
    }

    /// Join a path onto the API base URL, keeping the base path segment.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = CatalogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 20);
        assert_eq!(config.batch_delay, Duration::from_millis(100));
    }

    #[test]
    fn chunk_larger_than_batch_is_rejected() {
        let config = CatalogConfig {
            chunk_size: 50,
            ..CatalogConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidField { ref field, .. }) if field == "chunk_size"
        ));
    }

    #[test]
    fn prefetch_ratio_bounds_are_enforced() {
        let config = CatalogConfig {
            prefetch_ratio: 1.5,
            ..CatalogConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let config = CatalogConfig {
            api_base_url: "ftp://example.org".to_string(),
            ..CatalogConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidField { ref field, .. }) if field == "api_base_url"
        ));
    }

    #[test]
    fn endpoint_preserves_base_path() {
        let config = CatalogConfig::default();
        assert_eq!(
            config.endpoint("/pokemon/25"),
            "https://pokeapi.co/api/v2/pokemon/25"
        );
    }
}
