//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid value for '{field}': {reason}")]
    InvalidField {
        /// Environment variable or field name.
        field: String,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// No state directory was configured and no home directory is known.
    #[error("unable to determine a state directory; set DEXVIEW_STATE_DIR")]
    MissingHome,
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, value: Option<&str>, reason: &'static str) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            value: value.map(str::to_string),
            reason,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
