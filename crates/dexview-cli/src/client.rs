//! Shared context and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use dexview_client::{CatalogSource, ClientError, ResourceClient};
use dexview_config::CatalogConfig;
use dexview_store::{FileStore, KeyValueStore, PersonalizationStore};
use dexview_view::{PipelineSettings, ViewPipeline};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    /// Failure of a remote call, tagged with what was attempted.
    pub(crate) fn request(action: &str, error: &ClientError) -> Self {
        Self::Failure(anyhow!("{action} failed: {error}"))
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) client: ResourceClient,
    pub(crate) personalization: Arc<PersonalizationStore>,
    pub(crate) settings: PipelineSettings,
}

impl AppContext {
    /// Open the file-backed store under the configured state directory.
    pub(crate) fn open(config: CatalogConfig) -> CliResult<Self> {
        let root = config
            .require_state_dir()
            .map_err(|err| {
                CliError::validation(format!(
                    "{err} (pass --state-dir or set DEXVIEW_STATE_DIR)"
                ))
            })?
            .to_path_buf();
        let store = FileStore::open(root.clone())
            .with_context(|| format!("failed to open state directory {}", root.display()))
            .map_err(CliError::failure)?;
        Self::with_backend(config, Arc::new(store))
    }

    pub(crate) fn with_backend(
        config: CatalogConfig,
        backend: Arc<dyn KeyValueStore>,
    ) -> CliResult<Self> {
        let settings = PipelineSettings::from(&config);
        let client = ResourceClient::new(config)
            .context("failed to build catalog client")
            .map_err(CliError::failure)?;
        Ok(Self {
            client,
            personalization: Arc::new(PersonalizationStore::new(backend)),
            settings,
        })
    }

    /// Fresh view pipeline sharing this context's client and store.
    pub(crate) fn pipeline(&self) -> ViewPipeline {
        let catalog: Arc<dyn CatalogSource> = Arc::new(self.client.clone());
        ViewPipeline::new(catalog, Arc::clone(&self.personalization), self.settings)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn exit_codes_separate_validation_from_failure() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("boom")).exit_code(), 3);
        let request = CliError::request("lookup of #4", &ClientError::Timeout);
        assert_eq!(request.display_message(), "lookup of #4 failed: request timed out");
    }

    #[test]
    fn missing_state_dir_is_a_validation_error() {
        let config = CatalogConfig {
            state_dir: None,
            ..CatalogConfig::default()
        };
        let err = AppContext::open(config).err().expect("missing home");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("--state-dir"));
    }

    #[tokio::test]
    async fn file_store_is_created_under_the_state_dir() {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().join("nested");
        let config = CatalogConfig {
            state_dir: Some(root.clone()),
            ..CatalogConfig::default()
        };
        let ctx = AppContext::open(config).expect("context");
        ctx.personalization.set_note(3, "kept");
        assert!(root.join("pokemon-notes").exists());
    }
}
