//! Subscriber installation for the CLI and embedding front-ends.
//!
//! Logs always go to stderr: command output on stdout stays parseable even
//! with `--output json`. `RUST_LOG` wins over the configured level.

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use tracing::debug;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level used when neither `RUST_LOG` nor a caller override is present.
pub const DEFAULT_LOG_LEVEL: &str = "info";

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    let _ = BUILD_SHA.set(config.build_sha.to_string());

    let output = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let output = match config.format {
        LogFormat::Json => output.json().boxed(),
        LogFormat::Pretty => output.boxed(),
    };

    tracing_subscriber::registry()
        .with(output)
        .with(env_filter(config.level))
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

    debug!(build_sha = build_sha(), format = ?config.format, "logging ready");
    Ok(())
}

/// Build identifier recorded by [`init_logging`], or `dev` before then.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

/// What to install.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Fallback filter directive, e.g. `warn` or `dexview_client=debug`.
    pub level: &'a str,
    /// Output encoding.
    pub format: LogFormat,
    /// Build identifier attached to the first event.
    pub build_sha: &'a str,
}

impl<'a> LoggingConfig<'a> {
    /// Config for `level` with an optional format name (`json`, `pretty`).
    #[must_use]
    pub fn with_format_name(level: &'a str, format: Option<&str>) -> Self {
        Self {
            level,
            format: format.map_or_else(LogFormat::infer, LogFormat::from_name),
            build_sha: build_sha(),
        }
    }
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self::with_format_name(DEFAULT_LOG_LEVEL, None)
    }
}

/// Encoding of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty in debug builds, JSON in release builds.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Parse a format name; unknown names fall back to [`LogFormat::infer`].
    #[must_use]
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" | "text" => Self::Pretty,
            _ => Self::infer(),
        }
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
