//! Failure taxonomy for catalog requests.
//!
//! # Design
//! - Errors are `Clone` so one batch failure can reject every waiting caller.
//! - Supersession is an error variant here but never reaches the UI: the
//!   client boundary turns it into "no result" and callers use
//!   [`ClientError::is_canceled`] to ignore stragglers.

use thiserror::Error;

/// Result alias for catalog requests.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by catalog requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The remote could not be reached (DNS, connect, reset).
    #[error("network error")]
    Network {
        /// Transport error detail.
        message: String,
    },
    /// The remote answered with a non-2xx status.
    #[error("API error (status {status})")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body as text.
        body: String,
    },
    /// The call exceeded its time budget.
    #[error("request timed out")]
    Timeout,
    /// A newer request under the same key superseded this one.
    #[error("request canceled")]
    Canceled,
    /// A batch returned fewer results than requested ids.
    #[error("no result for id {id}")]
    NotFound {
        /// Id that received no result.
        id: u32,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response")]
    Decode {
        /// Decoder error detail.
        message: String,
    },
    /// The batch worker has shut down.
    #[error("request batcher is closed")]
    BatcherClosed,
}

impl ClientError {
    /// Whether this error only reflects supersession.
    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// HTTP status carried by API errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify a transport-level failure.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}
