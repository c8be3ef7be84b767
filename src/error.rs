//! Error handling for the Secret Santa club client

use std::fmt;
use thiserror::Error;

use crate::seasons::AddressFormError;

/// Unified error type for the Secret Santa club client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The requested resource does not exist
    #[error("not found: {detail}")]
    NotFound {
        /// Server-provided explanation, or a synthesized status line
        detail: String,
    },

    /// The backend rejected the request with a human-readable explanation
    #[error("{detail}")]
    Api {
        /// The `detail` field of the error body
        detail: String,
    },

    /// The enrollment form was rejected with per-field errors
    #[error("address form rejected")]
    Validation(AddressFormError),

    /// No viewer session has been resolved, or the viewer is anonymous
    #[error("not authenticated")]
    NotAuthenticated,

    /// The action is not available in the current participation state
    #[error("action not permitted: {0}")]
    NotPermitted(&'static str),
}

impl Error {
    /// Create a new API error from a detail message
    pub fn api<T: fmt::Display>(detail: T) -> Self {
        Error::Api {
            detail: detail.to_string(),
        }
    }

    /// Create a new not-found error from a detail message
    pub fn not_found<T: fmt::Display>(detail: T) -> Self {
        Error::NotFound {
            detail: detail.to_string(),
        }
    }
}
