//! kbsync Artifact - REST client for the artifact catalog service
//!
//! Provides:
//! - An authenticated HTTP client with throttling (429) retry
//! - An [`ICatalogService`](kbsync_core::ports::ICatalogService) adapter
//!
//! ## Modules
//!
//! - [`client`] - HTTP client (auth headers, URL building, retry)
//! - [`provider`] - Catalog port implementation and wire types

pub mod client;
pub mod provider;

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by the artifact catalog API
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The API token is missing, invalid, or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller may not access the namespace or catalog
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The namespace, catalog, or file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The resource already exists or was modified concurrently
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Throttled, and the retry budget is spent
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Delay the server asked for on the last attempt
        retry_after: Duration,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    /// Any other non-success status
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response body could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ArtifactError {
    /// Classifies a non-success response by status code
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(body),
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::CONFLICT => Self::Conflict(body),
            StatusCode::TOO_MANY_REQUESTS => Self::TooManyRequests {
                retry_after: Duration::ZERO,
            },
            s if s.is_server_error() => Self::ServerError {
                status: s.as_u16(),
                body,
            },
            s => Self::UnexpectedStatus {
                status: s.as_u16(),
                body,
            },
        }
    }
}
