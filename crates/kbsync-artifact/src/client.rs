//! Artifact catalog HTTP client
//!
//! Provides an authenticated HTTP client for the artifact catalog REST API.
//! Handles bearer and user-context headers, URL construction with proper
//! path-segment encoding, and throttling retries.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kbsync_artifact::client::ArtifactClient;
//! use reqwest::Method;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ArtifactClient::with_base_url(Some("api-token".to_string()), "http://localhost:8080");
//! let response = client
//!     .execute_with_retry(|| client.request(Method::GET, &["v1alpha", "namespaces", "ns", "catalogs"]))
//!     .await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use kbsync_core::config::CatalogConfig;

use crate::ArtifactError;

/// Header carrying the acting user's UID
pub const USER_UID_HEADER: &str = "Instill-User-Uid";

/// Header carrying the requesting principal's UID
pub const REQUESTER_UID_HEADER: &str = "Instill-Requester-Uid";

/// Retry-after used when a 429 response has no usable header
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Longest wait honoured from a Retry-After header
const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

// ============================================================================
// ArtifactClient
// ============================================================================

/// HTTP client for artifact catalog API calls
pub struct ArtifactClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    user_uid: Option<String>,
    requester_uid: Option<String>,
    max_retries: u32,
}

impl ArtifactClient {
    /// Creates a client from the `catalog` configuration section
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            user_uid: config.user_uid.clone(),
            requester_uid: config.requester_uid.clone(),
            max_retries: config.max_retries,
        })
    }

    /// Creates a client with a custom base URL and default settings (useful for testing)
    ///
    /// # Arguments
    /// * `api_token` - Bearer token, if the service requires one
    /// * `base_url` - Base URL for API requests
    pub fn with_base_url(api_token: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_token,
            user_uid: None,
            requester_uid: None,
            max_retries: CatalogConfig::default().max_retries,
        }
    }

    /// Sets the user and requester UIDs sent with every request
    pub fn with_user_context(
        mut self,
        user_uid: Option<String>,
        requester_uid: Option<String>,
    ) -> Self {
        self.user_uid = user_uid;
        self.requester_uid = requester_uid;
        self
    }

    /// Sets how many times a throttled request is retried
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds an absolute URL from path segments, percent-encoding each one
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or cannot carry a path
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL '{}'", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Base URL '{}' cannot have a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Creates an authenticated request builder for the given method and path segments
    ///
    /// Adds the bearer token and user-context headers when configured. An
    /// unusable base URL surfaces as an error when the request is sent.
    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = match self.endpoint(segments) {
            Ok(url) => self.client.request(method, url),
            Err(e) => {
                warn!(error = %e, "Falling back to unencoded URL");
                let url = format!("{}/{}", self.base_url.trim_end_matches('/'), segments.join("/"));
                self.client.request(method, url)
            }
        };
        let builder = match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let builder = match &self.user_uid {
            Some(uid) => builder.header(USER_UID_HEADER, uid),
            None => builder,
        };
        match &self.requester_uid {
            Some(uid) => builder.header(REQUESTER_UID_HEADER, uid),
            None => builder,
        }
    }

    // ========================================================================
    // execute_with_retry - 429 response handling
    // ========================================================================

    /// Sends a request, retrying on HTTP 429 and classifying failures
    ///
    /// `build` is called once per attempt so that request bodies can be
    /// re-sent. On 429 the `Retry-After` header (seconds or HTTP date) is
    /// honoured, up to `max_retries` retries.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] for network failures, for any non-success
    /// status, and when the throttling retry budget is spent.
    pub async fn execute_with_retry<F>(&self, build: F) -> Result<Response, ArtifactError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            let response = build().send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| parse_retry_after(v, DEFAULT_RETRY_AFTER))
                    .unwrap_or(DEFAULT_RETRY_AFTER);

                if attempt >= self.max_retries {
                    warn!(url = %response.url(), attempts = attempt + 1, "429 retry limit exhausted");
                    return Err(ArtifactError::TooManyRequests { retry_after });
                }

                info!(
                    url = %response.url(),
                    attempt,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Received 429, backing off"
                );
                tokio::time::sleep(retry_after).await;
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                debug!(%status, body = %body, "Request failed");
                return Err(ArtifactError::from_status(status, body));
            }

            if attempt > 0 {
                info!(url = %response.url(), attempt, "Request succeeded after retry");
            }
            return Ok(response);
        }
    }
}

/// Parses a `Retry-After` header value (delay-seconds or HTTP date)
///
/// Falls back to `default` when the value cannot be parsed. Values longer
/// than five minutes are capped.
pub fn parse_retry_after(value: &str, default: Duration) -> Duration {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Duration::from_secs(seconds).min(MAX_RETRY_AFTER);
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value.trim()) {
        let wait = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
        return wait
            .to_std()
            .map(|d| d.min(MAX_RETRY_AFTER))
            .unwrap_or(Duration::ZERO);
    }

    warn!(value, "Could not parse Retry-After header, using default");
    default
}
