//! Core HTTP client for the back-office REST API.
//!
//! The [`BackofficeClient`] struct is the single entry point for every
//! endpoint the onboarding core talks to. It wraps [`reqwest::Client`] with
//! the bearer authentication header and provides typed `get`, `post`, `put`
//! and multipart helpers.
//!
//! Endpoint methods are added to `BackofficeClient` via `impl` blocks in the
//! [`crate::api`] module.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::constants::{API_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{ApiErrorBody, OnboardError, Result};

/// Core HTTP client for the back-office REST API.
///
/// Injects the bearer token into every request. The header value is built
/// once at construction time.
///
/// # Example
///
/// ```no_run
/// use wealth_onboard::client::BackofficeClient;
///
/// # #[tokio::main]
/// # async fn main() -> wealth_onboard::error::Result<()> {
/// let client = BackofficeClient::new("your-access-token")?;
/// // client.get::<MyResponse>("/investors/by-unique-id/MA0001").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BackofficeClient {
    http: reqwest::Client,
    /// Base URL for REST API requests (defaults to [`API_BASE_URL`]).
    base_url: String,
    /// Pre-built `Authorization` header value.
    auth_header: HeaderValue,
}

impl BackofficeClient {
    /// Create a new client against the default base URL.
    pub fn new(access_token: impl AsRef<str>) -> Result<Self> {
        Self::with_base_url(access_token, API_BASE_URL)
    }

    /// Create a new client pointing at a custom base URL.
    pub fn with_base_url(access_token: impl AsRef<str>, base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig {
            base_url: base_url.into(),
            access_token: access_token.as_ref().to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Create a client from a resolved [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .default_headers(Self::default_headers())
            .timeout(config.timeout)
            .build()?;

        let auth_header = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| {
                OnboardError::InvalidArgument("access token contains invalid header characters".into())
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            auth_header,
        })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Generic HTTP helpers
    // -----------------------------------------------------------------------

    /// Perform a GET request and deserialize the JSON response.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let resp = self.http.get(&url).headers(self.auth_headers()).send().await?;

        self.handle_response(resp).await
    }

    /// Perform a GET request, mapping `404 Not Found` to `Ok(None)`.
    ///
    /// When `no_cache` is set the request asks every intermediary to skip
    /// its cached copy.
    pub async fn get_optional<R: DeserializeOwned>(&self, path: &str, no_cache: bool) -> Result<Option<R>> {
        let url = self.url(path);
        tracing::debug!(%url, no_cache, "GET (optional)");

        let mut req = self.http.get(&url).headers(self.auth_headers());
        if no_cache {
            req = req
                .header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))
                .header(header::PRAGMA, HeaderValue::from_static("no-cache"));
        }
        let resp = req.send().await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(%url, "not found");
            return Ok(None);
        }
        self.handle_response(resp).await.map(Some)
    }

    /// Perform a POST request with a JSON body and deserialize the response.
    pub async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");

        let resp = self
            .http
            .post(&url)
            .headers(self.auth_headers())
            .json(body)
            .send()
            .await?;

        self.handle_response(resp).await
    }

    /// Perform a PUT request with a JSON body and deserialize the response.
    pub async fn put<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = self.url(path);
        tracing::debug!(%url, "PUT");

        let resp = self
            .http
            .put(&url)
            .headers(self.auth_headers())
            .json(body)
            .send()
            .await?;

        self.handle_response(resp).await
    }

    /// Perform a multipart POST and deserialize the JSON response.
    pub async fn post_multipart<R: DeserializeOwned>(&self, path: &str, form: Form) -> Result<R> {
        let url = self.url(path);
        tracing::debug!(%url, "POST (multipart)");

        let resp = self
            .http
            .post(&url)
            .headers(self.auth_headers())
            .multipart(form)
            .send()
            .await?;

        self.handle_response(resp).await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Build the full URL from a path segment.
    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Default headers applied to every request. `Content-Type` is left to
    /// the body builder so JSON and multipart requests both get theirs.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Per-request auth headers built from the cached [`HeaderValue`].
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(header::AUTHORIZATION, self.auth_header.clone());
        headers
    }

    /// Read a response, returning either the deserialized body or an
    /// [`OnboardError`].
    async fn handle_response<R: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<R> {
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if status.is_success() {
            serde_json::from_slice(&bytes).map_err(OnboardError::Json)
        } else {
            let body = String::from_utf8_lossy(&bytes);
            tracing::warn!(%status, "request failed");
            Err(parse_error_body(status, &body))
        }
    }
}

/// Try to parse the API's JSON error structure; fall back to a raw HTTP
/// status error.
pub(crate) fn parse_error_body(status: reqwest::StatusCode, body: &str) -> OnboardError {
    if let Ok(api_err) = serde_json::from_str::<ApiErrorBody>(body) {
        if api_err.code.is_some() || api_err.message.is_some() || !api_err.errors.is_empty() {
            return OnboardError::Api(api_err);
        }
    }
    OnboardError::HttpStatus {
        status,
        body: body.to_owned(),
    }
}

/// Percent-encode a single path segment. Spaces become `%20`, never `+`.
pub fn path_segment(raw: &str) -> String {
    urlencoding::encode(raw.trim()).into_owned()
}
