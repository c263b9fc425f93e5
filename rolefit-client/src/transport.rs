//! Shared HTTP transport
//!
//! Every resource module funnels through [`ApiClient`]:
//! - base URL resolution (path segments appended to the configured root)
//! - `Authorization: Bearer` from the token store, read on every request
//! - error normalization into [`ApiError`]
//! - 401 clears the stored token before the error propagates
//!
//! No retry, no backoff, no deduplication: a failure goes straight back to
//! the caller.

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::TokenStore;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client with the default connect timeout.
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Self::build(base_url, Duration::from_secs(10), tokens)
    }

    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Self::build(
            &config.api.base_url,
            Duration::from_secs(config.api.connect_timeout_secs),
            tokens,
        )
    }

    fn build(base_url: &str, connect_timeout: Duration, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("rolefit-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Build)?;

        Ok(Self { http, base_url, tokens })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Absolute URL for a list of path segments. Segments are percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Request builder with the bearer token attached when one is stored.
    ///
    /// An unreadable store counts as no session, as in the route guard, so
    /// a fresh login can still overwrite it.
    pub fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let builder = self.http.request(method, self.url(segments));
        match self.tokens.load() {
            Ok(Some(token)) => Ok(builder.bearer_auth(token)),
            Ok(None) => Ok(builder),
            Err(e) => {
                warn!("token store unreadable, sending without credentials: {e}");
                Ok(builder)
            }
        }
    }

    /// Send and return the raw response, only mapping transport failures.
    ///
    /// A 401 still clears the stored token. The status is not checked, so
    /// callers that bypass JSON unwrapping map failures themselves.
    pub async fn execute_raw(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build().map_err(ApiError::Build)?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let started = Instant::now();

        let response = self.http.execute(request).await.map_err(|e| {
            debug!(%method, %path, "request failed before a response: {e}");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        debug!(%method, %path, status = status.as_u16(), elapsed_ms = started.elapsed().as_millis() as u64, "response");

        if status == StatusCode::UNAUTHORIZED {
            warn!(%method, %path, "backend rejected credentials, clearing session");
            if let Err(e) = self.tokens.clear() {
                error!("failed to clear session token: {e}");
            }
        }

        Ok(response)
    }

    /// Send and fail on any non-2xx status.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.execute_raw(builder).await?;
        ensure_success(response).await
    }

    /// Send and decode a JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.execute(builder).await?;
        let bytes = response.bytes().await.map_err(ApiError::Transport)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send and ignore whatever body comes back (204 or JSON alike).
    pub async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.execute(builder).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.send_json(self.request(Method::GET, segments)?).await
    }

    /// GET with query parameters. `None` fields must be skipped by the
    /// parameter type so they never reach the query string.
    pub async fn get_with<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::GET, segments)?.query(query)).await
    }

    pub async fn post<T, B>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::POST, segments)?.json(body)).await
    }

    /// POST with no body at all.
    pub async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.send_json(self.request(Method::POST, segments)?).await
    }

    /// POST with parameters in the query string and no body.
    pub async fn post_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::POST, segments)?.query(query)).await
    }

    pub async fn put<T, B>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::PUT, segments)?.json(body)).await
    }

    pub async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::DELETE, segments)?).await
    }
}

/// Turn a non-2xx response into [`ApiError::Status`].
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    Err(ApiError::from_status(status, &body))
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ApiError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{other}'"),
            })
        }
    }
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl {
            url: raw.to_string(),
            reason: "URL cannot carry a path".to_string(),
        });
    }
    Ok(url)
}
