//! Request dispatcher: the one place HTTP happens.
//!
//! [`ApiClient`] owns the reqwest client, the response cache, the token
//! manager, and a connectivity probe. Every façade call funnels through
//! [`ApiClient::request`], which applies the full pipeline: offline
//! fail-fast, cache consult, token attachment, per-call timeout, outcome
//! classification, and the single 401 refresh-and-replay.
//!
//! Errors are classified into [`ErrorKind`](iyaya_core::ErrorKind) here and
//! nowhere else; downstream code never inspects messages or status codes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use iyaya_config::ClientConfig;
use iyaya_core::{Result, ServiceError};
use reqwest::Method;
use serde_json::Value;

use crate::cache::ResponseCache;
use crate::token::TokenManager;

/// Network reachability probe consulted before every request.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Default probe: assume the network is reachable and let transport errors
/// classify the rest.
pub struct AssumeOnline;

impl Connectivity for AssumeOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Probe driven by the embedder (e.g. a platform reachability callback).
#[derive(Default)]
pub struct ManualConnectivity {
    online: AtomicBool,
}

impl ManualConnectivity {
    #[must_use]
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for ManualConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Per-call request description. Ephemeral; built by façade methods.
pub struct RequestOptions {
    method: Method,
    body: Option<Value>,
    query: Vec<(String, String)>,
    use_auth: bool,
    cache_key: Option<String>,
    cache_ttl: Option<Duration>,
    invalidate: Option<String>,
    timeout: Option<Duration>,
    idempotency_key: Option<String>,
}

impl RequestOptions {
    fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            query: Vec::new(),
            use_auth: true,
            cache_key: None,
            cache_ttl: None,
            invalidate: None,
            timeout: None,
            idempotency_key: None,
        }
    }

    /// A GET request.
    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// A POST request carrying a JSON body.
    #[must_use]
    pub fn post(body: Value) -> Self {
        let mut options = Self::new(Method::POST);
        options.body = Some(body);
        options
    }

    /// A PUT request carrying a JSON body.
    #[must_use]
    pub fn put(body: Value) -> Self {
        let mut options = Self::new(Method::PUT);
        options.body = Some(body);
        options
    }

    /// A PATCH request carrying a JSON body.
    #[must_use]
    pub fn patch(body: Value) -> Self {
        let mut options = Self::new(Method::PATCH);
        options.body = Some(body);
        options
    }

    /// A DELETE request.
    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Marks the call as anonymous; no bearer token is attached.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.use_auth = false;
        self
    }

    /// Adds query parameters.
    #[must_use]
    pub fn with_query(mut self, params: Vec<(String, String)>) -> Self {
        self.query = params;
        self
    }

    /// Serves the response from cache under `key` while fresh, and caches a
    /// successful response for `ttl`. GET only.
    #[must_use]
    pub fn cached(mut self, key: impl Into<String>, ttl: Duration) -> Self {
        self.cache_key = Some(key.into());
        self.cache_ttl = Some(ttl);
        self
    }

    /// Invalidates every cache key containing `prefix` after a successful
    /// write.
    #[must_use]
    pub fn invalidating(mut self, prefix: impl Into<String>) -> Self {
        self.invalidate = Some(prefix.into());
        self
    }

    /// Overrides the configured per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches a client-generated idempotency key, sent as
    /// `X-Idempotency-Key`. Create calls use this so the backend can
    /// de-duplicate if the caller ever re-submits.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    fn is_write(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD)
    }
}

/// The dispatcher shared by every resource façade.
///
/// Explicitly constructed and passed around in an [`Arc`]; the cache map and
/// the token refresh lock are private fields, never module-level state.
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: ResponseCache,
    tokens: TokenManager,
    connectivity: Box<dyn Connectivity>,
}

impl ApiClient {
    /// Client with in-memory token storage and an assume-online probe.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_parts(config, TokenManager::in_memory(), Box::new(AssumeOnline))
    }

    /// Client with explicit token manager and connectivity probe.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or the HTTP
    /// client cannot be constructed.
    pub fn with_parts(
        config: ClientConfig,
        tokens: TokenManager,
        connectivity: Box<dyn Connectivity>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ServiceError::unknown(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ServiceError::unknown(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            cache: ResponseCache::new(),
            tokens,
            connectivity,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// The token manager.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Issues a request through the full pipeline and returns the parsed
    /// JSON body.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ServiceError`]; see the module docs for the
    /// taxonomy.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value> {
        if !self.connectivity.is_online() {
            return Err(ServiceError::network("no network connection"));
        }

        if options.method == Method::GET
            && let Some(key) = &options.cache_key
            && let Some(hit) = self.cache.get(key).await
        {
            return Ok(hit);
        }

        let token = if options.use_auth {
            match self.tokens.get_valid_token(false).await? {
                Some(token) => Some(token),
                // Never attempt the call anonymously when auth was required.
                None => return Err(ServiceError::auth("authentication required")),
            }
        } else {
            None
        };

        let mut response = self.dispatch(path, &options, token.as_deref()).await?;

        if response.status().as_u16() == 401 && options.use_auth {
            tracing::debug!(path, "got 401, attempting token refresh");
            let refreshed = self.tokens.refresh(token.as_deref()).await?;
            match refreshed {
                Some(new_token) => {
                    response = self.dispatch(path, &options, Some(&new_token)).await?;
                    if response.status().as_u16() == 401 {
                        self.tokens.clear()?;
                        return Err(
                            ServiceError::auth("session expired, please sign in again")
                                .with_status(401),
                        );
                    }
                }
                None => {
                    return Err(ServiceError::auth("session expired").with_status(401));
                }
            }
        }

        let value = Self::parse_response(response).await?;

        if options.method == Method::GET {
            if let (Some(key), Some(ttl)) = (&options.cache_key, options.cache_ttl) {
                self.cache.insert(key.clone(), value.clone(), ttl).await;
            }
        } else if options.is_write()
            && let Some(prefix) = &options.invalidate
        {
            self.cache.invalidate(prefix).await;
        }

        Ok(value)
    }

    /// Checks backend health. Anonymous, uncached, never retried.
    ///
    /// # Errors
    ///
    /// Returns a classified error when the backend is unreachable or
    /// unhealthy.
    pub async fn health(&self) -> Result<Value> {
        self.request("health", RequestOptions::get().anonymous())
            .await
    }

    /// Performs one HTTP attempt with the per-call deadline.
    async fn dispatch(
        &self,
        path: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = format!(
            "{}/{}",
            self.config.base_url,
            path.trim_start_matches('/')
        );
        let mut request = self
            .http
            .request(options.method.clone(), &url)
            .header(reqwest::header::ACCEPT, "application/json");

        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(key) = &options.idempotency_key {
            request = request.header("X-Idempotency-Key", key);
        }

        let deadline = options.timeout.unwrap_or(self.config.request_timeout);
        match tokio::time::timeout(deadline, request.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(classify_transport(err)),
            Err(_) => Err(ServiceError::timeout(format!(
                "request to {path} timed out after {deadline:?}"
            ))),
        }
    }

    /// Classifies the HTTP outcome and parses the body.
    async fn parse_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            // A 2xx with an unreadable body is a transport failure, not a
            // success. For error statuses the status code still classifies.
            Err(err) if status.is_success() => return Err(classify_transport(err)),
            Err(_) => String::new(),
        };

        if !status.is_success() {
            let message = extract_error_message(&body)
                .unwrap_or_else(|| format!("request failed with status {status}"));
            tracing::debug!(status = status.as_u16(), message, "request failed");
            return Err(ServiceError::from_status(status.as_u16(), message));
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(ServiceError::from)
    }
}

/// Maps a reqwest transport failure onto the error taxonomy.
fn classify_transport(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::timeout("request timed out").with_source(err)
    } else if err.is_connect() {
        ServiceError::network("cannot reach server").with_source(err)
    } else if err.is_request() || err.is_body() {
        ServiceError::network("request transport failed").with_source(err)
    } else {
        ServiceError::unknown("unexpected transport failure").with_source(err)
    }
}

/// Pulls a human-readable message out of a backend error body.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for key in ["message", "error"] {
        if let Some(message) = value.get(key).and_then(Value::as_str) {
            return Some(message.to_string());
        }
    }
    None
}

/// Shared handle used by the resource façades.
pub type SharedClient = Arc<ApiClient>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_connectivity_toggles() {
        let probe = ManualConnectivity::new(true);
        assert!(probe.is_online());
        probe.set_online(false);
        assert!(!probe.is_online());
    }

    #[test]
    fn error_message_extraction_prefers_message_field() {
        assert_eq!(
            extract_error_message(r#"{"message":"nope","error":"other"}"#).unwrap(),
            "nope"
        );
        assert_eq!(
            extract_error_message(r#"{"error":"broken"}"#).unwrap(),
            "broken"
        );
        assert!(extract_error_message("not json").is_none());
    }

    #[test]
    fn write_detection_by_method() {
        assert!(!RequestOptions::get().is_write());
        assert!(RequestOptions::post(Value::Null).is_write());
        assert!(RequestOptions::delete().is_write());
    }
}
