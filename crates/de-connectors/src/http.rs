//! HTTP utilities for connectors.
//!
//! Wraps `reqwest` with authentication, status mapping, optional retries for
//! reads, `governor` rate limiting and a `moka` response cache.

use crate::traits::{AuthConfig, ConnectorConfig, ConnectorError, ConnectorResult};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use moka::future::Cache as MokaCache;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

type RateLimiterType = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP client with auth, retry, and rate limiting support.
pub struct HttpClient {
    client: Client,
    config: ConnectorConfig,
    rate_limiter: Option<Arc<RateLimiterType>>,
}

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per period.
    pub max_requests: u32,
    pub period: Duration,
    /// Maximum burst size.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            period: Duration::from_secs(60),
            burst_size: 10,
        }
    }
}

impl RateLimitConfig {
    /// `max_requests` per second without bursting.
    pub fn per_second(max_requests: u32) -> Self {
        Self {
            max_requests,
            period: Duration::from_secs(1),
            burst_size: 1,
        }
    }
}

impl HttpClient {
    /// Creates a new HTTP client from connector configuration.
    pub fn new(config: ConnectorConfig) -> ConnectorResult<Self> {
        Self::with_rate_limit(config, None)
    }

    /// Creates a new HTTP client with rate limiting.
    pub fn with_rate_limit(
        config: ConnectorConfig,
        rate_limit: Option<RateLimitConfig>,
    ) -> ConnectorResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in &config.headers {
            if let (Ok(name), Ok(val)) = (
                reqwest::header::HeaderName::try_from(key.as_str()),
                reqwest::header::HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(name, val);
            }
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .default_headers(headers)
            .build()
            .map_err(|e| ConnectorError::ConfigError(e.to_string()))?;

        let rate_limiter = match rate_limit {
            Some(rl) => {
                let per_request = rl
                    .period
                    .checked_div(rl.max_requests)
                    .unwrap_or(rl.period);
                let quota = Quota::with_period(per_request)
                    .ok_or_else(|| {
                        ConnectorError::ConfigError("Invalid rate limit period".to_string())
                    })?
                    .allow_burst(NonZeroU32::new(rl.burst_size).unwrap_or(NonZeroU32::MIN));
                Some(Arc::new(GovernorRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Builds a URL from a path.
    pub fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Executes a GET request with query parameters, retrying per config.
    pub async fn get<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ConnectorResult<Response> {
        let url = self.build_url(path);
        let request = self.client.get(&url).query(query);
        self.execute_with_retry(request).await
    }

    /// Executes a GET request and deserializes the JSON response.
    pub async fn get_json<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> ConnectorResult<T> {
        let response = self.get(path, query).await?;
        self.parse_json_response(response).await
    }

    /// Executes a JSON POST request once.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> ConnectorResult<Response> {
        let url = self.build_url(path);
        let request = self.client.post(&url).json(body);
        self.execute_once(request).await
    }

    /// Executes a JSON POST request once and deserializes the JSON response.
    pub async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> ConnectorResult<R> {
        let response = self.post(path, body).await?;
        self.parse_json_response(response).await
    }

    /// Executes a form-encoded POST request once and deserializes the JSON response.
    pub async fn post_form<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        form: &T,
    ) -> ConnectorResult<R> {
        let url = self.build_url(path);
        let request = self.client.post(&url).form(form);
        let response = self.execute_once(request).await?;
        self.parse_json_response(response).await
    }

    async fn parse_json_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> ConnectorResult<T> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ConnectorError::InvalidResponse(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| {
            ConnectorError::InvalidResponse(format!(
                "Failed to parse response (status {}): {} - Body: {}",
                status,
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Executes a request once with authentication, rate limiting, and error handling.
    async fn execute_once(&self, request: reqwest::RequestBuilder) -> ConnectorResult<Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let request = self.add_auth(request);
        let result = match request.send().await {
            Ok(response) => check_status(response).await,
            Err(e) => Err(map_send_error(e)),
        };
        record_upstream(&self.config.name, result.is_ok());
        result
    }

    /// Executes a request with retries on server errors and transport failures.
    async fn execute_with_retry(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ConnectorResult<Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let request = self.add_auth(request);

        let mut last_error = None;
        let mut delay = Duration::from_millis(100);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!(connector = %self.config.name, attempt, ?delay, "Retrying request");
                sleep(delay).await;
                delay = std::cmp::min(delay * 2, Duration::from_secs(10));
            }

            let request_clone = request
                .try_clone()
                .ok_or_else(|| ConnectorError::Internal("Failed to clone request".to_string()))?;

            match request_clone.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() && attempt < self.config.max_retries {
                        warn!(connector = %self.config.name, %status, "Server error, retrying");
                        last_error = Some(ConnectorError::RequestFailed(format!(
                            "Server error: {}",
                            status
                        )));
                        continue;
                    }

                    let result = check_status(response).await;
                    record_upstream(&self.config.name, result.is_ok());
                    return result;
                }
                Err(e) => {
                    last_error = Some(map_send_error(e));
                    if attempt >= self.config.max_retries {
                        break;
                    }
                }
            }
        }

        record_upstream(&self.config.name, false);
        Err(last_error.unwrap_or_else(|| ConnectorError::Internal("Unknown error".to_string())))
    }

    fn add_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth {
            AuthConfig::None => request,
            AuthConfig::ApiKey { key, header_name } => {
                request.header(header_name, key.expose_secret())
            }
            AuthConfig::BearerToken { token } => {
                request.header("Authorization", format!("Bearer {}", token.expose_secret()))
            }
            AuthConfig::Basic { username, password } => {
                request.basic_auth(username, Some(password.expose_secret()))
            }
        }
    }
}

fn map_send_error(e: reqwest::Error) -> ConnectorError {
    if e.is_timeout() {
        ConnectorError::Timeout(e.to_string())
    } else if e.is_connect() {
        ConnectorError::ConnectionFailed(e.to_string())
    } else {
        ConnectorError::RequestFailed(e.to_string())
    }
}

/// Maps error statuses to connector errors.
async fn check_status(response: Response) -> ConnectorResult<Response> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ConnectorError::RateLimited(retry_after));
    }

    if status.is_client_error() {
        return match status {
            StatusCode::UNAUTHORIZED => {
                Err(ConnectorError::AuthenticationFailed("Unauthorized".into()))
            }
            StatusCode::FORBIDDEN => Err(ConnectorError::AuthorizationDenied("Forbidden".into())),
            StatusCode::NOT_FOUND => Err(ConnectorError::NotFound("Resource not found".into())),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(ConnectorError::RequestFailed(format!(
                    "Client error {}: {}",
                    status,
                    body.chars().take(300).collect::<String>()
                )))
            }
        };
    }

    if status.is_server_error() {
        return Err(ConnectorError::RequestFailed(format!(
            "Server error: {}",
            status
        )));
    }

    Ok(response)
}

fn record_upstream(connector: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(
        "de_upstream_requests_total",
        "connector" => connector.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Response cache using moka for async caching.
pub struct ResponseCache<V: Clone + Send + Sync + 'static> {
    cache: MokaCache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> ResponseCache<V> {
    /// Creates a new cache with the specified TTL and max capacity.
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: String, value: V) {
        self.cache.insert(key, value).await;
    }

    /// Returns the cached value or computes it with a fallible async function.
    /// Errors are not cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: String, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(v) = self.cache.get(&key).await {
            return Ok(v);
        }
        let value = f().await?;
        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }
}

/// Cache key for a coordinate, rounded to about 11 m.
pub fn coordinate_key(latitude: f64, longitude: f64) -> String {
    format!("{:.4},{:.4}", latitude, longitude)
}
