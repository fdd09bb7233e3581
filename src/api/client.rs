use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::ApiError;
use crate::config::{CacheConfig, RateLimitConfig, SchoolHealthConfig};
use crate::observability::{ApiMetrics, OperationTimer};

/// Paced, caching HTTP client for the school health REST API.
///
/// Every request waits on a token-bucket limiter first. Successful GET
/// responses are cached for a short TTL; any write drops the cached entries
/// of the resource it touched.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    cache: Cache<String, serde_json::Value>,
    metrics: Arc<ApiMetrics>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .field("cached_entries", &self.cache.entry_count())
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
        rate_limit: &RateLimitConfig,
        cache: &CacheConfig,
    ) -> Result<Self, ApiError> {
        let trimmed = base_url.trim_end_matches('/');
        Url::parse(trimmed).map_err(|_| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;

        let per_second = NonZeroU32::new(rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(rate_limit.burst_capacity).unwrap_or(per_second);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst)));

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(cache.max_capacity)
            .time_to_live(Duration::from_secs(cache.ttl_seconds))
            .build();

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            token,
            rate_limiter,
            cache,
            metrics: Arc::new(ApiMetrics::new()),
        })
    }

    pub fn from_config(config: &SchoolHealthConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.api.base_url,
            config.api.token.clone(),
            Duration::from_secs(config.api.timeout_seconds),
            &config.rate_limit,
            &config.cache,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metrics(&self) -> &ApiMetrics {
        &self.metrics
    }

    /// GET and decode JSON, answering from the cache when possible.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        if let Some(cached) = self.cache.get(path).await {
            self.metrics.record_cache_hit();
            debug!(path, "Cache hit");
            if let Ok(value) = serde_json::from_value(cached) {
                return Ok(value);
            }
        }
        self.metrics.record_cache_miss();

        let body = self.send(self.request(Method::GET, path)).await?;
        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse {
            message: format!("GET {path}: {e}"),
        })?;
        let decoded = serde_json::from_value(value.clone()).map_err(|e| ApiError::InvalidResponse {
            message: format!("GET {path}: {e}"),
        })?;
        self.cache.insert(path.to_string(), value).await;
        Ok(decoded)
    }

    /// PUT with optional query parameters and JSON body. The response body is
    /// not interpreted; several endpoints answer with plain text.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let mut request = self.request(Method::PUT, path);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await?;
        self.invalidate_resource(path).await;
        Ok(())
    }

    /// POST a JSON body and decode the JSON answer.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let text = self.send(self.request(Method::POST, path).json(body)).await?;
        self.invalidate_resource(path).await;
        serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse {
            message: format!("POST {path}: {e}"),
        })
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await?;
        self.invalidate_resource(path).await;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;
        self.metrics.record_request();

        let timer = OperationTimer::new("api_request");
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.metrics.record_error();
                warn!(error = %e, "API request failed before a response arrived");
                return Err(e.into());
            }
        };

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;
        timer.finish();

        if !status.is_success() {
            self.metrics.record_error();
            warn!(status = status.as_u16(), path = %url, "API request rejected");
            return Err(ApiError::from_response_body(status, &body));
        }

        debug!(status = status.as_u16(), path = %url, "API request succeeded");
        Ok(body)
    }

    /// Clear cache (useful for testing or after bulk writes)
    pub async fn clear_cache(&self) {
        self.cache.invalidate_all();
        info!("API client cache cleared");
    }

    /// Invalidate cached entries whose path contains `pattern`
    pub async fn invalidate_cache_pattern(&self, pattern: &str) {
        let keys_to_remove: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.contains(pattern))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        for key in keys_to_remove {
            self.cache.invalidate(&key).await;
        }

        debug!("Invalidated cache entries matching pattern: {}", pattern);
    }

    async fn invalidate_resource(&self, path: &str) {
        self.invalidate_cache_pattern(&resource_prefix(path)).await;
    }
}

/// `/api/event-signups/101/status` → `/api/event-signups`
fn resource_prefix(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('?')
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
        .take(2)
        .collect();
    format!("/{}", segments.join("/"))
}
