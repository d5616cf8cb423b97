//! HTTP client for the upstream commerce API.
//!
//! Wraps `reqwest` with bearer authentication, the process-wide rate
//! pacer, the global in-flight request ceiling, and the transient-status
//! retry loop. One [`UpstreamClient`] is constructed from configuration and
//! shared by every fetch task; tests build independent instances against a
//! mock server via [`UpstreamConfig`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use whfacts_core::AppConfig;

use crate::backoff::{self, RetryPolicy};
use crate::error::UpstreamError;
use crate::pacer::Pacer;

const USER_AGENT: &str = "whfacts/0.1 (warehouse-analytics)";

/// Construction parameters for [`UpstreamClient`].
#[derive(Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_secs: u64,
    pub requests_per_second: u32,
    /// Ceiling on simultaneously in-flight upstream requests.
    pub global_concurrency: usize,
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[redacted]")
            .field("timeout_secs", &self.timeout_secs)
            .field("requests_per_second", &self.requests_per_second)
            .field("global_concurrency", &self.global_concurrency)
            .field("retry", &self.retry)
            .finish()
    }
}

impl UpstreamConfig {
    #[must_use]
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            base_url: config.upstream_base_url.clone(),
            token: config.upstream_token.clone(),
            timeout_secs: config.upstream_timeout_secs,
            requests_per_second: config.requests_per_second,
            global_concurrency: config.global_concurrency,
            retry: RetryPolicy::with_max_attempts(config.max_attempts),
        }
    }
}

/// Client for the upstream commerce API.
pub struct UpstreamClient {
    http: Client,
    base_url: Url,
    pacer: Pacer,
    gate: Semaphore,
    retry: RetryPolicy,
}

impl UpstreamClient {
    /// Creates a client with the configured credential, pacing, and retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Config`] if the base URL or token is
    /// unusable, or [`UpstreamError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| UpstreamError::Config(format!("invalid bearer token: {e}")))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json;charset=utf-8"),
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join appends path segments instead of replacing the last one.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            UpstreamError::Config(format!("invalid base URL '{}': {e}", config.base_url))
        })?;

        Ok(Self {
            http,
            base_url,
            pacer: Pacer::new(config.requests_per_second),
            gate: Semaphore::new(config.global_concurrency.max(1)),
            retry: config.retry,
        })
    }

    /// Absolute reference to `entity/store/{id}`, as used in report filters.
    pub(crate) fn store_href(&self, store_id: &str) -> String {
        format!("{}entity/store/{store_id}", self.base_url)
    }

    /// Builds a full request URL with percent-encoded query parameters.
    pub(crate) fn endpoint(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, UpstreamError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| UpstreamError::Config(format!("invalid endpoint path '{path}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// One logical GET, parsed as JSON into `T`.
    ///
    /// Each attempt passes through the global in-flight gate and the rate
    /// pacer before dispatch. Transient statuses (429/500/502/503/504) are
    /// retried with server-hinted, jittered backoff until the attempt
    /// budget is spent; any other non-success status fails immediately.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Status`] — non-retryable HTTP status.
    /// - [`UpstreamError::RetriesExhausted`] — transient status on the
    ///   final attempt.
    /// - [`UpstreamError::Http`] — network or TLS failure.
    /// - [`UpstreamError::Deserialize`] — body does not match `T`.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, UpstreamError> {
        let mut attempt = 0u32;
        let mut current_backoff = self.retry.initial_backoff;

        loop {
            attempt += 1;
            let response = {
                let _permit = self.gate.acquire().await.expect("request gate never closed");
                self.pacer.acquire().await;
                self.http.get(url.clone()).send().await?
            };

            let status = response.status();
            if status.as_u16() < 400 {
                let body = response.text().await?;
                return serde_json::from_str(&body).map_err(|e| UpstreamError::Deserialize {
                    context: context.to_string(),
                    source: e,
                });
            }

            if !backoff::is_transient(status) {
                return Err(UpstreamError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            if attempt >= self.retry.max_attempts {
                return Err(UpstreamError::RetriesExhausted {
                    status: status.as_u16(),
                    attempts: attempt,
                });
            }

            let hint = backoff::server_hint(response.headers());
            let jitter = rand::random::<f64>() * backoff::MAX_JITTER;
            let wait = backoff::wait_before_retry(current_backoff, hint, jitter);
            tracing::warn!(
                context,
                status = status.as_u16(),
                attempt,
                max_attempts = self.retry.max_attempts,
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "transient upstream error — retrying after backoff"
            );
            tokio::time::sleep(wait).await;
            current_backoff = backoff::grown(&self.retry, current_backoff);
        }
    }
}
