//! Retrying HTTP transport
//!
//! Only transient failures are retried:
//! - `429 Too Many Requests` (the API's `rate_limit_exceeded`)
//! - gateway errors `502`, `503` and `504`, and request timeouts
//! - connection failures, where the request never reached the server
//!
//! Rate limiting and connection failures mean the request was not
//! processed, so they are retried for every method. Gateway errors and
//! timeouts may follow a processed request and are retried for idempotent
//! methods only; a `POST` that creates an action is never sent twice.
//! A `Retry-After` header in seconds replaces the computed backoff.

use std::time::Duration;

use nimbus_domain::constants::{DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS};
use nimbus_domain::NimbusError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// How many times and how long to wait before resending a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, initial try included
    pub max_attempts: usize,
    /// Delay before the first retry; doubles with each further retry
    pub base_backoff: Duration,
    /// Upper bound for any delay, `Retry-After` included
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn delay(&self, retry: usize, retry_after: Option<Duration>) -> Duration {
        let backoff = || {
            let shift = retry.saturating_sub(1).min(16) as u32;
            self.base_backoff.saturating_mul(1u32 << shift)
        };
        retry_after.unwrap_or_else(backoff).min(self.max_backoff)
    }
}

/// Why an attempt may be worth repeating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transient {
    /// The server refused the request before processing it
    RateLimited,
    /// The request may or may not have been processed
    Unavailable,
    /// The request never reached the server
    Unreachable,
}

impl Transient {
    fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Some(Self::RateLimited),
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                Some(Self::Unavailable)
            }
            _ => None,
        }
    }

    fn from_error(err: &reqwest::Error) -> Option<Self> {
        if err.is_connect() {
            Some(Self::Unreachable)
        } else if err.is_timeout() {
            Some(Self::Unavailable)
        } else {
            None
        }
    }

    fn allows_retry(self, method: &Method) -> bool {
        match self {
            Self::RateLimited | Self::Unreachable => true,
            Self::Unavailable => method.is_idempotent(),
        }
    }
}

/// reqwest client with the API's retry rules and a per-request timeout
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    policy: RetryPolicy,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").field("policy", &self.policy).finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send the request, resending it while the failure is transient and
    /// the policy allows another attempt.
    ///
    /// Non-transient HTTP statuses are returned as responses; the caller
    /// decides how to read them.
    ///
    /// # Errors
    ///
    /// Transport errors mapped through [`InfraError`], and
    /// [`NimbusError::Internal`] if the request body cannot be cloned.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, NimbusError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| NimbusError::Internal("streaming request bodies cannot be retried".into()))?
                .build()
                .map_err(|err| NimbusError::from(InfraError::from(err)))?;
            let method = request.method().clone();
            let url = request.url().clone();

            let outcome = self.client.execute(request).await;
            let (transient, retry_after) = match &outcome {
                Ok(response) => {
                    debug!(attempt, %method, %url, status = %response.status(), "HTTP response");
                    (Transient::from_status(response.status()), retry_after(response.headers()))
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");
                    (Transient::from_error(err), None)
                }
            };

            let retry = transient.filter(|t| attempt < max_attempts && t.allows_retry(&method));
            let Some(reason) = retry else {
                return outcome.map_err(|err| InfraError::from(err).into());
            };

            let delay = self.policy.delay(attempt, retry_after);
            if reason == Transient::RateLimited {
                warn!(attempt, %url, ?delay, "rate limited, retrying");
            } else {
                debug!(attempt, %url, ?reason, ?delay, "transient failure, retrying");
            }
            drop(outcome);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }
}

/// `Retry-After` in delta-seconds form; HTTP-date values are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    policy: RetryPolicy,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.policy.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.policy.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, NimbusError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        let mut builder = ReqwestClient::builder().timeout(timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| NimbusError::from(InfraError::from(err)))?;
        Ok(HttpClient { client, policy: self.policy })
    }
}
