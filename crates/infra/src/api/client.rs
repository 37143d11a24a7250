//! Authenticated JSON API client
//!
//! Joins request paths onto the configured endpoint, attaches the bearer
//! token and turns non-2xx responses into [`NimbusError::Api`]. Transport
//! retries live in [`HttpClient`]; this layer never retries.

use std::time::Duration;

use nimbus_domain::{ClientConfig, NimbusError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Response header carrying the server-side request id
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Error body returned by the API on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorPayload,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    code: String,
    message: String,
    #[serde(default)]
    details: Option<Value>,
}

/// API client bound to one endpoint and token
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    endpoint: Url,
    token: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns [`NimbusError::Config`] if the endpoint is not a valid URL or
    /// the token is empty, and transport errors if the HTTP client cannot be
    /// built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(NimbusError::Config("API token must not be empty".into()));
        }

        let endpoint = Url::parse(config.endpoint.trim_end_matches('/'))
            .map_err(|err| NimbusError::from(InfraError::from(err)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .max_attempts(config.http_max_attempts)
            .user_agent(config.user_agent())
            .default_headers(headers)
            .build()?;

        Ok(Self { http, endpoint, token: config.token.clone() })
    }

    /// Replace the transport, keeping endpoint and token
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one API request and decode the JSON response body.
    ///
    /// `path` is appended to the endpoint (so `/actions` under
    /// `https://api.example.com/v1` becomes `/v1/actions`); `params` are
    /// sent as repeated query pairs. An empty or `204` body yields
    /// [`Value::Null`].
    ///
    /// # Errors
    ///
    /// - [`NimbusError::Api`] for non-2xx responses, with the parsed error
    ///   code, message, details and correlation id
    /// - [`NimbusError::Decode`] when a success body is not JSON
    /// - transport errors from [`HttpClient`]
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        json: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url_for(path, params)?;
        debug!(url = %url, "API request");

        let mut builder = self.http.request(method, url).bearer_auth(&self.token);
        if let Some(body) = json {
            builder = builder.json(body);
        }

        let response = self.http.send(builder).await?;
        decode_response(response).await
    }

    fn url_for(&self, path: &str, params: &[(String, String)]) -> Result<Url> {
        let joined = format!("{}/{}", self.endpoint.as_str().trim_end_matches('/'), path.trim_start_matches('/'));
        let mut url = Url::parse(&joined).map_err(|err| NimbusError::from(InfraError::from(err)))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

async fn decode_response(response: Response) -> Result<Value> {
    let status = response.status();
    let correlation_id = response
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.bytes().await.map_err(|err| NimbusError::from(InfraError::from(err)))?;

    if !status.is_success() {
        let err = api_error(status, &body, correlation_id);
        warn!(status = status.as_u16(), error = %err, "API request failed");
        return Err(err);
    }

    if status == StatusCode::NO_CONTENT || body.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&body).map_err(|err| InfraError::from(err).into())
}

fn api_error(status: StatusCode, body: &[u8], correlation_id: Option<String>) -> NimbusError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => NimbusError::Api {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
            details: error.details,
            correlation_id,
        },
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            let message = if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            } else {
                text
            };
            NimbusError::Api {
                status: status.as_u16(),
                code: status.as_u16().to_string(),
                message,
                details: None,
                correlation_id,
            }
        }
    }
}
