//! Conversions from external infrastructure errors into domain errors.

use nimbus_domain::NimbusError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub NimbusError);

impl From<InfraError> for NimbusError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<NimbusError> for InfraError {
    fn from(value: NimbusError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoNimbusError {
    fn into_nimbus(self) -> NimbusError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → NimbusError */
/* -------------------------------------------------------------------------- */

impl IntoNimbusError for HttpError {
    fn into_nimbus(self) -> NimbusError {
        if self.is_timeout() {
            let target = self.url().map_or_else(|| "request".to_string(), |url| url.path().to_string());
            return NimbusError::Timeout(format!("HTTP {target} timed out"));
        }

        if self.is_connect() {
            return NimbusError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return NimbusError::Decode(format!("invalid response body: {self}"));
        }

        if self.is_builder() {
            return NimbusError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => NimbusError::NotFound(message),
                400..=499 => NimbusError::InvalidInput(message),
                _ => NimbusError::Network(message),
            };
        }

        NimbusError::Network(format!("HTTP request failed: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_nimbus())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → NimbusError */
/* -------------------------------------------------------------------------- */

impl IntoNimbusError for JsonError {
    fn into_nimbus(self) -> NimbusError {
        NimbusError::Decode(format!(
            "invalid JSON at line {} column {}: {}",
            self.line(),
            self.column(),
            self
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_nimbus())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → NimbusError */
/* -------------------------------------------------------------------------- */

impl IntoNimbusError for UrlError {
    fn into_nimbus(self) -> NimbusError {
        NimbusError::Config(format!("invalid endpoint URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_nimbus())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
