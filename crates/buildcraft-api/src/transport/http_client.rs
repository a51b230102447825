//! HTTP client with retry, exponential backoff, timeout, and gzip compression.

use std::sync::RwLock;
use std::time::Duration;

use buildcraft_core::config::ApiConfig;
use buildcraft_core::constants::REQUEST_ID_HEADER;
use buildcraft_core::errors::{ApiError, ApiResult};
use buildcraft_observability::request_span;
use reqwest::Method;
use tracing::Instrument;

/// Fallback message when the server gives no usable error detail.
const GENERIC_ERROR_DETAIL: &str = "An error occurred";

/// Configuration for the HTTP transport layer.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL of the API, including the `/api` prefix.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum number of retry attempts for idempotent requests.
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry).
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for HttpClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }
}

/// HTTP transport client. Wraps an async reqwest client with bearer auth,
/// request ids, and retry logic.
#[derive(Debug)]
pub struct HttpClient {
    config: HttpClientConfig,
    client: reqwest::Client,
    bearer_token: RwLock<Option<String>>,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| ApiError::Network {
                reason: e.to_string(),
            })?;
        Ok(Self {
            config,
            client,
            bearer_token: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Set the bearer token for authenticated requests.
    pub fn set_bearer_token(&self, token: String) {
        let mut slot = self.bearer_token.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token);
    }

    /// Clear the bearer token.
    pub fn clear_bearer_token(&self) {
        let mut slot = self.bearer_token.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    fn bearer_token(&self) -> Option<String> {
        self.bearer_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Send a request and return the raw response body.
    ///
    /// Idempotent methods are retried on network errors and 5xx responses;
    /// everything else is sent once.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> ApiResult<String> {
        let retries = if is_idempotent(&method) {
            self.config.max_retries
        } else {
            0
        };
        let mut backoff = self.config.initial_backoff;
        let mut last_err = ApiError::Network {
            reason: "request was never sent".to_string(),
        };

        for attempt in 0..=retries {
            if attempt > 0 {
                tracing::debug!(
                    "api: retry attempt {}/{} after {:?}",
                    attempt,
                    retries,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(self.config.max_backoff);
            }

            match self.send_once(method.clone(), path, body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() => {
                    tracing::warn!(attempt, error = %e, "api: {method} {path} failed");
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }

        if retries == 0 {
            Err(last_err)
        } else {
            Err(ApiError::RetriesExhausted {
                attempts: retries + 1,
                last: last_err.to_string(),
            })
        }
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> ApiResult<String> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = request_span!(method, path, request_id);

        async {
            let mut req = self
                .client
                .request(method, &url)
                .header(REQUEST_ID_HEADER, &request_id);
            if let Some(b) = body {
                req = req.json(b);
            }
            if let Some(token) = self.bearer_token() {
                req = req.bearer_auth(token);
            }

            let resp = req.send().await.map_err(|e| ApiError::Network {
                reason: e.to_string(),
            })?;
            let status = resp.status();
            let text = resp.text().await.map_err(|e| ApiError::Network {
                reason: format!("failed to read body: {e}"),
            })?;

            if status.is_success() {
                Ok(text)
            } else {
                Err(error_from_response(status.as_u16(), &text))
            }
        }
        .instrument(span)
        .await
    }
}

/// Methods safe to resend without duplicating server-side effects.
fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::PUT | Method::DELETE)
}

/// Map a non-success response to an `ApiError`, using the server's
/// `{"detail": ...}` body when present.
pub(crate) fn error_from_response(status: u16, body: &str) -> ApiError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(|| GENERIC_ERROR_DETAIL.to_string());

    if status == 401 {
        ApiError::Unauthorized { detail }
    } else {
        ApiError::Http { status, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_get_put_delete_are_retried() {
        assert!(is_idempotent(&Method::GET));
        assert!(is_idempotent(&Method::PUT));
        assert!(is_idempotent(&Method::DELETE));
        assert!(!is_idempotent(&Method::POST));
    }

    #[test]
    fn string_detail_is_extracted() {
        let err = error_from_response(404, r#"{"detail": "Subproject not found"}"#);
        assert_eq!(
            err,
            ApiError::Http {
                status: 404,
                detail: "Subproject not found".into()
            }
        );
    }

    #[test]
    fn structured_detail_is_kept_as_json() {
        let err = error_from_response(422, r#"{"detail": [{"loc": ["body", "cost"]}]}"#);
        match err {
            ApiError::Http { status, detail } => {
                assert_eq!(status, 422);
                assert!(detail.contains("cost"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_detail_falls_back_to_generic_message() {
        let err = error_from_response(502, "<html>bad gateway</html>");
        assert_eq!(
            err,
            ApiError::Http {
                status: 502,
                detail: GENERIC_ERROR_DETAIL.into()
            }
        );
    }

    #[test]
    fn unauthorized_is_distinguished() {
        let err = error_from_response(401, r#"{"detail": "Not authenticated"}"#);
        assert!(matches!(err, ApiError::Unauthorized { .. }));
    }

    #[test]
    fn config_converts_from_api_section() {
        let api = ApiConfig {
            max_retries: 5,
            initial_backoff_ms: 10,
            ..ApiConfig::default()
        };
        let config = HttpClientConfig::from(&api);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.initial_backoff, Duration::from_millis(10));
    }
}
