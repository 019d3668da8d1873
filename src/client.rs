//! Thin blocking HTTP layer over the report API.
//!
//! Every non-success response is classified into an [`ApiError`] here, so
//! callers above this module only ever see view-ready messages. Auth is an
//! injected [`SessionAuth`] capability rather than ambient global state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::error::{ReportError, Result};
use crate::params::ParamMap;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Token source and logout hook for the HTTP layer.
pub trait SessionAuth: Send + Sync {
    fn current_token(&self) -> Option<String>;

    /// Called once per 401 response.
    fn on_unauthorized(&self);
}

/// Fixed token; remembers whether the server rejected it.
#[derive(Debug, Default)]
pub struct StaticSession {
    token: Option<String>,
    revoked: AtomicBool,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            revoked: AtomicBool::new(false),
        }
    }

    pub fn was_revoked(&self) -> bool {
        self.revoked.load(Ordering::SeqCst)
    }
}

impl SessionAuth for StaticSession {
    fn current_token(&self) -> Option<String> {
        if self.was_revoked() {
            return None;
        }
        self.token.clone()
    }

    fn on_unauthorized(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("request timed out, check your connection and try again")]
    Timeout,

    #[error("cannot connect to server at {0}")]
    Connection(String),

    #[error("session expired, run `reportdesk init` to log in again")]
    Unauthorized,

    #[error("{message}")]
    Validation { status: u16, message: String },

    #[error("server error ({status}), please try again later")]
    Server { status: u16 },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl ApiError {
    /// Transport and server failures may succeed on a fresh attempt;
    /// validation failures need different input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connection(_) | Self::Server { .. })
    }
}

/// A binary response plus the server's suggested filename header, if any.
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_disposition: Option<String>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    auth: Arc<dyn SessionAuth>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, auth: Arc<dyn SessionAuth>) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reportdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReportError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send(&self, path: &str, params: &ParamMap) -> std::result::Result<Response, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, params = ?params.as_slice(), "GET");

        let mut req = self.http.get(&url).query(params.as_slice());
        if let Some(token) = self.auth.current_token() {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let resp = req.send().map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        tracing::debug!(%url, status = status.as_u16(), "response");

        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().map(|b| b.to_vec()).unwrap_or_default();
        Err(self.failure(status, path, &body))
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        tracing::warn!(error = %e, "request failed");
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Connection(self.base_url.clone())
        } else {
            ApiError::Http(e.to_string())
        }
    }

    fn failure(&self, status: StatusCode, path: &str, body: &[u8]) -> ApiError {
        if status == StatusCode::UNAUTHORIZED {
            tracing::info!("401 from {path}, clearing session");
            self.auth.on_unauthorized();
            return ApiError::Unauthorized;
        }
        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                body = %String::from_utf8_lossy(body),
                "server error from {path}"
            );
            return ApiError::Server {
                status: status.as_u16(),
            };
        }
        let message = describe_detail(body).unwrap_or_else(|| match status {
            StatusCode::NOT_FOUND => format!("endpoint not found: {path}"),
            _ => format!("request rejected ({})", status.as_u16()),
        });
        ApiError::Validation {
            status: status.as_u16(),
            message,
        }
    }

    pub fn get_json(&self, path: &str, params: &ParamMap) -> std::result::Result<Value, ApiError> {
        let resp = self.send(path, params)?;
        let bytes = resp.bytes().map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    pub fn get_bytes(&self, path: &str, params: &ParamMap) -> std::result::Result<Download, ApiError> {
        let resp = self.send(path, params)?;
        let content_disposition = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().map_err(|e| self.transport_error(e))?.to_vec();
        Ok(Download {
            bytes,
            content_disposition,
        })
    }

    /// Server origin: the base URL without its `/api/v1` suffix.
    pub fn origin(&self) -> &str {
        self.base_url
            .strip_suffix("/api/v1")
            .unwrap_or(&self.base_url)
    }

    /// Probe `<origin>/health`. Never fails; unreachable is `false`.
    pub fn health(&self) -> bool {
        let url = format!("{}/health", self.origin());
        let resp = Client::builder()
            .timeout(HEALTH_TIMEOUT)
            .build()
            .and_then(|c| c.get(&url).send());
        match resp {
            Ok(r) if r.status().is_success() => true,
            Ok(r) => {
                tracing::warn!(status = r.status().as_u16(), "health check failed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "backend is not responding");
                false
            }
        }
    }
}

/// Reduce an error body's `detail` field to one display string.
///
/// `detail` may be a string, an object with a `msg`, or a list of
/// validation errors each carrying `msg`. The body is decoded lossily first
/// since export failures arrive on a binary response.
pub fn describe_detail(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let parsed: Value = serde_json::from_str(text.trim()).ok()?;
    let detail = parsed.get("detail")?;
    let message = match detail {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(msg_or_json)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => msg_or_json(detail),
        Value::Null => return None,
        other => other.to_string(),
    };
    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

fn msg_or_json(v: &Value) -> String {
    match v.get("msg") {
        Some(Value::String(s)) => s.clone(),
        _ => v.to_string(),
    }
}
