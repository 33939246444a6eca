/// Error types for the Synapse SDK.
///
/// Every failed API call ends up here: the transport hands a response envelope
/// to [`ErrorEnvelope::normalize`], and [`classify`] picks the typed variant.
use std::fmt;

use serde_json::{json, Value};
use thiserror::Error;

/// Details carried by every classified API error.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP code reported by the envelope, or the transport status when absent.
    pub http_code: u16,
    /// Synapse `error_code` field, if the envelope had one.
    pub error_code: Option<String>,
    pub message: String,
    /// The envelope as received (or as synthesized for timeouts and non-JSON bodies).
    pub response: Value,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_code {
            Some(code) => write!(
                f,
                "{} (http_code {}, error_code {})",
                self.message, self.http_code, code
            ),
            None => write!(f, "{} (http_code {})", self.message, self.http_code),
        }
    }
}

/// The primary error type for the Synapse SDK.
#[derive(Error, Debug)]
pub enum SynapseError {
    #[error("Unauthorized: {0}")]
    Unauthorized(ApiError),

    #[error("Rate limited: {0}")]
    RateLimited(ApiError),

    #[error("Not found: {0}")]
    NotFound(ApiError),

    #[error("Validation failed: {0}")]
    ValidationFailed(ApiError),

    #[error("Server error: {0}")]
    ServerError(ApiError),

    #[error("Timeout: {0}")]
    Timeout(ApiError),

    #[error("Unknown API error: {0}")]
    Unknown(ApiError),

    // Failures that never produced an envelope
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("URL error: {0}")]
    UrlError(String),

    #[error("{0}")]
    Other(String),
}

impl SynapseError {
    /// The classified API details, if this error came from an envelope.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SynapseError::Unauthorized(e)
            | SynapseError::RateLimited(e)
            | SynapseError::NotFound(e)
            | SynapseError::ValidationFailed(e)
            | SynapseError::ServerError(e)
            | SynapseError::Timeout(e)
            | SynapseError::Unknown(e) => Some(e),
            _ => None,
        }
    }

    pub fn http_code(&self) -> Option<u16> {
        self.api_error().map(|e| e.http_code)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.api_error().and_then(|e| e.error_code.as_deref())
    }

    /// Human-readable message extracted from the envelope.
    pub fn message(&self) -> String {
        match self.api_error() {
            Some(e) => e.message.clone(),
            None => self.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SynapseError::Unauthorized(_))
    }

    /// Returns true if this error suggests retrying with backoff.
    ///
    /// The SDK itself never does; this is a hint for the caller's retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SynapseError::RateLimited(_) | SynapseError::ServerError(_) | SynapseError::Timeout(_)
        )
    }
}

/// A response envelope reduced to the fields classification needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEnvelope {
    /// `http_code` as reported inside the body.
    pub http_code: Option<u16>,
    /// Status of the HTTP response that carried the body.
    pub status: u16,
    pub error_code: Option<String>,
    pub message: String,
    pub response: Value,
}

impl ErrorEnvelope {
    /// Normalize a parsed body into the canonical envelope shape.
    pub fn normalize(body: Value, status: u16) -> Self {
        let http_code = body.get("http_code").and_then(parse_code);
        let error_code = body.get("error_code").and_then(code_string);
        let message = extract_message(&body).unwrap_or_else(|| "Unknown error".to_string());
        Self {
            http_code,
            status,
            error_code,
            message,
            response: body,
        }
    }

    /// Build an envelope for a failure that had no usable JSON body.
    pub fn synthesize(status: u16, message: impl Into<String>) -> Self {
        let body = json!({
            "error": { "message": message.into() },
            "http_code": status.to_string(),
        });
        Self::normalize(body, status)
    }

    /// The code errors report: the body's `http_code`, else the transport status.
    pub fn effective_code(&self) -> u16 {
        self.http_code.unwrap_or(self.status)
    }
}

/// Select the typed error for a normalized envelope.
pub fn classify(envelope: ErrorEnvelope) -> SynapseError {
    let kind = match envelope.http_code {
        Some(code) => kind_for_http_code(code),
        None => envelope
            .error_code
            .as_deref()
            .map(kind_for_error_code)
            .unwrap_or_else(|| kind_for_http_code(envelope.status)),
    };
    let err = ApiError {
        http_code: envelope.effective_code(),
        error_code: envelope.error_code,
        message: envelope.message,
        response: envelope.response,
    };
    match kind {
        ErrorKind::Unauthorized => SynapseError::Unauthorized(err),
        ErrorKind::RateLimited => SynapseError::RateLimited(err),
        ErrorKind::NotFound => SynapseError::NotFound(err),
        ErrorKind::ValidationFailed => SynapseError::ValidationFailed(err),
        ErrorKind::ServerError => SynapseError::ServerError(err),
        ErrorKind::Timeout => SynapseError::Timeout(err),
        ErrorKind::Unknown => SynapseError::Unknown(err),
    }
}

/// True when an envelope's `error` field is present and non-empty.
pub fn has_error(body: &Value) -> bool {
    match body.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// True when an envelope reports `http_code` 202 (string or number).
pub fn is_accepted(body: &Value) -> bool {
    body.get("http_code").and_then(parse_code) == Some(202)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    Unauthorized,
    RateLimited,
    NotFound,
    ValidationFailed,
    ServerError,
    Timeout,
    Unknown,
}

fn kind_for_http_code(code: u16) -> ErrorKind {
    match code {
        401 => ErrorKind::Unauthorized,
        429 => ErrorKind::RateLimited,
        404 => ErrorKind::NotFound,
        400 | 422 => ErrorKind::ValidationFailed,
        504 => ErrorKind::Timeout,
        500..=599 => ErrorKind::ServerError,
        _ => ErrorKind::Unknown,
    }
}

// Synapse error_code values, used only when http_code is missing.
fn kind_for_error_code(code: &str) -> ErrorKind {
    match code {
        "100" | "110" | "120" => ErrorKind::Unauthorized,
        "429" => ErrorKind::RateLimited,
        "404" => ErrorKind::NotFound,
        "200" | "400" => ErrorKind::ValidationFailed,
        "500" | "503" => ErrorKind::ServerError,
        _ => ErrorKind::Unknown,
    }
}

fn parse_code(value: &Value) -> Option<u16> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        _ => None,
    }
}

fn code_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn extract_message(body: &Value) -> Option<String> {
    let error = body.get("error");
    error
        .and_then(|e| e.get("en"))
        .and_then(Value::as_str)
        .or_else(|| error.and_then(|e| e.get("message")).and_then(Value::as_str))
        .or_else(|| error.and_then(Value::as_str))
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(String::from)
}

impl From<reqwest::Error> for SynapseError {
    fn from(err: reqwest::Error) -> Self {
        SynapseError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for SynapseError {
    fn from(err: serde_json::Error) -> Self {
        SynapseError::JsonError(err.to_string())
    }
}

impl From<url::ParseError> for SynapseError {
    fn from(err: url::ParseError) -> Self {
        SynapseError::UrlError(err.to_string())
    }
}

/// Result alias used throughout the SDK.
pub type Result<T> = std::result::Result<T, SynapseError>;
