/// HTTP transport for the Synapse API.
///
/// Executes one request at a time with the session headers attached and maps
/// every non-success outcome (timeout, non-2xx, error envelope) onto a
/// classified [`SynapseError`]. Successful envelopes are returned as parsed
/// JSON; turning them into resource types is the caller's job.
use std::time::Duration;

use futures_util::stream;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Client, Method, Url};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::errors::{classify, has_error, is_accepted, ErrorEnvelope, Result, SynapseError};
use crate::session::{build_headers, HeaderOverrides, SessionConfig};

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON.
    Json(Value),
    /// Sent as-is with chunked transfer encoding.
    Stream(Vec<u8>),
}

/// Everything needed to issue one API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the environment base URL, e.g. `/users/{id}`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub overrides: HeaderOverrides,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            overrides: HeaderOverrides::default(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).json(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).json(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn stream(mut self, bytes: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Stream(bytes));
        self
    }

    pub fn query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn idempotency_key(mut self, key: Option<&str>) -> Self {
        if let Some(key) = key {
            self.overrides.idempotency_key = Some(key.to_string());
        }
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides
            .extra_headers
            .push((name.into(), value.into()));
        self
    }

    fn is_stream(&self) -> bool {
        self.overrides.stream || matches!(self.body, Some(RequestBody::Stream(_)))
    }
}

/// Low-level HTTP client holding the session credentials.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: SessionConfig,
    raise_for_202: bool,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base(),
            session: SessionConfig::from_config(config),
            raise_for_202: config.raise_for_202,
            timeout: config.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionConfig {
        &mut self.session
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> Result<Url> {
        let url = Url::parse(&format!("{}{}", self.base_url, path))?;
        Ok(url)
    }

    /// Execute a request and return the parsed success envelope.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value> {
        let (_, body) = self.execute_with_status(request).await?;
        Ok(body)
    }

    /// Like [`HttpClient::execute`], also returning the HTTP status of the reply.
    pub async fn execute_with_status(&self, request: &ApiRequest) -> Result<(u16, Value)> {
        let streaming = request.is_stream();
        debug!(
            "http.execute method={} path={} query_len={} stream={}",
            request.method,
            request.path,
            request.query.len(),
            streaming
        );

        let mut overrides = request.overrides.clone();
        overrides.stream = streaming;
        let headers = build_headers(&self.session, &overrides)?;

        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path)?)
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            Some(RequestBody::Json(body)) => builder.body(serde_json::to_vec(body)?),
            Some(RequestBody::Stream(bytes)) => {
                let chunks = vec![Ok::<_, std::io::Error>(bytes.clone())];
                builder.body(Body::wrap_stream(stream::iter(chunks)))
            }
            None => builder,
        };

        let response = builder.send().await.map_err(transport_failure)?;
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<(u16, Value)> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        let text = response.text().await.map_err(transport_failure)?;
        debug!(
            "http.handle_response status={} json={} body_len={}",
            status,
            is_json,
            text.len()
        );

        if !status.is_success() {
            debug!(
                "http.handle_response non_success status={} body={}",
                status,
                preview(&text)
            );
            let parsed = if is_json {
                serde_json::from_str::<Value>(&text).ok()
            } else {
                None
            };
            let envelope = match parsed {
                Some(body) => ErrorEnvelope::normalize(body, status.as_u16()),
                None => ErrorEnvelope::synthesize(status.as_u16(), text),
            };
            return Err(classify(envelope));
        }

        if text.trim().is_empty() {
            return Ok((status.as_u16(), Value::Object(Default::default())));
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            SynapseError::JsonError(format!(
                "Failed to parse response: {e}\nBody: {}",
                preview(&text)
            ))
        })?;

        if has_error(&body) || (self.raise_for_202 && is_accepted(&body)) {
            debug!(
                "http.handle_response error_envelope status={} raise_for_202={}",
                status, self.raise_for_202
            );
            return Err(classify(ErrorEnvelope::normalize(body, status.as_u16())));
        }

        Ok((status.as_u16(), body))
    }
}

fn preview(text: &str) -> String {
    text.chars().take(500).collect()
}

fn transport_failure(err: reqwest::Error) -> SynapseError {
    if err.is_timeout() {
        debug!("http.transport_failure timeout");
        classify(ErrorEnvelope::synthesize(504, "Request Timeout"))
    } else {
        err.into()
    }
}
