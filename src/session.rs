/// Session credentials and per-request header assembly.
///
/// [`SessionConfig`] is the mutable credential set shared by every request a
/// client issues; [`build_headers`] turns it plus per-call overrides into the
/// Synapse header set.
use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, TRANSFER_ENCODING};

use crate::config::ClientConfig;
use crate::errors::{Result, SynapseError};

pub const USER_HEADER: &str = "x-sp-user";
pub const GATEWAY_HEADER: &str = "x-sp-gateway";
pub const USER_IP_HEADER: &str = "x-sp-user-ip";
pub const IDEMPOTENCY_HEADER: &str = "x-sp-idempotency-key";

/// Credentials applied to every request of one client.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub client_id: String,
    pub client_secret: String,
    pub fingerprint: String,
    pub ip_address: String,
    /// Current `oauth_key`; empty until a user authenticates.
    pub bearer_token: String,
    pub idempotency_key: Option<String>,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("fingerprint", &self.fingerprint)
            .field("ip_address", &self.ip_address)
            .field("has_bearer_token", &!self.bearer_token.is_empty())
            .field("idempotency_key", &self.idempotency_key)
            .finish()
    }
}

/// Partial update of the session; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct HeaderUpdate {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub fingerprint: Option<String>,
    pub ip_address: Option<String>,
    pub oauth_key: Option<String>,
    pub idempotency_key: Option<String>,
}

impl SessionConfig {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            fingerprint: config.fingerprint.clone(),
            ip_address: config.ip_address.clone(),
            bearer_token: String::new(),
            idempotency_key: None,
        }
    }

    /// Apply a partial update in place.
    pub fn update(&mut self, update: HeaderUpdate) {
        if let Some(client_id) = update.client_id {
            self.client_id = client_id;
        }
        if let Some(client_secret) = update.client_secret {
            self.client_secret = client_secret;
        }
        if let Some(fingerprint) = update.fingerprint {
            self.fingerprint = fingerprint;
        }
        if let Some(ip_address) = update.ip_address {
            self.ip_address = ip_address;
        }
        if let Some(oauth_key) = update.oauth_key {
            self.bearer_token = oauth_key;
        }
        if let Some(key) = update.idempotency_key {
            self.idempotency_key = Some(key);
        }
    }

    /// Replace the bearer token wholesale.
    pub fn set_bearer_token(&mut self, oauth_key: impl Into<String>) {
        self.bearer_token = oauth_key.into();
    }

    pub fn clear_idempotency_key(&mut self) {
        self.idempotency_key = None;
    }
}

/// Per-call header options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderOverrides {
    /// Takes precedence over the session's idempotency key.
    pub idempotency_key: Option<String>,
    /// Send `Transfer-Encoding: chunked` instead of a JSON content type.
    pub stream: bool,
    pub extra_headers: Vec<(String, String)>,
}

impl HeaderOverrides {
    pub fn idempotency_key(key: impl Into<String>) -> Self {
        Self {
            idempotency_key: Some(key.into()),
            ..Self::default()
        }
    }
}

/// Build the full header map for one request.
pub fn build_headers(session: &SessionConfig, overrides: &HeaderOverrides) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    insert(
        &mut headers,
        USER_HEADER,
        &format!("{}|{}", session.bearer_token, session.fingerprint),
    )?;
    insert(
        &mut headers,
        GATEWAY_HEADER,
        &format!("{}|{}", session.client_id, session.client_secret),
    )?;
    insert(&mut headers, USER_IP_HEADER, &session.ip_address)?;

    let idempotency_key = overrides
        .idempotency_key
        .as_deref()
        .or(session.idempotency_key.as_deref());
    if let Some(key) = idempotency_key {
        insert(&mut headers, IDEMPOTENCY_HEADER, key)?;
    }

    if overrides.stream {
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
    } else {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    for (name, value) in &overrides.extra_headers {
        insert(&mut headers, name, value)?;
    }

    Ok(headers)
}

fn insert(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| SynapseError::Other(format!("Invalid header name {name}: {e}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| SynapseError::Other(format!("Invalid value for header {name}: {e}")))?;
    headers.insert(name, value);
    Ok(())
}
