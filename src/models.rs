/// Data models for Synapse API resources.
///
/// Every resource keeps the fields the SDK relies on as typed members and the
/// rest of the payload in `other`, so nothing the API returns is dropped.
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, SynapseError};

/// Deserialize an optional value that may be a JSON number or a numeric string.
fn deserialize_optional_string_or_u64<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected unsigned integer, got {n}"))),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some).map_err(D::Error::custom),
        Some(Value::Null) | None => Ok(None),
        Some(v) => Err(D::Error::custom(format!("expected number or string, got {v}"))),
    }
}

/// Deserialize an optional value that may be a JSON number or a string, storing as String.
fn deserialize_optional_string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Null) | None => Ok(None),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Parse a success envelope into a resource type.
pub fn from_envelope<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        SynapseError::JsonError(format!(
            "Failed to parse {}: {e}",
            std::any::type_name::<T>()
        ))
    })
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Paging fields shared by every collection response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default, deserialize_with = "deserialize_optional_string_or_u64")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_u64")]
    pub page_count: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_u64")]
    pub limit: Option<u64>,
}

/// Query-string options accepted by list and lookup endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Free-text search (users) or filter value, depending on the endpoint.
    pub query: Option<String>,
    /// Node type filter, e.g. `DEPOSIT-US`.
    pub node_type: Option<String>,
    pub show_refresh_tokens: Option<bool>,
    pub full_dehydrate: Option<bool>,
    pub force_refresh: Option<bool>,
    /// Raw JSON filter expression.
    pub filter: Option<String>,
}

impl QueryOptions {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    /// Flatten into query pairs. Flags are sent as `yes`/`no`.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            query.push(("per_page".to_string(), per_page.to_string()));
        }
        if let Some(q) = &self.query {
            query.push(("query".to_string(), q.clone()));
        }
        if let Some(node_type) = &self.node_type {
            query.push(("type".to_string(), node_type.clone()));
        }
        if let Some(show) = self.show_refresh_tokens {
            query.push(("show_refresh_tokens".to_string(), yes_no(show)));
        }
        if let Some(full) = self.full_dehydrate {
            query.push(("full_dehydrate".to_string(), yes_no(full)));
        }
        if let Some(force) = self.force_refresh {
            query.push(("force_refresh".to_string(), yes_no(force)));
        }
        if let Some(filter) = &self.filter {
            query.push(("filter".to_string(), filter.clone()));
        }
        query
    }
}

fn yes_no(flag: bool) -> String {
    let value = if flag { "yes" } else { "no" };
    value.to_string()
}

// ---------------------------------------------------------------------------
// OAuth
// ---------------------------------------------------------------------------

/// Response from POST /oauth/{user_id}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    pub oauth_key: String,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_number")]
    pub expires_in: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_number")]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A Synapse user plus the auth state this client holds for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub legal_names: Vec<String>,
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub logins: Vec<Value>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,

    /// Last `oauth_key` issued for this user.
    #[serde(skip)]
    pub oauth_key: Option<String>,
    #[serde(skip)]
    pub expires_in: Option<String>,
}

impl User {
    /// Record a fresh token on the user.
    pub fn apply_token(&mut self, token: &OAuthToken) {
        self.oauth_key = Some(token.oauth_key.clone());
        self.expires_in = token.expires_in.clone();
        if let Some(refresh_token) = &token.refresh_token {
            self.refresh_token = refresh_token.clone();
        }
    }

    /// Carry auth state over from an older copy of the same user.
    pub(crate) fn inherit_auth(mut self, previous: &User) -> Self {
        if self.refresh_token.is_empty() {
            self.refresh_token = previous.refresh_token.clone();
        }
        self.oauth_key = previous.oauth_key.clone();
        self.expires_in = previous.expires_in.clone();
        self
    }
}

/// Response from GET /users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Users {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_u64")]
    pub users_count: Option<u64>,
    #[serde(default)]
    pub users: Vec<User>,
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// A node (account) owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub allowed: Option<String>,
    #[serde(default)]
    pub info: Value,
    #[serde(default)]
    pub extra: Value,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Node {
    pub fn nickname(&self) -> Option<&str> {
        self.info.get("nickname").and_then(Value::as_str)
    }
}

/// Paginated node list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nodes {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_u64")]
    pub node_count: Option<u64>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// MFA challenge returned instead of nodes when linking a bank login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeMfa {
    pub access_token: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub mfa_type: Option<String>,
}

/// Result of creating a node or answering a node MFA question.
#[derive(Debug, Clone)]
pub enum CreateNodeResponse {
    Nodes(Nodes),
    AccessToken(NodeMfa),
}

impl CreateNodeResponse {
    pub fn from_envelope(value: Value) -> Result<Self> {
        if value.get("nodes").is_some_and(Value::is_array) {
            return from_envelope(value).map(CreateNodeResponse::Nodes);
        }
        if let Some(mfa) = value.get("mfa").filter(|m| m.is_object()) {
            return from_envelope(mfa.clone()).map(CreateNodeResponse::AccessToken);
        }
        if value.get("access_token").is_some() {
            return from_envelope(value).map(CreateNodeResponse::AccessToken);
        }
        Err(SynapseError::JsonError(
            "Node response carried neither nodes nor an MFA access token".into(),
        ))
    }

    pub fn nodes(&self) -> Option<&[Node]> {
        match self {
            CreateNodeResponse::Nodes(nodes) => Some(&nodes.nodes),
            CreateNodeResponse::AccessToken(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Monetary amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amount {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
}

/// A transaction between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    pub amount: Amount,
    #[serde(default)]
    pub from: Value,
    #[serde(default)]
    pub to: Value,
    #[serde(default)]
    pub recent_status: Value,
    #[serde(default)]
    pub extra: Value,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Transaction {
    pub fn status(&self) -> Option<&str> {
        self.recent_status.get("status").and_then(Value::as_str)
    }
}

/// Paginated transaction list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transactions {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_u64")]
    pub trans_count: Option<u64>,
    #[serde(default)]
    pub trans: Vec<Transaction>,
}

// ---------------------------------------------------------------------------
// Subnets
// ---------------------------------------------------------------------------

/// Account and routing numbers issued against a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnet {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub account_num: Option<String>,
    #[serde(default)]
    pub routing_num: Value,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Paginated subnet list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnets {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_u64")]
    pub subnets_count: Option<u64>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

/// A webhook subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Paginated subscription list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriptions {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_u64")]
    pub subscriptions_count: Option<u64>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}
