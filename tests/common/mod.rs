//! Shared fixtures for the Synapse SDK tests.
#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use synapse_sdk::{ClientConfig, SynapseClient, User};
use wiremock::MockServer;

pub const USER_ID: &str = "5bd9e16314c7fa00a3076960";
pub const NODE_ID: &str = "5bd9e7b3389f2400adb012ae";
pub const REFRESH_TOKEN: &str = "refresh_Y5beJdBLtgvply3KIzrh72UxWMEqiTNoVAfDs98G";
pub const FINGERPRINT: &str = "test-fingerprint";

/// Start a mock Synapse API.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Mounted base path, mirroring the real `/v3.1` prefix.
pub fn api_path(path: &str) -> String {
    format!("/v3.1{path}")
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new("client_id_A", "client_secret_B", "1.2.3.4")
        .fingerprint(FINGERPRINT)
        .base_url(format!("{}/v3.1", server.uri()))
        .timeout(Duration::from_secs(5))
}

pub fn client_for(server: &MockServer) -> SynapseClient {
    SynapseClient::new(config_for(server)).expect("client should build")
}

pub fn user_json() -> Value {
    json!({
        "_id": USER_ID,
        "refresh_token": REFRESH_TOKEN,
        "legal_names": ["Test User"],
        "permission": "SEND-AND-RECEIVE",
        "logins": [{ "email": "test@synapsefi.com", "scope": "READ_AND_WRITE" }],
        "phone_numbers": ["901.111.1111"],
        "extra": { "supp_id": "122eddfgbeafrfvbbb" },
    })
}

/// A user that already holds `oauth_key`.
pub fn user_with_token(oauth_key: &str) -> User {
    let mut user: User = serde_json::from_value(user_json()).expect("user fixture");
    user.oauth_key = Some(oauth_key.to_string());
    user
}

pub fn oauth_json(oauth_key: &str) -> Value {
    json!({
        "oauth_key": oauth_key,
        "expires_at": "1541623539",
        "expires_in": "7200",
        "refresh_token": REFRESH_TOKEN,
        "scope": ["USER|PATCH", "NODES|GET"],
        "user_id": USER_ID,
    })
}

pub fn node_json(node_id: &str) -> Value {
    json!({
        "_id": node_id,
        "allowed": "CREDIT-AND-DEBIT",
        "is_active": true,
        "type": "DEPOSIT-US",
        "user_id": USER_ID,
        "info": {
            "nickname": "My Checking",
            "balance": { "amount": 0.0, "currency": "USD" },
        },
        "extra": { "supp_id": "" },
    })
}

pub fn nodes_json() -> Value {
    json!({
        "error_code": "0",
        "http_code": "200",
        "limit": 20,
        "node_count": 1,
        "nodes": [node_json(NODE_ID)],
        "page": 1,
        "page_count": 1,
        "success": true,
    })
}

pub fn transaction_json(trans_id: &str) -> Value {
    json!({
        "_id": trans_id,
        "amount": { "amount": 100.1, "currency": "USD" },
        "from": { "id": NODE_ID, "type": "DEPOSIT-US" },
        "to": { "id": "5bd9e7b3389f2400adb012af", "type": "DEPOSIT-US" },
        "recent_status": { "status": "QUEUED-BY-SYNAPSE", "status_id": "1" },
        "extra": { "supp_id": "1283764wqwsdd34wd13212", "note": "Deposit" },
    })
}

pub fn unauthorized_json() -> Value {
    json!({
        "error": { "en": "OAuth key expired. Please re-authenticate." },
        "error_code": "110",
        "http_code": "401",
        "success": false,
    })
}
