//! Endpoint paths, relative to the environment base URL.

use url::form_urlencoded;

pub fn users() -> String {
    "/users".to_string()
}

pub fn user(user_id: &str) -> String {
    format!("/users/{}", seg(user_id))
}

pub fn oauth(user_id: &str) -> String {
    format!("/oauth/{}", seg(user_id))
}

pub fn user_nodes(user_id: &str) -> String {
    format!("/users/{}/nodes", seg(user_id))
}

pub fn node(user_id: &str, node_id: &str) -> String {
    format!("/users/{}/nodes/{}", seg(user_id), seg(node_id))
}

pub fn ubo(user_id: &str) -> String {
    format!("/users/{}/ubo", seg(user_id))
}

pub fn user_statements(user_id: &str) -> String {
    format!("/users/{}/statements", seg(user_id))
}

pub fn node_statements(user_id: &str, node_id: &str) -> String {
    format!("/users/{}/nodes/{}/statements", seg(user_id), seg(node_id))
}

pub fn user_transactions(user_id: &str) -> String {
    format!("/users/{}/trans", seg(user_id))
}

pub fn node_transactions(user_id: &str, node_id: &str) -> String {
    format!("/users/{}/nodes/{}/trans", seg(user_id), seg(node_id))
}

pub fn transaction(user_id: &str, node_id: &str, trans_id: &str) -> String {
    format!("/users/{}/nodes/{}/trans/{}", seg(user_id), seg(node_id), seg(trans_id))
}

pub fn transaction_dispute(user_id: &str, node_id: &str, trans_id: &str) -> String {
    format!("/users/{}/nodes/{}/trans/{}/dispute", seg(user_id), seg(node_id), seg(trans_id))
}

pub fn dummy_transaction(user_id: &str, node_id: &str) -> String {
    format!("/users/{}/nodes/{}/dummy-tran", seg(user_id), seg(node_id))
}

pub fn subnets(user_id: &str, node_id: &str) -> String {
    format!("/users/{}/nodes/{}/subnets", seg(user_id), seg(node_id))
}

pub fn subnet(user_id: &str, node_id: &str, subnet_id: &str) -> String {
    format!("/users/{}/nodes/{}/subnets/{}", seg(user_id), seg(node_id), seg(subnet_id))
}

pub fn platform_transactions() -> String {
    "/trans".to_string()
}

pub fn platform_nodes() -> String {
    "/nodes".to_string()
}

pub fn institutions() -> String {
    "/institutions".to_string()
}

pub fn subscriptions() -> String {
    "/subscriptions".to_string()
}

pub fn subscription(subscription_id: &str) -> String {
    format!("/subscriptions/{}", seg(subscription_id))
}

pub fn webhook_logs() -> String {
    "/subscriptions/logs".to_string()
}

pub fn crypto_quotes() -> String {
    "/nodes/crypto-quotes".to_string()
}

pub fn client() -> String {
    "/client".to_string()
}

pub fn atms() -> String {
    "/nodes/atms".to_string()
}

pub fn routing_number_verification() -> String {
    "/routing-number-verification".to_string()
}

pub fn address_verification() -> String {
    "/address-verification".to_string()
}

/// Percent-encode one path segment so ids cannot add segments, a query or a fragment.
fn seg(id: &str) -> String {
    form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
