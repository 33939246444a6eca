/// Auth-retry and OAuth flow tests against a mock Synapse API.
mod common;

use std::time::Duration;

use serde_json::json;
use synapse_sdk::{QueryOptions, SynapseError, User};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::*;

fn nodes_path() -> String {
    api_path(&format!("/users/{USER_ID}/nodes"))
}

fn oauth_path() -> String {
    api_path(&format!("/oauth/{USER_ID}"))
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_call_retried_once() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(nodes_path()))
        .and(header("X-SP-USER", format!("stale|{FINGERPRINT}").as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(unauthorized_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .and(body_json(json!({ "refresh_token": REFRESH_TOKEN })))
        .respond_with(ResponseTemplate::new(200).set_body_json(oauth_json("fresh")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(nodes_path()))
        .and(header("X-SP-USER", format!("fresh|{FINGERPRINT}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes_json()))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user = user_with_token("stale");

    let nodes = assert_ok!(
        client
            .get_user_nodes(&mut user, &QueryOptions::default())
            .await
    );
    assert_eq!(nodes.nodes.len(), 1);
    assert_eq!(nodes.nodes[0].id, NODE_ID);
    assert_eq!(user.oauth_key.as_deref(), Some("fresh"));
    assert_eq!(user.expires_in.as_deref(), Some("7200"));
    assert_eq!(client.session().bearer_token, "fresh");
}

#[tokio::test]
async fn test_second_unauthorized_is_returned_without_third_attempt() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(nodes_path()))
        .respond_with(ResponseTemplate::new(401).set_body_json(unauthorized_json()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(oauth_json("fresh")))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user = user_with_token("stale");

    let err = assert_err!(
        client
            .get_user_nodes(&mut user, &QueryOptions::default())
            .await
    );
    assert!(err.is_unauthorized(), "{err:?}");
    assert_eq!(err.http_code(), Some(401));
    assert_eq!(err.message(), "OAuth key expired. Please re-authenticate.");
}

#[tokio::test]
async fn test_other_failures_are_not_retried() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(nodes_path()))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "en": "Server Error." },
            "error_code": "500",
            "http_code": "500",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(oauth_json("fresh")))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user = user_with_token("stale");

    let err = assert_err!(
        client
            .get_user_nodes(&mut user, &QueryOptions::default())
            .await
    );
    assert!(matches!(err, SynapseError::ServerError(_)));
    assert_eq!(user.oauth_key.as_deref(), Some("stale"));
}

#[tokio::test]
async fn test_timeout_is_not_retried() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(nodes_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(nodes_json())
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(oauth_json("fresh")))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server).timeout(Duration::from_millis(100));
    let mut client = assert_ok!(synapse_sdk::SynapseClient::new(config));
    let mut user = user_with_token("stale");

    let err = assert_err!(
        client
            .get_user_nodes(&mut user, &QueryOptions::default())
            .await
    );
    assert!(matches!(err, SynapseError::Timeout(_)));
    assert_eq!(err.http_code(), Some(504));
    assert_eq!(err.message(), "Request Timeout");

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn test_failed_reauthentication_is_propagated() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(nodes_path()))
        .respond_with(ResponseTemplate::new(401).set_body_json(unauthorized_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "en": "Refresh token expired." },
            "error_code": "200",
            "http_code": "400",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user = user_with_token("stale");

    let err = assert_err!(
        client
            .get_user_nodes(&mut user, &QueryOptions::default())
            .await
    );
    assert!(matches!(err, SynapseError::ValidationFailed(_)), "{err:?}");
    assert_eq!(err.message(), "Refresh token expired.");
}

#[tokio::test]
async fn test_authenticate_is_not_wrapped() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .respond_with(ResponseTemplate::new(401).set_body_json(unauthorized_json()))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user = user_with_token("stale");

    let err = assert_err!(client.authenticate(&mut user, None).await);
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_authenticate_with_scope() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .and(body_json(json!({
            "refresh_token": REFRESH_TOKEN,
            "scope": ["USER|PATCH", "NODES|GET"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(oauth_json("scoped")))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user = user_with_token("stale");

    let token = assert_ok!(
        client
            .authenticate(&mut user, Some(&["USER|PATCH", "NODES|GET"]))
            .await
    );
    assert_eq!(token.oauth_key, "scoped");
    assert_eq!(token.scope, vec!["USER|PATCH", "NODES|GET"]);
    assert_eq!(client.session().bearer_token, "scoped");
}

#[tokio::test]
async fn test_missing_refresh_token_is_fetched_first() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(api_path(&format!("/users/{USER_ID}"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .and(body_json(json!({ "refresh_token": REFRESH_TOKEN })))
        .respond_with(ResponseTemplate::new(200).set_body_json(oauth_json("fresh")))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user = user_with_token("stale");
    user.refresh_token.clear();

    assert_ok!(client.authenticate(&mut user, None).await);
    assert_eq!(user.refresh_token, REFRESH_TOKEN);
    assert_eq!(user.oauth_key.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_two_factor_flow() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .and(body_json(json!({
            "refresh_token": REFRESH_TOKEN,
            "phone_number": "901.111.1111",
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "error_code": "10",
            "http_code": "202",
            "message": "MFA sent to 901.111.1111.",
            "success": true,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .and(body_json(json!({
            "refresh_token": REFRESH_TOKEN,
            "validation_pin": "123456",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(oauth_json("confirmed")))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user: User = assert_ok!(serde_json::from_value(user_json()));

    let selected = assert_ok!(client.select_2fa_device(&mut user, "901.111.1111").await);
    assert_eq!(selected["http_code"], "202");
    assert!(client.session().bearer_token.is_empty());
    assert!(user.oauth_key.is_none());

    let token = assert_ok!(client.confirm_2fa_pin(&mut user, "123456").await);
    assert_eq!(token.oauth_key, "confirmed");
    assert_eq!(user.oauth_key.as_deref(), Some("confirmed"));
    assert_eq!(client.session().bearer_token, "confirmed");
}

#[tokio::test]
async fn test_unregistered_fingerprint_surfaces_phone_numbers() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "error_code": "10",
            "http_code": "202",
            "message": "Fingerprint not registered. Please perform the MFA flow.",
            "phone_numbers": ["901.111.1111", "test@synapsefi.com"],
            "success": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user: User = assert_ok!(serde_json::from_value(user_json()));

    let err = assert_err!(client.authenticate(&mut user, None).await);
    match err {
        SynapseError::Unknown(api) => {
            assert_eq!(api.http_code, 202);
            assert_eq!(api.error_code.as_deref(), Some("10"));
            assert_eq!(api.response["phone_numbers"][0], "901.111.1111");
        }
        other => panic!("expected Unknown(202), got {other:?}"),
    }
    assert!(client.session().bearer_token.is_empty());
}

#[tokio::test]
async fn test_user_token_installed_when_switching_users() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(nodes_path()))
        .and(header("X-SP-USER", format!("user-a-token|{FINGERPRINT}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes_json()))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.update_headers(synapse_sdk::HeaderUpdate {
        oauth_key: Some("someone-else".into()),
        ..Default::default()
    });
    let mut user = user_with_token("user-a-token");

    assert_ok!(
        client
            .get_user_nodes(&mut user, &QueryOptions::default())
            .await
    );
    assert_eq!(client.session().bearer_token, "user-a-token");
}

#[tokio::test]
async fn test_oauth_reply_without_key_keeps_transport_status() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user = user_with_token("stale");

    let err = assert_err!(client.authenticate(&mut user, None).await);
    assert!(matches!(err, SynapseError::Unknown(_)), "{err:?}");
    assert_eq!(err.http_code(), Some(200));
    assert_eq!(user.oauth_key.as_deref(), Some("stale"));
}

#[tokio::test]
async fn test_retried_post_resends_body_and_idempotency_key() {
    let server = setup_mock_server().await;
    let trans_path = api_path(&format!("/users/{USER_ID}/nodes/{NODE_ID}/trans"));
    let payload = json!({
        "to": { "type": "DEPOSIT-US", "id": "5bd9e7b3389f2400adb012af" },
        "amount": { "amount": 100.1, "currency": "USD" },
        "extra": { "ip": "1.2.3.4" },
    });
    Mock::given(method("POST"))
        .and(path(trans_path.clone()))
        .respond_with(ResponseTemplate::new(401).set_body_json(unauthorized_json()))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(trans_path.clone()))
        .and(header("X-SP-USER", format!("fresh|{FINGERPRINT}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(transaction_json("tx_1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(oauth_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(oauth_json("fresh")))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let mut user = user_with_token("stale");

    let trans = assert_ok!(
        client
            .create_transaction(&mut user, NODE_ID, payload.clone(), Some("tx-key"))
            .await
    );
    assert_eq!(trans.id, "tx_1");

    let received = server.received_requests().await.expect("recording enabled");
    let idempotency = |r: &wiremock::Request| {
        r.headers
            .get("x-sp-idempotency-key")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let attempts: Vec<_> = received.iter().filter(|r| r.url.path() == trans_path).collect();
    assert_eq!(attempts.len(), 2);
    for attempt in &attempts {
        let body: serde_json::Value = assert_ok!(serde_json::from_slice(&attempt.body));
        assert_eq!(body, payload);
        assert_eq!(idempotency(*attempt).as_deref(), Some("tx-key"));
    }

    let oauth: Vec<_> = received
        .iter()
        .filter(|r| r.url.path() == oauth_path())
        .collect();
    assert_eq!(oauth.len(), 1);
    assert_eq!(idempotency(oauth[0]), None);
}
