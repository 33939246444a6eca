/// High-level SynapseClient for platform-scoped operations.
///
/// This is the primary entry point for SDK users. It owns the HTTP transport
/// and the session credentials; user-scoped calls live in `users.rs` and go
/// through the auth-retry wrapper in `auth.rs`.
use log::debug;
use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::errors::Result;
use crate::http::{ApiRequest, HttpClient};
use crate::models::*;
use crate::paths;
use crate::session::{HeaderUpdate, SessionConfig};

/// The high-level Synapse client.
///
/// Mutating calls take `&mut self`: the session (and its bearer token) belongs
/// to one client. Share a client across tasks only behind a lock, or create one
/// client per task.
#[derive(Debug, Clone)]
pub struct SynapseClient {
    pub http: HttpClient,
    pub config: ClientConfig,
}

impl SynapseClient {
    /// Create a new client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        debug!(
            "client.new environment={:?} raise_for_202={} timeout={:?}",
            config.environment(),
            config.raise_for_202,
            config.timeout
        );
        Ok(Self {
            http: HttpClient::new(&config)?,
            config,
        })
    }

    pub fn session(&self) -> &SessionConfig {
        self.http.session()
    }

    /// Update session headers (fingerprint, IP, token, gateway, idempotency key).
    pub fn update_headers(&mut self, update: HeaderUpdate) {
        debug!(
            "client.update_headers fingerprint={} ip_address={} oauth_key={} idempotency_key={}",
            update.fingerprint.is_some(),
            update.ip_address.is_some(),
            update.oauth_key.is_some(),
            update.idempotency_key.is_some()
        );
        self.http.session_mut().update(update);
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// POST /users - Create a user.
    pub async fn create_user(&self, payload: Value, idempotency_key: Option<&str>) -> Result<User> {
        debug!("client.create_user");
        let request = ApiRequest::post(paths::users(), payload).idempotency_key(idempotency_key);
        from_envelope(self.http.execute(&request).await?)
    }

    /// GET /users/{user_id} - Fetch one user.
    pub async fn get_user(&self, user_id: &str, full_dehydrate: bool) -> Result<User> {
        debug!(
            "client.get_user user_id={} full_dehydrate={}",
            user_id, full_dehydrate
        );
        let options = QueryOptions {
            full_dehydrate: Some(full_dehydrate),
            ..QueryOptions::default()
        };
        let request = ApiRequest::get(paths::user(user_id)).query(options.to_query());
        from_envelope(self.http.execute(&request).await?)
    }

    /// GET /users - List users on the platform.
    pub async fn get_users(&self, options: &QueryOptions) -> Result<Users> {
        debug!("client.get_users options={:?}", options);
        let request = ApiRequest::get(paths::users()).query(options.to_query());
        from_envelope(self.http.execute(&request).await?)
    }

    // -----------------------------------------------------------------------
    // Platform-wide listings
    // -----------------------------------------------------------------------

    /// GET /trans - All transactions on the platform.
    pub async fn get_platform_transactions(&self, options: &QueryOptions) -> Result<Transactions> {
        debug!("client.get_platform_transactions options={:?}", options);
        let request = ApiRequest::get(paths::platform_transactions()).query(options.to_query());
        from_envelope(self.http.execute(&request).await?)
    }

    /// GET /nodes - All nodes on the platform.
    pub async fn get_platform_nodes(&self, options: &QueryOptions) -> Result<Nodes> {
        debug!("client.get_platform_nodes options={:?}", options);
        let request = ApiRequest::get(paths::platform_nodes()).query(options.to_query());
        from_envelope(self.http.execute(&request).await?)
    }

    /// GET /institutions - Supported bank institutions.
    pub async fn get_institutions(&self) -> Result<Value> {
        debug!("client.get_institutions");
        self.http.execute(&ApiRequest::get(paths::institutions())).await
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// POST /subscriptions - Register a webhook.
    pub async fn create_subscription(
        &self,
        url: &str,
        scope: &[&str],
        idempotency_key: Option<&str>,
    ) -> Result<Subscription> {
        debug!("client.create_subscription url={} scope={:?}", url, scope);
        let body = json!({ "url": url, "scope": scope });
        let request =
            ApiRequest::post(paths::subscriptions(), body).idempotency_key(idempotency_key);
        from_envelope(self.http.execute(&request).await?)
    }

    /// GET /subscriptions/{subscription_id}
    pub async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        debug!("client.get_subscription subscription_id={}", subscription_id);
        let request = ApiRequest::get(paths::subscription(subscription_id));
        from_envelope(self.http.execute(&request).await?)
    }

    /// GET /subscriptions
    pub async fn get_subscriptions(&self, options: &QueryOptions) -> Result<Subscriptions> {
        debug!("client.get_subscriptions options={:?}", options);
        let request = ApiRequest::get(paths::subscriptions()).query(options.to_query());
        from_envelope(self.http.execute(&request).await?)
    }

    /// PATCH /subscriptions/{subscription_id}
    pub async fn update_subscription(
        &self,
        subscription_id: &str,
        payload: Value,
    ) -> Result<Subscription> {
        debug!("client.update_subscription subscription_id={}", subscription_id);
        let request = ApiRequest::patch(paths::subscription(subscription_id), payload);
        from_envelope(self.http.execute(&request).await?)
    }

    /// GET /subscriptions/logs - Webhook delivery logs.
    pub async fn get_webhook_logs(&self) -> Result<Value> {
        debug!("client.get_webhook_logs");
        self.http.execute(&ApiRequest::get(paths::webhook_logs())).await
    }

    // -----------------------------------------------------------------------
    // Utilities
    // -----------------------------------------------------------------------

    /// GET /nodes/crypto-quotes
    pub async fn get_crypto_quotes(&self) -> Result<Value> {
        debug!("client.get_crypto_quotes");
        self.http.execute(&ApiRequest::get(paths::crypto_quotes())).await
    }

    /// GET /client?issue_public_key=YES - Public key for client-side widgets.
    pub async fn issue_public_key(&self, scope: &[&str], user_id: Option<&str>) -> Result<Value> {
        debug!(
            "client.issue_public_key scope={:?} user_id={:?}",
            scope, user_id
        );
        let mut query = vec![
            ("issue_public_key".to_string(), "YES".to_string()),
            ("scope".to_string(), scope.join(",")),
        ];
        if let Some(user_id) = user_id {
            query.push(("user_id".to_string(), user_id.to_string()));
        }
        let request = ApiRequest::get(paths::client()).query(query);
        self.http.execute(&request).await
    }

    /// GET /nodes/atms - ATMs near a zip code or coordinates.
    pub async fn locate_atms(
        &self,
        zip: Option<&str>,
        lat_lon: Option<(f64, f64)>,
        radius: Option<u32>,
        options: &QueryOptions,
    ) -> Result<Value> {
        debug!(
            "client.locate_atms zip={:?} lat_lon={:?} radius={:?}",
            zip, lat_lon, radius
        );
        let mut query = options.to_query();
        if let Some(zip) = zip {
            query.push(("zip".to_string(), zip.to_string()));
        }
        if let Some((lat, lon)) = lat_lon {
            query.push(("lat".to_string(), lat.to_string()));
            query.push(("lon".to_string(), lon.to_string()));
        }
        if let Some(radius) = radius {
            query.push(("radius".to_string(), radius.to_string()));
        }
        let request = ApiRequest::get(paths::atms()).query(query);
        self.http.execute(&request).await
    }

    /// POST /routing-number-verification
    pub async fn verify_routing_number(&self, routing_num: &str, node_type: &str) -> Result<Value> {
        debug!(
            "client.verify_routing_number routing_num={} type={}",
            routing_num, node_type
        );
        let body = json!({ "routing_num": routing_num, "type": node_type });
        let request = ApiRequest::post(paths::routing_number_verification(), body);
        self.http.execute(&request).await
    }

    /// POST /address-verification
    pub async fn verify_address(&self, address: Value) -> Result<Value> {
        debug!("client.verify_address");
        let request = ApiRequest::post(paths::address_verification(), address);
        self.http.execute(&request).await
    }
}
