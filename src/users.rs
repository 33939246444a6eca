/// User-scoped operations: nodes, transactions, subnets and statements.
///
/// Every call here requires the user's `oauth_key` and runs through
/// [`SynapseClient::with_authentication`].
use log::debug;
use serde_json::{json, Value};

use crate::client::SynapseClient;
use crate::errors::Result;
use crate::http::ApiRequest;
use crate::models::*;
use crate::paths;

impl SynapseClient {
    // -----------------------------------------------------------------------
    // User
    // -----------------------------------------------------------------------

    /// PATCH /users/{user_id} - Update user info or documents.
    pub async fn update_user(&mut self, user: &mut User, payload: Value) -> Result<User> {
        debug!("users.update_user user_id={}", user.id);
        let request = ApiRequest::patch(paths::user(&user.id), payload);
        let value = self.with_authentication(user, request).await?;
        let updated: User = from_envelope(value)?;
        Ok(updated.inherit_auth(user))
    }

    /// PATCH /users/{user_id}/ubo - Generate the UBO form.
    pub async fn generate_ubo(&mut self, user: &mut User, payload: Value) -> Result<Value> {
        debug!("users.generate_ubo user_id={}", user.id);
        let request = ApiRequest::patch(paths::ubo(&user.id), payload);
        self.with_authentication(user, request).await
    }

    /// GET /users/{user_id}/statements
    pub async fn get_user_statements(
        &mut self,
        user: &mut User,
        options: &QueryOptions,
    ) -> Result<Value> {
        debug!("users.get_user_statements user_id={}", user.id);
        let request = ApiRequest::get(paths::user_statements(&user.id)).query(options.to_query());
        self.with_authentication(user, request).await
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// POST /users/{user_id}/nodes - Create a node.
    ///
    /// Bank-login nodes may answer with an MFA challenge instead of nodes.
    pub async fn create_node(
        &mut self,
        user: &mut User,
        payload: Value,
        idempotency_key: Option<&str>,
    ) -> Result<CreateNodeResponse> {
        debug!("users.create_node user_id={}", user.id);
        let request =
            ApiRequest::post(paths::user_nodes(&user.id), payload).idempotency_key(idempotency_key);
        let value = self.with_authentication(user, request).await?;
        CreateNodeResponse::from_envelope(value)
    }

    /// POST /users/{user_id}/nodes - Answer a bank-login MFA question.
    pub async fn answer_node_mfa(
        &mut self,
        user: &mut User,
        access_token: &str,
        mfa_answer: &str,
    ) -> Result<CreateNodeResponse> {
        debug!("users.answer_node_mfa user_id={}", user.id);
        let body = json!({ "access_token": access_token, "mfa_answer": mfa_answer });
        let request = ApiRequest::post(paths::user_nodes(&user.id), body);
        let value = self.with_authentication(user, request).await?;
        CreateNodeResponse::from_envelope(value)
    }

    /// GET /users/{user_id}/nodes/{node_id}
    pub async fn get_node(
        &mut self,
        user: &mut User,
        node_id: &str,
        options: &QueryOptions,
    ) -> Result<Node> {
        debug!("users.get_node user_id={} node_id={}", user.id, node_id);
        let request = ApiRequest::get(paths::node(&user.id, node_id)).query(options.to_query());
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// GET /users/{user_id}/nodes
    pub async fn get_user_nodes(
        &mut self,
        user: &mut User,
        options: &QueryOptions,
    ) -> Result<Nodes> {
        debug!(
            "users.get_user_nodes user_id={} options={:?}",
            user.id, options
        );
        let request = ApiRequest::get(paths::user_nodes(&user.id)).query(options.to_query());
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// PATCH /users/{user_id}/nodes/{node_id}
    pub async fn update_node(
        &mut self,
        user: &mut User,
        node_id: &str,
        payload: Value,
    ) -> Result<Node> {
        debug!("users.update_node user_id={} node_id={}", user.id, node_id);
        let request = ApiRequest::patch(paths::node(&user.id, node_id), payload);
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// DELETE /users/{user_id}/nodes/{node_id}
    pub async fn delete_node(&mut self, user: &mut User, node_id: &str) -> Result<Value> {
        debug!("users.delete_node user_id={} node_id={}", user.id, node_id);
        let request = ApiRequest::delete(paths::node(&user.id, node_id));
        self.with_authentication(user, request).await
    }

    /// PATCH /users/{user_id}/nodes/{node_id} - Verify micro-deposit amounts.
    pub async fn verify_micro_deposits(
        &mut self,
        user: &mut User,
        node_id: &str,
        amounts: &[f64],
    ) -> Result<Node> {
        debug!(
            "users.verify_micro_deposits user_id={} node_id={}",
            user.id, node_id
        );
        let request =
            ApiRequest::patch(paths::node(&user.id, node_id), json!({ "micro": amounts }));
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// PATCH /users/{user_id}/nodes/{node_id}?resend_micro=YES
    pub async fn reinitiate_micro_deposits(
        &mut self,
        user: &mut User,
        node_id: &str,
    ) -> Result<Node> {
        debug!(
            "users.reinitiate_micro_deposits user_id={} node_id={}",
            user.id, node_id
        );
        let request = ApiRequest::patch(paths::node(&user.id, node_id), json!({}))
            .query(vec![("resend_micro".to_string(), "YES".to_string())]);
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// PATCH /users/{user_id}/nodes/{node_id}?reset=YES - Reissue a debit card.
    pub async fn reset_debit_card(&mut self, user: &mut User, node_id: &str) -> Result<Node> {
        debug!("users.reset_debit_card user_id={} node_id={}", user.id, node_id);
        let request = ApiRequest::patch(paths::node(&user.id, node_id), json!({}))
            .query(vec![("reset".to_string(), "YES".to_string())]);
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// PATCH /users/{user_id}/nodes/{node_id}?ship=YES - Ship a physical card.
    pub async fn ship_debit_card(
        &mut self,
        user: &mut User,
        node_id: &str,
        payload: Value,
    ) -> Result<Node> {
        debug!("users.ship_debit_card user_id={} node_id={}", user.id, node_id);
        let request = ApiRequest::patch(paths::node(&user.id, node_id), payload)
            .query(vec![("ship".to_string(), "YES".to_string())]);
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// GET /users/{user_id}/nodes/{node_id}/statements
    pub async fn get_node_statements(
        &mut self,
        user: &mut User,
        node_id: &str,
        options: &QueryOptions,
    ) -> Result<Value> {
        debug!(
            "users.get_node_statements user_id={} node_id={}",
            user.id, node_id
        );
        let request =
            ApiRequest::get(paths::node_statements(&user.id, node_id)).query(options.to_query());
        self.with_authentication(user, request).await
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// POST /users/{user_id}/nodes/{node_id}/trans
    pub async fn create_transaction(
        &mut self,
        user: &mut User,
        node_id: &str,
        payload: Value,
        idempotency_key: Option<&str>,
    ) -> Result<Transaction> {
        debug!(
            "users.create_transaction user_id={} node_id={} idempotent={}",
            user.id,
            node_id,
            idempotency_key.is_some()
        );
        let request = ApiRequest::post(paths::node_transactions(&user.id, node_id), payload)
            .idempotency_key(idempotency_key);
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// GET /users/{user_id}/nodes/{node_id}/trans/{trans_id}
    pub async fn get_transaction(
        &mut self,
        user: &mut User,
        node_id: &str,
        trans_id: &str,
    ) -> Result<Transaction> {
        debug!(
            "users.get_transaction user_id={} node_id={} trans_id={}",
            user.id, node_id, trans_id
        );
        let request = ApiRequest::get(paths::transaction(&user.id, node_id, trans_id));
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// GET /users/{user_id}/nodes/{node_id}/trans
    pub async fn get_node_transactions(
        &mut self,
        user: &mut User,
        node_id: &str,
        options: &QueryOptions,
    ) -> Result<Transactions> {
        debug!(
            "users.get_node_transactions user_id={} node_id={} options={:?}",
            user.id, node_id, options
        );
        let request =
            ApiRequest::get(paths::node_transactions(&user.id, node_id)).query(options.to_query());
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// GET /users/{user_id}/trans
    pub async fn get_user_transactions(
        &mut self,
        user: &mut User,
        options: &QueryOptions,
    ) -> Result<Transactions> {
        debug!(
            "users.get_user_transactions user_id={} options={:?}",
            user.id, options
        );
        let request =
            ApiRequest::get(paths::user_transactions(&user.id)).query(options.to_query());
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// PATCH /users/{user_id}/nodes/{node_id}/trans/{trans_id} - Add a comment.
    pub async fn comment_transaction(
        &mut self,
        user: &mut User,
        node_id: &str,
        trans_id: &str,
        comment: &str,
    ) -> Result<Transaction> {
        debug!(
            "users.comment_transaction user_id={} node_id={} trans_id={}",
            user.id, node_id, trans_id
        );
        let request = ApiRequest::patch(
            paths::transaction(&user.id, node_id, trans_id),
            json!({ "comment": comment }),
        );
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// DELETE /users/{user_id}/nodes/{node_id}/trans/{trans_id}
    pub async fn cancel_transaction(
        &mut self,
        user: &mut User,
        node_id: &str,
        trans_id: &str,
    ) -> Result<Transaction> {
        debug!(
            "users.cancel_transaction user_id={} node_id={} trans_id={}",
            user.id, node_id, trans_id
        );
        let request = ApiRequest::delete(paths::transaction(&user.id, node_id, trans_id));
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// PATCH /users/{user_id}/nodes/{node_id}/trans/{trans_id}/dispute
    pub async fn dispute_transaction(
        &mut self,
        user: &mut User,
        node_id: &str,
        trans_id: &str,
        dispute_reason: &str,
    ) -> Result<Transaction> {
        debug!(
            "users.dispute_transaction user_id={} node_id={} trans_id={}",
            user.id, node_id, trans_id
        );
        let request = ApiRequest::patch(
            paths::transaction_dispute(&user.id, node_id, trans_id),
            json!({ "dispute_reason": dispute_reason }),
        );
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// GET /users/{user_id}/nodes/{node_id}/dummy-tran - Sandbox test transaction.
    pub async fn create_dummy_transaction(
        &mut self,
        user: &mut User,
        node_id: &str,
        is_credit: bool,
        subnet_id: Option<&str>,
    ) -> Result<Value> {
        debug!(
            "users.create_dummy_transaction user_id={} node_id={} is_credit={}",
            user.id, node_id, is_credit
        );
        let mut query = vec![(
            "is_credit".to_string(),
            if is_credit { "YES" } else { "NO" }.to_string(),
        )];
        if let Some(subnet_id) = subnet_id {
            query.push(("subnet_id".to_string(), subnet_id.to_string()));
        }
        let request = ApiRequest::get(paths::dummy_transaction(&user.id, node_id)).query(query);
        self.with_authentication(user, request).await
    }

    // -----------------------------------------------------------------------
    // Subnets
    // -----------------------------------------------------------------------

    /// POST /users/{user_id}/nodes/{node_id}/subnets
    pub async fn create_subnet(
        &mut self,
        user: &mut User,
        node_id: &str,
        payload: Value,
        idempotency_key: Option<&str>,
    ) -> Result<Subnet> {
        debug!("users.create_subnet user_id={} node_id={}", user.id, node_id);
        let request = ApiRequest::post(paths::subnets(&user.id, node_id), payload)
            .idempotency_key(idempotency_key);
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// GET /users/{user_id}/nodes/{node_id}/subnets/{subnet_id}
    pub async fn get_subnet(
        &mut self,
        user: &mut User,
        node_id: &str,
        subnet_id: &str,
        options: &QueryOptions,
    ) -> Result<Subnet> {
        debug!(
            "users.get_subnet user_id={} node_id={} subnet_id={}",
            user.id, node_id, subnet_id
        );
        let request =
            ApiRequest::get(paths::subnet(&user.id, node_id, subnet_id)).query(options.to_query());
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// GET /users/{user_id}/nodes/{node_id}/subnets
    pub async fn get_node_subnets(
        &mut self,
        user: &mut User,
        node_id: &str,
        options: &QueryOptions,
    ) -> Result<Subnets> {
        debug!(
            "users.get_node_subnets user_id={} node_id={} options={:?}",
            user.id, node_id, options
        );
        let request = ApiRequest::get(paths::subnets(&user.id, node_id)).query(options.to_query());
        from_envelope(self.with_authentication(user, request).await?)
    }

    /// PATCH /users/{user_id}/nodes/{node_id}/subnets/{subnet_id}
    pub async fn update_subnet(
        &mut self,
        user: &mut User,
        node_id: &str,
        subnet_id: &str,
        payload: Value,
    ) -> Result<Subnet> {
        debug!(
            "users.update_subnet user_id={} node_id={} subnet_id={}",
            user.id, node_id, subnet_id
        );
        let request = ApiRequest::patch(paths::subnet(&user.id, node_id, subnet_id), payload);
        from_envelope(self.with_authentication(user, request).await?)
    }
}
