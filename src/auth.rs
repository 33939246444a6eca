/// Authentication and the single-retry-on-401 wrapper.
///
/// User-scoped calls run through [`SynapseClient::with_authentication`]. An
/// Unauthorized failure triggers one refresh-token exchange followed by one
/// more attempt; whatever that attempt returns is final. The OAuth calls here
/// are never wrapped themselves.
use log::debug;
use serde_json::{json, Value};

use crate::client::SynapseClient;
use crate::errors::{classify, ErrorEnvelope, Result, SynapseError};
use crate::http::ApiRequest;
use crate::models::{from_envelope, OAuthToken, User};
use crate::paths;

/// State of one wrapped call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRetry {
    /// First attempt with the current token.
    Attempt,
    /// Token refreshed, retry in flight. Terminal.
    Reauthenticating,
}

impl AuthRetry {
    /// Next state after a failure, or `None` if the failure is final.
    pub fn on_failure(self, err: &SynapseError) -> Option<AuthRetry> {
        match self {
            AuthRetry::Attempt if err.is_unauthorized() => Some(AuthRetry::Reauthenticating),
            _ => None,
        }
    }
}

impl SynapseClient {
    /// Execute a user-scoped request, re-authenticating once on Unauthorized.
    pub async fn with_authentication(
        &mut self,
        user: &mut User,
        request: ApiRequest,
    ) -> Result<Value> {
        self.install_user_token(user);

        let mut state = AuthRetry::Attempt;
        loop {
            let err = match self.http.execute(&request).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            match state.on_failure(&err) {
                Some(next) => {
                    debug!(
                        "auth.retry reauthenticating user_id={} path={}",
                        user.id, request.path
                    );
                    self.authenticate(user, None).await?;
                    state = next;
                }
                None => {
                    debug!(
                        "auth.retry giving_up state={:?} user_id={} error={}",
                        state, user.id, err
                    );
                    return Err(err);
                }
            }
        }
    }

    // Switching between users must not reuse another user's token.
    fn install_user_token(&mut self, user: &User) {
        if let Some(oauth_key) = &user.oauth_key {
            if self.http.session().bearer_token != *oauth_key {
                self.http.session_mut().set_bearer_token(oauth_key.clone());
            }
        }
    }

    /// POST /oauth/{user_id} - Exchange the refresh token for a new `oauth_key`.
    pub async fn authenticate(
        &mut self,
        user: &mut User,
        scope: Option<&[&str]>,
    ) -> Result<OAuthToken> {
        debug!("auth.authenticate user_id={} scope={:?}", user.id, scope);
        self.ensure_refresh_token(user).await?;
        let mut body = json!({ "refresh_token": user.refresh_token });
        if let Some(scope) = scope {
            body["scope"] = json!(scope);
        }
        let (status, response) = self.oauth(&user.id, body).await?;
        self.apply_token(user, status, response)
    }

    /// POST /oauth/{user_id} - Ask for a 2FA pin on the given phone number.
    ///
    /// The token is not touched; call [`SynapseClient::confirm_2fa_pin`] next.
    pub async fn select_2fa_device(
        &mut self,
        user: &mut User,
        phone_number: &str,
    ) -> Result<Value> {
        debug!("auth.select_2fa_device user_id={}", user.id);
        self.ensure_refresh_token(user).await?;
        let body = json!({
            "refresh_token": user.refresh_token,
            "phone_number": phone_number,
        });
        let (_, response) = self.oauth(&user.id, body).await?;
        Ok(response)
    }

    /// POST /oauth/{user_id} - Confirm the 2FA pin and install the issued token.
    pub async fn confirm_2fa_pin(&mut self, user: &mut User, pin: &str) -> Result<OAuthToken> {
        debug!("auth.confirm_2fa_pin user_id={}", user.id);
        self.ensure_refresh_token(user).await?;
        let body = json!({
            "refresh_token": user.refresh_token,
            "validation_pin": pin,
        });
        let (status, response) = self.oauth(&user.id, body).await?;
        self.apply_token(user, status, response)
    }

    async fn oauth(&self, user_id: &str, body: Value) -> Result<(u16, Value)> {
        self.http
            .execute_with_status(&ApiRequest::post(paths::oauth(user_id), body))
            .await
    }

    async fn ensure_refresh_token(&self, user: &mut User) -> Result<()> {
        if !user.refresh_token.is_empty() {
            return Ok(());
        }
        debug!("auth.ensure_refresh_token fetching user_id={}", user.id);
        let fetched = self.get_user(&user.id, false).await?;
        if fetched.refresh_token.is_empty() {
            return Err(SynapseError::Other(format!(
                "No refresh token available for user {}",
                user.id
            )));
        }
        user.refresh_token = fetched.refresh_token;
        Ok(())
    }

    fn apply_token(&mut self, user: &mut User, status: u16, response: Value) -> Result<OAuthToken> {
        // A body without oauth_key (e.g. 202 "pick a 2FA device") is not a token.
        if response.get("oauth_key").and_then(Value::as_str).is_none() {
            debug!(
                "auth.apply_token no_oauth_key user_id={} status={}",
                user.id, status
            );
            return Err(classify(ErrorEnvelope::normalize(response, status)));
        }
        let token: OAuthToken = from_envelope(response)?;
        user.apply_token(&token);
        self.http.session_mut().set_bearer_token(token.oauth_key.clone());
        debug!(
            "auth.apply_token user_id={} expires_in={:?}",
            user.id, token.expires_in
        );
        Ok(token)
    }
}
