//! Password sign-in against the identity toolkit REST API
//!
//! `POST {endpoint}/accounts:signInWithPassword?key={api_key}` with the
//! email and password. The tokens in the response are not interpreted;
//! they are persisted so the next run restores the session.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::provider::IdentityProvider;
use crate::auth::session::{AuthUser, SessionHub, SessionState};
use crate::auth::token_store::{Credential, CredentialStore};
use crate::config::IdentityConfig;
use crate::error::{GroupcastError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Identity toolkit provider
pub struct IdentityToolkitProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    store: Arc<dyn CredentialStore>,
    hub: SessionHub,
}

impl IdentityToolkitProvider {
    /// Build a provider publishing to `hub`
    ///
    /// The API key is only needed for sign-in; restoring and signing out
    /// work without one.
    pub fn new(
        config: &IdentityConfig,
        store: Arc<dyn CredentialStore>,
        hub: SessionHub,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("groupcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GroupcastError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            store,
            hub,
        })
    }

    fn sign_in_url(&self) -> String {
        format!("{}/accounts:signInWithPassword", self.endpoint)
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    fn hub(&self) -> &SessionHub {
        &self.hub
    }

    async fn restore(&self) -> Result<()> {
        let state = match self.store.load() {
            Ok(Some(credential)) => SessionState::Authenticated(credential.user()),
            Ok(None) => SessionState::Unauthenticated,
            Err(e) => {
                tracing::warn!("Could not read stored credential: {}", e);
                SessionState::Unauthenticated
            }
        };
        self.hub.publish(state);
        Ok(())
    }

    async fn sign_in_with_password(&self, login: &str, password: &str) -> Result<AuthUser> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GroupcastError::Config("identity.api_key is not set".into()))?;

        tracing::debug!("Signing in {}", login);
        let response = self
            .client
            .post(self.sign_in_url())
            .query(&[("key", api_key)])
            .json(&SignInRequest {
                email: login,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(GroupcastError::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(GroupcastError::Http)?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| status.to_string());
            tracing::debug!("Sign-in rejected ({}): {}", status, reason);
            return Err(GroupcastError::Auth(reason).into());
        }

        let signed_in: SignInResponse = serde_json::from_str(&body)
            .map_err(|e| GroupcastError::Auth(format!("invalid sign-in response: {}", e)))?;

        let credential = Credential {
            local_id: signed_in.local_id,
            email: signed_in.email.or_else(|| Some(login.to_string())),
            id_token: signed_in.id_token,
            refresh_token: signed_in.refresh_token,
            expires_in: signed_in.expires_in,
            signed_in_at: Utc::now(),
        };
        self.store.save(&credential)?;

        let user = credential.user();
        tracing::info!("Signed in as {}", user.display_name());
        self.hub.publish(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.store.delete()?;
        self.hub.publish(SessionState::Unauthenticated);
        tracing::info!("Signed out");
        Ok(())
    }
}
