//! Authentication façade: login, registration, profile, logout.

use iyaya_core::{AuthSession, Result, UserProfile};
use serde_json::json;

use crate::http::{RequestOptions, SharedClient};
use crate::normalize;
use crate::services::read_policy;

#[derive(Clone)]
pub struct AuthService {
    client: SharedClient,
}

impl AuthService {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Signs in and persists the returned bearer token. Never retried:
    /// repeated submissions could trip rate limiting or lockout counters.
    ///
    /// # Errors
    ///
    /// Bad credentials surface as an auth error; transport failures keep
    /// their classified kinds.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let body = json!({ "email": email, "password": password });
        let value = self
            .client
            .request("auth/login", RequestOptions::post(body).anonymous())
            .await?;
        let session: AuthSession = normalize::entity(&value)?;
        self.client.tokens().store(&session.token)?;
        // A new identity invalidates everything cached for the old one.
        self.client.cache().clear().await;
        Ok(session)
    }

    /// Registers a new account and signs it in.
    ///
    /// # Errors
    ///
    /// Propagates the classified error; duplicate emails surface as
    /// validation errors.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<AuthSession> {
        let body = json!({
            "name": name,
            "email": email,
            "password": password,
            "role": role,
        });
        let value = self
            .client
            .request(
                "auth/register",
                RequestOptions::post(body)
                    .anonymous()
                    .with_idempotency_key(uuid::Uuid::new_v4().to_string()),
            )
            .await?;
        let session: AuthSession = normalize::entity(&value)?;
        self.client.tokens().store(&session.token)?;
        self.client.cache().clear().await;
        Ok(session)
    }

    /// Fetches the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns an auth error when no session exists.
    pub async fn profile(&self) -> Result<UserProfile> {
        let ttl = self.client.config().cache.default_ttl;
        let value = read_policy(&self.client)
            .run(|| {
                self.client
                    .request("auth/profile", RequestOptions::get().cached("auth/profile", ttl))
            })
            .await?;
        normalize::entity(&value)
    }

    /// Updates profile fields. Idempotent, so the default retry applies.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn update_profile(&self, updates: serde_json::Value) -> Result<UserProfile> {
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    "auth/profile",
                    RequestOptions::put(updates.clone()).invalidating("auth/profile"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Signs out locally: forgets the token and drops every cached
    /// response. No server call is made.
    ///
    /// # Errors
    ///
    /// Returns an error when the persisted token cannot be removed.
    pub async fn logout(&self) -> Result<()> {
        self.client.tokens().clear()?;
        self.client.cache().clear().await;
        tracing::debug!("signed out, local session cleared");
        Ok(())
    }

    /// Whether a structurally valid token is currently persisted.
    pub fn is_signed_in(&self) -> bool {
        self.client.tokens().current().is_some()
    }
}
