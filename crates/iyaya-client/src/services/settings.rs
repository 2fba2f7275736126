//! Privacy and data-settings façade.

use iyaya_core::{PrivacyRequest, PrivacySettings, Result};
use serde_json::json;

use crate::http::{RequestOptions, SharedClient};
use crate::normalize;
use crate::services::read_policy;

#[derive(Clone)]
pub struct SettingsService {
    client: SharedClient,
}

impl SettingsService {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Fetches the user's privacy settings.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn privacy_settings(&self) -> Result<PrivacySettings> {
        let ttl = self.client.config().cache.default_ttl;
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    "privacy/settings",
                    RequestOptions::get().cached("privacy/settings", ttl),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Updates privacy settings.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn update_privacy_settings(
        &self,
        updates: serde_json::Value,
    ) -> Result<PrivacySettings> {
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    "privacy/settings",
                    RequestOptions::put(updates.clone()).invalidating("privacy"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Lists data-access requests awaiting a decision.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn pending_requests(&self) -> Result<Vec<PrivacyRequest>> {
        let value = read_policy(&self.client)
            .run(|| {
                self.client
                    .request("privacy/requests/pending", RequestOptions::get())
            })
            .await?;
        normalize::privacy_requests(&value)
    }

    /// Grants or denies a data-access request.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn respond(&self, request_id: &str, grant: bool) -> Result<()> {
        let decision = if grant { "granted" } else { "denied" };
        let path = format!("privacy/requests/{request_id}");
        read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::patch(json!({"status": decision})).invalidating("privacy"),
                )
            })
            .await?;
        Ok(())
    }
}
