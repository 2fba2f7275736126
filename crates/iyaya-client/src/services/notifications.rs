//! Notifications façade.

use iyaya_core::{Notification, Result};
use serde::Deserialize;
use serde_json::json;

use crate::http::{RequestOptions, SharedClient};
use crate::normalize;
use crate::services::read_policy;

#[derive(Debug, Deserialize)]
struct UnreadCount {
    #[serde(default)]
    count: u64,
}

#[derive(Clone)]
pub struct NotificationsService {
    client: SharedClient,
}

impl NotificationsService {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Lists notifications, newest first.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn list(&self) -> Result<Vec<Notification>> {
        let ttl = self.client.config().cache.messages_ttl;
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    "notifications",
                    RequestOptions::get().cached("notifications", ttl),
                )
            })
            .await?;
        normalize::notifications(&value)
    }

    /// Marks one notification read.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn mark_read(&self, id: &str) -> Result<()> {
        let path = format!("notifications/{id}/read");
        read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::patch(json!({})).invalidating("notifications"),
                )
            })
            .await?;
        Ok(())
    }

    /// Number of unread notifications, for the badge.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn unread_count(&self) -> Result<u64> {
        let value = read_policy(&self.client)
            .run(|| {
                self.client
                    .request("notifications/unread-count", RequestOptions::get())
            })
            .await?;
        let parsed: UnreadCount = normalize::entity(&value)?;
        Ok(parsed.count)
    }
}
