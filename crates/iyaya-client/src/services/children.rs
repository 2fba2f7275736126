//! Child-profile façade.

use iyaya_core::{Child, Result};
use serde::Serialize;

use crate::http::{RequestOptions, SharedClient};
use crate::normalize;
use crate::retry::RetryPolicy;
use crate::services::read_policy;

/// Fields for a new child profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChild {
    pub name: String,
    pub age: Option<u8>,
    pub allergies: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct ChildrenService {
    client: SharedClient,
}

impl ChildrenService {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Lists the parent's child profiles.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn list(&self) -> Result<Vec<Child>> {
        let ttl = self.client.config().cache.default_ttl;
        let value = read_policy(&self.client)
            .run(|| {
                self.client
                    .request("children", RequestOptions::get().cached("children", ttl))
            })
            .await?;
        normalize::children(&value)
    }

    /// Adds a child profile. Zero retries.
    ///
    /// # Errors
    ///
    /// Surfaces the first failure directly.
    pub async fn create(&self, child: &NewChild) -> Result<Child> {
        let body = serde_json::to_value(child)?;
        let value = RetryPolicy::none()
            .run(|| {
                self.client.request(
                    "children",
                    RequestOptions::post(body.clone())
                        .with_idempotency_key(uuid::Uuid::new_v4().to_string())
                        .invalidating("children"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Updates a child profile.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn update(&self, id: &str, updates: serde_json::Value) -> Result<Child> {
        let path = format!("children/{id}");
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::put(updates.clone()).invalidating("children"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Removes a child profile.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("children/{id}");
        read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::delete().invalidating("children"),
                )
            })
            .await?;
        Ok(())
    }
}
