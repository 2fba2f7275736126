//! Caregiver search façade.

use iyaya_core::{Caregiver, CaregiverPage, Result};

use crate::cache::cache_key;
use crate::http::{RequestOptions, SharedClient};
use crate::normalize;
use crate::services::read_policy;

#[derive(Clone)]
pub struct CaregiversService {
    client: SharedClient,
}

impl CaregiversService {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Searches caregivers with the given filters. Results tolerate
    /// staleness, so they get the longer caregiver TTL.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn search(&self, filters: &[(String, String)]) -> Result<CaregiverPage> {
        let key = cache_key("caregivers", filters);
        let ttl = self.client.config().cache.caregivers_ttl;
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    "caregivers",
                    RequestOptions::get()
                        .with_query(filters.to_vec())
                        .cached(key.clone(), ttl),
                )
            })
            .await?;
        normalize::caregivers(&value)
    }

    /// Fetches one caregiver profile. What the caller sees in it is
    /// governed by the owner's privacy settings, server-side.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn get(&self, id: &str) -> Result<Caregiver> {
        let ttl = self.client.config().cache.caregivers_ttl;
        let path = format!("caregivers/{id}");
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::get().cached(format!("caregivers/{id}"), ttl),
                )
            })
            .await?;
        normalize::entity(&value)
    }
}
