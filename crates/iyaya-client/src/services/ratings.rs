//! Ratings façade.

use iyaya_core::{Rating, RatingSummary, Result};
use serde_json::json;

use crate::http::{RequestOptions, SharedClient};
use crate::normalize;
use crate::retry::RetryPolicy;
use crate::services::read_policy;

#[derive(Clone)]
pub struct RatingsService {
    client: SharedClient,
}

impl RatingsService {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Submits a review for a completed booking. Zero retries: one booking
    /// gets one review.
    ///
    /// # Errors
    ///
    /// Surfaces the first failure directly.
    pub async fn submit(
        &self,
        booking_id: &str,
        score: f64,
        comment: Option<&str>,
    ) -> Result<Rating> {
        let body = json!({
            "bookingId": booking_id,
            "score": score,
            "comment": comment,
        });
        let value = RetryPolicy::none()
            .run(|| {
                self.client.request(
                    "ratings",
                    RequestOptions::post(body.clone())
                        .with_idempotency_key(uuid::Uuid::new_v4().to_string())
                        .invalidating("ratings"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Lists reviews for a caregiver.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn for_caregiver(&self, caregiver_id: &str) -> Result<Vec<Rating>> {
        let ttl = self.client.config().cache.default_ttl;
        let key = format!("ratings/caregiver/{caregiver_id}");
        let value = read_policy(&self.client)
            .run(|| {
                self.client
                    .request(&key, RequestOptions::get().cached(key.clone(), ttl))
            })
            .await?;
        normalize::ratings(&value)
    }

    /// Aggregate rating figures for a caregiver.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn summary(&self, caregiver_id: &str) -> Result<RatingSummary> {
        let path = format!("ratings/caregiver/{caregiver_id}/summary");
        let value = read_policy(&self.client)
            .run(|| self.client.request(&path, RequestOptions::get()))
            .await?;
        normalize::entity(&value)
    }
}
