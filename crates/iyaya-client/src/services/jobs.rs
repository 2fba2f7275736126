//! Job-posting façade.

use iyaya_core::{Job, JobPage, Result};
use serde::Serialize;
use serde_json::json;

use crate::cache::cache_key;
use crate::http::{RequestOptions, SharedClient};
use crate::normalize;
use crate::retry::RetryPolicy;
use crate::services::read_policy;

/// Fields for a new job posting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub hourly_rate: Option<f64>,
}

#[derive(Clone)]
pub struct JobsService {
    client: SharedClient,
}

impl JobsService {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Lists open jobs matching the given filters. Cached per filter set.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn list(&self, filters: &[(String, String)]) -> Result<JobPage> {
        let key = cache_key("jobs", filters);
        let ttl = self.client.config().cache.jobs_ttl;
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    "jobs",
                    RequestOptions::get()
                        .with_query(filters.to_vec())
                        .cached(key.clone(), ttl),
                )
            })
            .await?;
        normalize::jobs(&value)
    }

    /// Lists the signed-in parent's own postings.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn my_jobs(&self) -> Result<JobPage> {
        let ttl = self.client.config().cache.jobs_ttl;
        let value = read_policy(&self.client)
            .run(|| {
                self.client
                    .request("jobs/my", RequestOptions::get().cached("jobs/my", ttl))
            })
            .await?;
        normalize::jobs(&value)
    }

    /// Fetches one job by id.
    ///
    /// # Errors
    ///
    /// An unknown id surfaces as a validation error.
    pub async fn get(&self, id: &str) -> Result<Job> {
        let path = format!("jobs/{id}");
        let value = read_policy(&self.client)
            .run(|| self.client.request(&path, RequestOptions::get()))
            .await?;
        normalize::entity(&value)
    }

    /// Creates a job posting. Zero retries; an idempotency key lets the
    /// backend de-duplicate a manual re-submission.
    ///
    /// # Errors
    ///
    /// Surfaces the first failure directly.
    pub async fn create(&self, job: &NewJob) -> Result<Job> {
        let body = serde_json::to_value(job)?;
        let value = RetryPolicy::none()
            .run(|| {
                self.client.request(
                    "jobs",
                    RequestOptions::post(body.clone())
                        .with_idempotency_key(uuid::Uuid::new_v4().to_string())
                        .invalidating("jobs"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Updates a posting. Idempotent, so the default retry applies.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn update(&self, id: &str, updates: serde_json::Value) -> Result<Job> {
        let path = format!("jobs/{id}");
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::put(updates.clone()).invalidating("jobs"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Closes a posting.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn close(&self, id: &str) -> Result<()> {
        let path = format!("jobs/{id}/status");
        read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::patch(json!({"status": "closed"})).invalidating("jobs"),
                )
            })
            .await?;
        Ok(())
    }

    /// Deletes a posting.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("jobs/{id}");
        read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::delete().invalidating("jobs"),
                )
            })
            .await?;
        Ok(())
    }
}
