//! Job-application façade.

use iyaya_core::{Application, Result};
use serde_json::json;

use crate::http::{RequestOptions, SharedClient};
use crate::normalize;
use crate::retry::RetryPolicy;
use crate::services::read_policy;

#[derive(Clone)]
pub struct ApplicationsService {
    client: SharedClient,
}

impl ApplicationsService {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Applies to a job. Zero retries: a duplicate application is a
    /// validation error on the backend, and retrying would trip it.
    ///
    /// # Errors
    ///
    /// Surfaces the first failure directly.
    pub async fn apply(&self, job_id: &str, message: Option<&str>) -> Result<Application> {
        let body = json!({ "jobId": job_id, "message": message });
        let value = RetryPolicy::none()
            .run(|| {
                self.client.request(
                    "applications",
                    RequestOptions::post(body.clone())
                        .with_idempotency_key(uuid::Uuid::new_v4().to_string())
                        .invalidating("applications"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Lists the signed-in caregiver's applications.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn my_applications(&self) -> Result<Vec<Application>> {
        let ttl = self.client.config().cache.default_ttl;
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    "applications/my",
                    RequestOptions::get().cached("applications/my", ttl),
                )
            })
            .await?;
        normalize::applications(&value)
    }

    /// Lists applications received for one of the parent's jobs.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn for_job(&self, job_id: &str) -> Result<Vec<Application>> {
        let path = format!("applications/job/{job_id}");
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(&path, RequestOptions::get())
            })
            .await?;
        normalize::applications(&value)
    }

    /// Accepts or rejects an application.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Application> {
        let path = format!("applications/{id}/status");
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::patch(json!({"status": status}))
                        .invalidating("applications"),
                )
            })
            .await?;
        normalize::entity(&value)
    }
}
