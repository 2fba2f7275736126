//! Booking façade.

use iyaya_core::{Booking, BookingPage, Result};
use serde::Serialize;
use serde_json::json;

use crate::http::{RequestOptions, SharedClient};
use crate::normalize;
use crate::retry::RetryPolicy;
use crate::services::read_policy;

/// Fields for a new booking request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub job_id: Option<String>,
    pub caregiver_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Clone)]
pub struct BookingsService {
    client: SharedClient,
}

impl BookingsService {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Lists the signed-in user's bookings.
    ///
    /// This is a non-critical read backing the home screen: on failure it
    /// resolves to an empty page instead of propagating, so the screen can
    /// render and offer a refresh. Writes never get this treatment.
    pub async fn my_bookings(&self) -> Result<BookingPage> {
        let ttl = self.client.config().cache.default_ttl;
        let outcome = read_policy(&self.client)
            .run(|| {
                self.client
                    .request("bookings/my", RequestOptions::get().cached("bookings/my", ttl))
            })
            .await;
        match outcome {
            Ok(value) => normalize::bookings(&value),
            Err(err) => {
                tracing::warn!(error = %err, "booking list failed, serving empty page");
                Ok(BookingPage::empty())
            }
        }
    }

    /// Fetches one booking by id. Failures propagate here: detail screens
    /// need the real error.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn get(&self, id: &str) -> Result<Booking> {
        let path = format!("bookings/{id}");
        let value = read_policy(&self.client)
            .run(|| self.client.request(&path, RequestOptions::get()))
            .await?;
        normalize::entity(&value)
    }

    /// Creates a booking. Zero retries so a transient failure cannot
    /// double-book; the idempotency key covers manual re-submission.
    ///
    /// # Errors
    ///
    /// Surfaces the first failure directly.
    pub async fn create(&self, booking: &NewBooking) -> Result<Booking> {
        let body = serde_json::to_value(booking)?;
        let value = RetryPolicy::none()
            .run(|| {
                self.client.request(
                    "bookings",
                    RequestOptions::post(body.clone())
                        .with_idempotency_key(uuid::Uuid::new_v4().to_string())
                        .invalidating("bookings"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Updates a booking's status (confirm, decline, complete).
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Booking> {
        let path = format!("bookings/{id}/status");
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::patch(json!({"status": status})).invalidating("bookings"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Cancels a booking.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn cancel(&self, id: &str) -> Result<Booking> {
        self.update_status(id, "cancelled").await
    }
}
