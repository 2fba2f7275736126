//! Resource façades.
//!
//! Each façade is a flat namespace of methods over one backend resource.
//! A method picks a cache key and TTL (or none), a retry policy (zero for
//! creates, the configured default for reads and updates), delegates to the
//! dispatcher, and normalizes the response envelope before returning.

pub mod applications;
pub mod auth;
pub mod bookings;
pub mod caregivers;
pub mod children;
pub mod jobs;
pub mod messaging;
pub mod notifications;
pub mod ratings;
pub mod settings;

use crate::http::ApiClient;
use crate::retry::RetryPolicy;

pub use applications::ApplicationsService;
pub use auth::AuthService;
pub use bookings::BookingsService;
pub use caregivers::CaregiversService;
pub use children::ChildrenService;
pub use jobs::JobsService;
pub use messaging::{MessagingService, Subscription};
pub use notifications::NotificationsService;
pub use ratings::RatingsService;
pub use settings::SettingsService;

/// The retry policy read operations share, derived from configuration.
pub(crate) fn read_policy(client: &ApiClient) -> RetryPolicy {
    RetryPolicy::from_config(&client.config().retry)
}
