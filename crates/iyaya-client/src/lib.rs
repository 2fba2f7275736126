//! Async client for the Iyaya childcare-marketplace API.
//!
//! [`IyayaClient`] bundles the request dispatcher with one façade per
//! backend resource. Every call funnels through [`http::ApiClient`], which
//! owns the connectivity check, the response cache, bearer-token handling
//! with single-flight refresh, and error classification. Retry policy and
//! envelope normalization live in the façades.
//!
//! ```no_run
//! use iyaya_client::IyayaClient;
//! use iyaya_config::ClientConfig;
//!
//! # async fn run() -> iyaya_core::Result<()> {
//! let config = ClientConfig::new().with_base_url("https://api.iyaya.example/api");
//! let client = IyayaClient::new(config)?;
//! let session = client.auth().login("parent@example.com", "secret").await?;
//! println!("signed in as {}", session.user.email);
//! let bookings = client.bookings().my_bookings().await?;
//! println!("{} bookings", bookings.total);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod http;
pub mod normalize;
pub mod retry;
pub mod services;
pub mod token;

use std::sync::Arc;

use iyaya_config::ClientConfig;
use iyaya_core::Result;

use http::{ApiClient, Connectivity, SharedClient};
use services::{
    ApplicationsService, AuthService, BookingsService, CaregiversService, ChildrenService,
    JobsService, MessagingService, NotificationsService, RatingsService, SettingsService,
};
use token::TokenManager;

pub use http::{AssumeOnline, ManualConnectivity, RequestOptions};
pub use retry::RetryPolicy;
pub use services::Subscription;

/// Entry point: one client, one façade per resource.
///
/// Cloning is cheap; all clones share the same dispatcher, cache, and
/// token state.
#[derive(Clone)]
pub struct IyayaClient {
    client: SharedClient,
}

impl IyayaClient {
    /// Builds a client with in-memory token storage.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            client: Arc::new(ApiClient::new(config)?),
        })
    }

    /// Builds a client with explicit token storage and connectivity probe.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid.
    pub fn with_parts(
        config: ClientConfig,
        tokens: TokenManager,
        connectivity: Box<dyn Connectivity>,
    ) -> Result<Self> {
        Ok(Self {
            client: Arc::new(ApiClient::with_parts(config, tokens, connectivity)?),
        })
    }

    /// The underlying dispatcher, for callers that need raw requests.
    pub fn api(&self) -> &SharedClient {
        &self.client
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone())
    }

    pub fn jobs(&self) -> JobsService {
        JobsService::new(self.client.clone())
    }

    pub fn bookings(&self) -> BookingsService {
        BookingsService::new(self.client.clone())
    }

    pub fn caregivers(&self) -> CaregiversService {
        CaregiversService::new(self.client.clone())
    }

    pub fn applications(&self) -> ApplicationsService {
        ApplicationsService::new(self.client.clone())
    }

    pub fn messaging(&self) -> MessagingService {
        MessagingService::new(self.client.clone())
    }

    pub fn ratings(&self) -> RatingsService {
        RatingsService::new(self.client.clone())
    }

    pub fn notifications(&self) -> NotificationsService {
        NotificationsService::new(self.client.clone())
    }

    pub fn children(&self) -> ChildrenService {
        ChildrenService::new(self.client.clone())
    }

    pub fn settings(&self) -> SettingsService {
        SettingsService::new(self.client.clone())
    }

    /// Backend reachability check, unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns a classified error when the backend is unreachable or
    /// unhealthy.
    pub async fn health(&self) -> Result<serde_json::Value> {
        self.client.health().await
    }
}
