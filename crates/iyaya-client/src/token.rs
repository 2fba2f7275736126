//! Bearer-token persistence and refresh coordination.
//!
//! [`TokenManager`] composes a durable [`TokenStorage`] with an opaque
//! [`IdentityProvider`]. At most one authoritative token is persisted at a
//! time, and concurrent refresh attempts are serialized through a single
//! async lock so a burst of 401 responses triggers exactly one provider
//! call (see [`TokenManager::refresh`]).

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use iyaya_core::{Result, ServiceError};
use serde::{Deserialize, Serialize};

/// Durable key-value storage for the bearer credential.
///
/// Implementations must be cheap: the manager reads on every authenticated
/// request.
pub trait TokenStorage: Send + Sync {
    /// Returns the persisted token, if any.
    fn load(&self) -> Result<Option<String>>;

    /// Persists `token`, replacing any previous value.
    fn store(&self, token: &str) -> Result<()>;

    /// Removes all persisted auth state.
    fn clear(&self) -> Result<()>;
}

/// In-memory storage for tests and short-lived embedders.
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        let guard = self
            .token
            .read()
            .map_err(|_| ServiceError::unknown("token storage lock poisoned"))?;
        Ok(guard.clone())
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ServiceError::unknown("token storage lock poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ServiceError::unknown("token storage lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// On-disk persisted auth state.
#[derive(Debug, Serialize, Deserialize)]
struct StoredAuth {
    token: String,
}

/// File-backed storage under `~/.iyaya/credentials.<profile>.json`.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Storage for the given profile in the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the home directory cannot be determined or the
    /// `.iyaya` directory cannot be created.
    pub fn for_profile(profile: &str) -> Result<Self> {
        let dir = dirs::home_dir()
            .ok_or_else(|| ServiceError::unknown("cannot determine home directory"))?
            .join(".iyaya");
        fs::create_dir_all(&dir)
            .map_err(|e| ServiceError::unknown(format!("cannot create {dir:?}: {e}")))?;
        Ok(Self {
            path: dir.join(format!("credentials.{profile}.json")),
        })
    }

    /// Storage at an explicit path, mainly for tests.
    #[must_use]
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| ServiceError::unknown(format!("cannot read credentials: {e}")))?;
        let stored: StoredAuth = serde_json::from_str(&content)?;
        Ok(Some(stored.token))
    }

    fn store(&self, token: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(&StoredAuth {
            token: token.to_string(),
        })?;
        fs::write(&self.path, content)
            .map_err(|e| ServiceError::unknown(format!("cannot write credentials: {e}")))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| ServiceError::unknown(format!("cannot remove credentials: {e}")))?;
        }
        Ok(())
    }
}

/// Opaque source of fresh bearer tokens.
///
/// `Ok(None)` means no user session exists. Provider failures surface as
/// auth errors; the manager never retries internally — retry belongs to the
/// request dispatcher.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_token(&self, force_refresh: bool) -> Result<Option<String>>;
}

/// Provider that always yields the same token. Useful when the token is
/// obtained out of band (CLI login) and refresh is not available.
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenProvider {
    async fn fetch_token(&self, _force_refresh: bool) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

/// Coordinates token reads, refreshes, and clearing.
pub struct TokenManager {
    storage: Box<dyn TokenStorage>,
    provider: Box<dyn IdentityProvider>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl TokenManager {
    pub fn new(storage: Box<dyn TokenStorage>, provider: Box<dyn IdentityProvider>) -> Self {
        Self {
            storage,
            provider,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Manager with in-memory storage and no refresh capability.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(MemoryTokenStorage::new()),
            Box::new(StaticTokenProvider::new(None)),
        )
    }

    /// Returns the persisted token when it is structurally valid.
    pub fn current(&self) -> Option<String> {
        match self.storage.load() {
            Ok(Some(token)) if is_well_formed(&token) => Some(token),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load persisted token");
                None
            }
        }
    }

    /// Returns a usable token, refreshing when forced or when nothing valid
    /// is persisted. `Ok(None)` means no session exists.
    ///
    /// # Errors
    ///
    /// Propagates identity-provider failures as auth errors.
    pub async fn get_valid_token(&self, force_refresh: bool) -> Result<Option<String>> {
        if !force_refresh
            && let Some(token) = self.current()
        {
            return Ok(Some(token));
        }
        let observed = self.current();
        self.refresh(observed.as_deref()).await
    }

    /// Refreshes the token against the identity provider, single-flight.
    ///
    /// `observed` is the token the caller saw fail. When another caller has
    /// already replaced it by the time the lock is acquired, the stored
    /// token is returned without a second provider call, so N concurrent
    /// 401s converge on exactly one refresh.
    ///
    /// # Errors
    ///
    /// Provider failures clear the store and surface as auth errors.
    pub async fn refresh(&self, observed: Option<&str>) -> Result<Option<String>> {
        let _guard = self.refresh_lock.lock().await;

        let stored = self.current();
        if stored.as_deref() != observed {
            tracing::debug!("token already refreshed by a concurrent caller");
            return Ok(stored);
        }

        tracing::debug!("refreshing bearer token");
        match self.provider.fetch_token(true).await {
            Ok(Some(token)) if is_well_formed(&token) => {
                self.storage.store(&token)?;
                Ok(Some(token))
            }
            Ok(_) => {
                self.storage.clear()?;
                Ok(None)
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed, clearing session");
                self.storage.clear()?;
                Err(ServiceError::auth(format!("token refresh failed: {err}")))
            }
        }
    }

    /// Persists a token obtained by a login or registration call.
    ///
    /// # Errors
    ///
    /// Returns an error when the token is malformed or storage fails.
    pub fn store(&self, token: &str) -> Result<()> {
        if !is_well_formed(token) {
            return Err(ServiceError::auth("refusing to store malformed token"));
        }
        self.storage.store(token)
    }

    /// Removes all persisted auth state. Subsequent reads return `None`
    /// until a new login occurs.
    ///
    /// # Errors
    ///
    /// Returns an error when storage cannot be cleared.
    pub fn clear(&self) -> Result<()> {
        self.storage.clear()
    }
}

/// Structural validity: non-empty and free of whitespace. Semantic expiry
/// is the identity provider's concern.
fn is_well_formed(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingProvider {
        calls: Arc<AtomicU32>,
        result: Option<String>,
    }

    #[async_trait]
    impl IdentityProvider for CountingProvider {
        async fn fetch_token(&self, _force: bool) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl IdentityProvider for FailingProvider {
        async fn fetch_token(&self, _force: bool) -> Result<Option<String>> {
            Err(ServiceError::auth("provider unavailable"))
        }
    }

    #[test]
    fn well_formed_rejects_empty_and_whitespace() {
        assert!(is_well_formed("abc.def.ghi"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("two words"));
        assert!(!is_well_formed("trailing\n"));
    }

    #[tokio::test]
    async fn returns_persisted_token_without_provider_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let manager = TokenManager::new(
            Box::new(MemoryTokenStorage::with_token("t0")),
            Box::new(CountingProvider {
                calls: calls.clone(),
                result: Some("t1".into()),
            }),
        );
        assert_eq!(manager.get_valid_token(false).await.unwrap().unwrap(), "t0");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn force_refresh_replaces_token() {
        let calls = Arc::new(AtomicU32::new(0));
        let manager = TokenManager::new(
            Box::new(MemoryTokenStorage::with_token("t0")),
            Box::new(CountingProvider {
                calls: calls.clone(),
                result: Some("t1".into()),
            }),
        );
        assert_eq!(manager.get_valid_token(true).await.unwrap().unwrap(), "t1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.current().unwrap(), "t1");
    }

    #[tokio::test]
    async fn concurrent_refreshes_call_provider_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let manager = Arc::new(TokenManager::new(
            Box::new(MemoryTokenStorage::with_token("stale")),
            Box::new(CountingProvider {
                calls: calls.clone(),
                result: Some("fresh".into()),
            }),
        ));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                manager.refresh(Some("stale")).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().unwrap(), "fresh");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_failure_clears_store_and_surfaces_auth() {
        let manager = TokenManager::new(
            Box::new(MemoryTokenStorage::with_token("t0")),
            Box::new(FailingProvider),
        );
        let err = manager.refresh(Some("t0")).await.unwrap_err();
        assert!(err.is_auth());
        assert!(manager.current().is_none());
    }

    #[tokio::test]
    async fn no_session_yields_none() {
        let manager = TokenManager::in_memory();
        assert!(manager.get_valid_token(false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_forgets_token() {
        let manager = TokenManager::new(
            Box::new(MemoryTokenStorage::with_token("t0")),
            Box::new(StaticTokenProvider::new(None)),
        );
        manager.clear().unwrap();
        assert!(manager.current().is_none());
    }

    #[test]
    fn poisoned_memory_storage_surfaces_an_error() {
        use iyaya_core::ErrorKind;

        let storage = Arc::new(MemoryTokenStorage::with_token("t0"));
        let poisoner = storage.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.token.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert_eq!(storage.load().unwrap_err().kind(), ErrorKind::Unknown);
        assert_eq!(storage.store("t1").unwrap_err().kind(), ErrorKind::Unknown);
        assert_eq!(storage.clear().unwrap_err().kind(), ErrorKind::Unknown);
    }

    #[test]
    fn file_storage_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::at_path(dir.path().join("credentials.test.json"));
        assert!(storage.load().unwrap().is_none());
        storage.store("abc").unwrap();
        assert_eq!(storage.load().unwrap().unwrap(), "abc");
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
