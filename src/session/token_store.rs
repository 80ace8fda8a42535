use super::storage::TokenStorage;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct MemorySlot {
    token: Option<String>,
    // An explicit clear ran. Blocks the persisted fallback so a failed
    // backend removal cannot resurrect the cleared token.
    cleared: bool,
}

/// Two-tier session token store: an in-memory fast path mirrored to a
/// persisted backend. Writes go memory-first, then through to the backend;
/// reads prefer memory and fall back to the backend without re-seeding it.
/// Once an explicit mutation has run, memory is authoritative: in
/// particular, after `clear()` the store reads absent even if the backend
/// removal failed.
///
/// Backend failures never surface to callers. The store degrades to
/// memory-only operation and keeps the login session alive for the life of
/// the process.
#[derive(Clone)]
pub struct TokenStore {
    in_memory: Arc<Mutex<MemorySlot>>,
    storage: Arc<dyn TokenStorage>,
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl TokenStore {
    /// Builds the store and seeds the memory tier from the backend once.
    pub fn hydrate(storage: Arc<dyn TokenStorage>) -> Self {
        let initial = match storage.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "token storage unreadable, starting signed out");
                None
            }
        };
        Self {
            in_memory: Arc::new(Mutex::new(MemorySlot {
                token: initial,
                cleared: false,
            })),
            storage,
        }
    }

    pub async fn get(&self) -> Option<String> {
        {
            let slot = self.in_memory.lock().await;
            if let Some(token) = slot.token.clone() {
                return Some(token);
            }
            if slot.cleared {
                return None;
            }
        }
        // Fallback read only; memory is not written back here.
        match self.storage.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "token storage unreadable on fallback read");
                None
            }
        }
    }

    pub async fn has_token(&self) -> bool {
        self.get().await.is_some()
    }

    /// Stores a new token in both tiers. Blank input is treated as a
    /// `clear` so neither tier can ever hold an empty string.
    pub async fn set(&self, token: &str) {
        let Some(token) = normalize(token) else {
            self.clear().await;
            return;
        };

        {
            let mut slot = self.in_memory.lock().await;
            slot.token = Some(token.clone());
            slot.cleared = false;
        }

        if let Err(e) = self.storage.store(&token) {
            tracing::warn!(error = %e, "token not persisted, session is memory-only");
        }
    }

    /// Idempotent: clears memory and removes the persisted entry. Memory
    /// stays absent even when the removal fails.
    pub async fn clear(&self) {
        {
            let mut slot = self.in_memory.lock().await;
            slot.token = None;
            slot.cleared = true;
        }

        if let Err(e) = self.storage.remove() {
            tracing::warn!(error = %e, "persisted token could not be removed");
        }
    }

    /// Session termination; same mechanism as `clear`, named for call sites.
    pub async fn logout(&self) {
        self.clear().await;
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::{MemoryStorage, StorageError, TokenStorage};

    struct FailingStorage;

    impl TokenStorage for FailingStorage {
        fn load(&self) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }

        fn store(&self, _token: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }

        fn remove(&self) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    /// Reads and writes work but entries can never be removed, as with a
    /// keyring that rejects deletes.
    struct StuckStorage {
        inner: MemoryStorage,
    }

    impl StuckStorage {
        fn new() -> Self {
            Self {
                inner: MemoryStorage::new(),
            }
        }
    }

    impl TokenStorage for StuckStorage {
        fn load(&self) -> Result<Option<String>, StorageError> {
            self.inner.load()
        }

        fn store(&self, token: &str) -> Result<(), StorageError> {
            self.inner.store(token)
        }

        fn remove(&self) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn set_then_get_returns_token_and_survives_rehydration() {
        let storage = Arc::new(MemoryStorage::new());
        let store = TokenStore::hydrate(storage.clone());

        store.set("cv-sess-abc123").await;
        assert_eq!(store.get().await.as_deref(), Some("cv-sess-abc123"));

        // Fresh hydration from the same backend, as after a reload.
        let rehydrated = TokenStore::hydrate(storage);
        assert_eq!(rehydrated.get().await.as_deref(), Some("cv-sess-abc123"));
    }

    #[tokio::test]
    async fn clear_removes_both_tiers_and_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let store = TokenStore::hydrate(storage.clone());

        store.set("tok-1").await;
        store.clear().await;
        assert_eq!(store.get().await, None);

        store.clear().await;
        assert_eq!(store.get().await, None);

        let rehydrated = TokenStore::hydrate(storage);
        assert_eq!(rehydrated.get().await, None);
    }

    #[tokio::test]
    async fn cleared_token_stays_absent_when_backend_removal_fails() {
        let store = TokenStore::hydrate(Arc::new(StuckStorage::new()));

        store.set("cv-sess-secret").await;
        assert_eq!(store.get().await.as_deref(), Some("cv-sess-secret"));

        store.clear().await;
        assert_eq!(store.get().await, None);
        assert!(!store.has_token().await);
    }

    #[tokio::test]
    async fn set_after_failed_removal_reopens_the_fallback() {
        let store = TokenStore::hydrate(Arc::new(StuckStorage::new()));

        store.set("tok-1").await;
        store.clear().await;
        assert_eq!(store.get().await, None);

        store.set("tok-2").await;
        assert_eq!(store.get().await.as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn overwrite_returns_latest_token() {
        let store = TokenStore::hydrate(Arc::new(MemoryStorage::new()));
        store.set("tok-1").await;
        store.set("tok-2").await;
        assert_eq!(store.get().await.as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn hydrates_from_preexisting_persisted_value() {
        let storage = Arc::new(MemoryStorage::new());
        storage.store("abc123").unwrap();

        let store = TokenStore::hydrate(storage);
        assert_eq!(store.get().await.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn full_session_lifecycle() {
        let store = TokenStore::hydrate(Arc::new(MemoryStorage::new()));
        assert_eq!(store.get().await, None);

        store.set("tok-1").await;
        assert_eq!(store.get().await.as_deref(), Some("tok-1"));

        store.logout().await;
        assert_eq!(store.get().await, None);
    }

    #[tokio::test]
    async fn blank_token_is_treated_as_clear() {
        let storage = Arc::new(MemoryStorage::new());
        let store = TokenStore::hydrate(storage.clone());

        store.set("tok-1").await;
        store.set("   ").await;
        assert_eq!(store.get().await, None);
        assert_eq!(storage.load().unwrap(), None);
    }

    #[tokio::test]
    async fn set_trims_surrounding_whitespace() {
        let store = TokenStore::hydrate(Arc::new(MemoryStorage::new()));
        store.set("  tok-1  ").await;
        assert_eq!(store.get().await.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn fallback_read_does_not_seed_memory() {
        let storage = Arc::new(MemoryStorage::new());
        let store = TokenStore::hydrate(storage.clone());

        // Token appears in the backend after hydration.
        storage.store("late-token").unwrap();
        assert_eq!(store.get().await.as_deref(), Some("late-token"));

        // If the fallback had cached into memory, this removal would be
        // invisible to the next read.
        storage.remove().unwrap();
        assert_eq!(store.get().await, None);
    }

    #[tokio::test]
    async fn degrades_to_memory_only_when_storage_fails() {
        let store = TokenStore::hydrate(Arc::new(FailingStorage));
        assert!(!store.is_persistent());

        store.set("tok-1").await;
        assert_eq!(store.get().await.as_deref(), Some("tok-1"));

        store.clear().await;
        assert_eq!(store.get().await, None);
    }
}
