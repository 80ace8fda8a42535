use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

const KEYRING_SERVICE: &str = "com.casaview.app";
pub const KEYRING_USER_SESSION_TOKEN: &str = "casaview_session_token";

const SESSION_FILE_KEY: &str = "sessionToken";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("invalid session file")]
    Json(#[from] serde_json::Error),
}

/// Persisted tier of the session token store. One fixed slot; absence is a
/// missing entry, never an empty string.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn store(&self, token: &str) -> Result<(), StorageError>;
    fn remove(&self) -> Result<(), StorageError>;
    fn is_available(&self) -> bool;
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// OS keychain / secret service backend, used when the user opted into
/// "remember me".
pub struct KeyringStorage {
    user: &'static str,
}

impl KeyringStorage {
    pub fn new(user: &'static str) -> Self {
        Self { user }
    }

    fn entry(&self) -> Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(KEYRING_SERVICE, self.user)
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new(KEYRING_USER_SESSION_TOKEN)
    }
}

impl TokenStorage for KeyringStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let entry = self.entry().map_err(|_| StorageError::Unavailable)?;
        match entry.get_password() {
            Ok(pwd) => Ok(non_empty(pwd)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(keyring::Error::NoStorageAccess(_)) => Err(StorageError::Unavailable),
            Err(keyring::Error::PlatformFailure(_)) => Err(StorageError::Unavailable),
            Err(_) => Ok(None),
        }
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        let entry = self.entry().map_err(|_| StorageError::Unavailable)?;
        entry
            .set_password(token)
            .map_err(|_| StorageError::Unavailable)
    }

    fn remove(&self) -> Result<(), StorageError> {
        let entry = self.entry().map_err(|_| StorageError::Unavailable)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(_) => Err(StorageError::Unavailable),
        }
    }

    fn is_available(&self) -> bool {
        let Ok(entry) = self.entry() else {
            return false;
        };

        match entry.get_password() {
            Ok(_) => true,
            Err(keyring::Error::NoEntry) => true,
            Err(keyring::Error::BadEncoding(_)) => true,
            Err(keyring::Error::Ambiguous(_)) => true,
            Err(keyring::Error::NoStorageAccess(_)) => false,
            Err(keyring::Error::PlatformFailure(_)) => false,
            Err(_) => false,
        }
    }
}

/// Session-scoped JSON file backend. One process counts as one session; the
/// file survives restarts of the UI within it and is removed on logout.
pub struct SessionFileStorage {
    path: PathBuf,
}

impl SessionFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStorage for SessionFileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let json: serde_json::Value = serde_json::from_str(&text)?;
        Ok(json
            .get(SESSION_FILE_KEY)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .and_then(non_empty))
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::json!({ SESSION_FILE_KEY: token });
        std::fs::write(&self.path, serde_json::to_string(&json)?)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn is_available(&self) -> bool {
        match self.path.parent() {
            Some(parent) => parent.as_os_str().is_empty() || parent.exists(),
            None => true,
        }
    }
}

/// No-persistence backend: used in tests and when "remember me" is off, so
/// the token lives only as long as the process.
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .slot
            .lock()
            .map_err(|_| StorageError::Unavailable)?
            .clone()
            .and_then(non_empty))
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        *self.slot.lock().map_err(|_| StorageError::Unavailable)? = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.slot.lock().map_err(|_| StorageError::Unavailable)? = None;
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }
}
