mod storage;
mod token_store;

pub use storage::{
    KeyringStorage, MemoryStorage, SessionFileStorage, StorageError, TokenStorage,
    KEYRING_USER_SESSION_TOKEN,
};
pub use token_store::TokenStore;
