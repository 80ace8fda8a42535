pub mod api;
pub mod config;
pub mod context;
pub mod guard;
pub mod redact;
pub mod restore;
pub mod session;
pub mod types;

pub use api::ApiClient;
pub use config::AppConfig;
pub use context::AppContext;
pub use guard::{RouteAccess, RouteDecision};
pub use restore::spawn_restore_loop;
pub use session::TokenStore;
