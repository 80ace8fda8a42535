use crate::api::{ApiClient, ApiError, ApiErrorStatus};
use crate::config::AppConfig;
use crate::guard::{evaluate_route, RouteAccess, RouteDecision};
use crate::restore::{missing_token_snapshot, RestoreBus, RestoreRequest};
use crate::session::{KeyringStorage, SessionFileStorage, TokenStore, TokenStorage};
use crate::types::{Account, AppResult, SessionSnapshot};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Owned wiring for one running app: config, the session token store, the
/// API client, the latest restoration snapshot, and the restore-loop bus.
/// Cloning shares the same session.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub tokens: TokenStore,
    pub api: Arc<ApiClient>,
    latest_session: Arc<Mutex<Option<SessionSnapshot>>>,
    pub restore: RestoreBus,
}

impl AppContext {
    /// Standard wiring: keychain persistence when "remember me" is on,
    /// otherwise the session file. Returns the receiver the restore loop
    /// consumes.
    pub fn new(config: AppConfig) -> Result<(Self, mpsc::UnboundedReceiver<RestoreRequest>), ApiError> {
        let storage: Arc<dyn TokenStorage> = if config.remember_session() {
            Arc::new(KeyringStorage::default())
        } else {
            Arc::new(SessionFileStorage::new(config.session_file_path()))
        };
        let tokens = TokenStore::hydrate(storage);
        let api = Arc::new(ApiClient::new(config.api_base_url())?);
        Ok(Self::with_parts(config, tokens, api))
    }

    /// Custom wiring for tests and embedders that bring their own storage.
    pub fn with_parts(
        config: AppConfig,
        tokens: TokenStore,
        api: Arc<ApiClient>,
    ) -> (Self, mpsc::UnboundedReceiver<RestoreRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                config,
                tokens,
                api,
                latest_session: Arc::new(Mutex::new(None)),
                restore: RestoreBus::new(tx),
            },
            rx,
        )
    }

    pub async fn latest_session(&self) -> Option<SessionSnapshot> {
        self.latest_session.lock().await.clone()
    }

    pub async fn update_session(&self, snapshot: Option<SessionSnapshot>) {
        let mut guard = self.latest_session.lock().await;
        *guard = snapshot;
    }

    pub fn restore_interval_seconds(&self) -> u64 {
        self.config.restore_interval_seconds()
    }

    /// Login flow: exchange credentials for a token, store it, and wake the
    /// restore loop so the snapshot catches up.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Option<Account>> {
        match self.api.login(email, password).await {
            Ok(session) => {
                self.tokens.set(&session.token).await;
                self.restore.trigger();
                AppResult::ok(session.account)
            }
            Err(ApiErrorStatus::Unauthorized) => {
                AppResult::err("unauthorized", "Invalid email or password.")
            }
            Err(ApiErrorStatus::RateLimited) => {
                AppResult::err("rate_limited", "Too many attempts, try again later.")
            }
            Err(ApiErrorStatus::Error) => AppResult::err("network", "Login request failed."),
        }
    }

    /// Logout flow: best-effort server revocation, then local teardown.
    pub async fn logout(&self) {
        if let Some(token) = self.tokens.get().await {
            self.api.logout(&token).await;
        }
        self.tokens.logout().await;
        self.update_session(Some(missing_token_snapshot())).await;
    }

    /// Route-guard entry point for the router.
    pub async fn route_decision(&self, access: RouteAccess) -> RouteDecision {
        let has_token = self.tokens.has_token().await;
        let latest = self.latest_session.lock().await;
        evaluate_route(access, has_token, latest.as_ref())
    }
}
