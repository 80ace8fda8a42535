use crate::context::AppContext;
use crate::types::{AppResult, SessionSnapshot, SessionStatus};

fn now_iso() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub(crate) fn missing_token_snapshot() -> SessionSnapshot {
    SessionSnapshot::MissingToken {
        last_updated_at: now_iso(),
        error_message: Some("No session token is stored.".to_string()),
    }
}

/// Applies the outcome of a session check: a rejected token is cleared from
/// the store before publishing, so the guard and the request layer see a
/// consistent signed-out state.
pub(crate) async fn apply_session_check(ctx: &AppContext, snapshot: SessionSnapshot) -> AppResult<()> {
    match snapshot.status() {
        SessionStatus::Unauthorized => {
            tracing::info!("stored session token rejected, clearing it");
            ctx.tokens.clear().await;
        }
        SessionStatus::Ok => {
            tracing::debug!("session restored");
        }
        _ => {}
    }

    let failed = snapshot.status() == SessionStatus::Error;
    ctx.update_session(Some(snapshot)).await;

    if failed {
        AppResult::err("network", "Session check failed.")
    } else {
        AppResult::ok(())
    }
}

/// One restoration pass: validate the stored token against the backend and
/// publish the outcome.
pub(crate) async fn restore_once(ctx: &AppContext) -> AppResult<()> {
    let Some(token) = ctx.tokens.get().await else {
        ctx.update_session(Some(missing_token_snapshot())).await;
        return AppResult::ok(());
    };

    let snapshot = ctx.api.fetch_session_snapshot(&token).await;
    apply_session_check(ctx, snapshot).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::AppConfig;
    use crate::session::{MemoryStorage, TokenStore};
    use crate::types::Account;
    use std::sync::Arc;

    fn test_context() -> AppContext {
        let tokens = TokenStore::hydrate(Arc::new(MemoryStorage::new()));
        let api = Arc::new(ApiClient::new("http://127.0.0.1:9").unwrap());
        let (ctx, _rx) = AppContext::with_parts(AppConfig::default_values(), tokens, api);
        ctx
    }

    fn ok_snapshot() -> SessionSnapshot {
        SessionSnapshot::Ok {
            account: Account {
                id: "acc_1".to_string(),
                email: "ana@example.com".to_string(),
                display_name: None,
                is_admin: false,
            },
            last_updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn rejected_token_is_cleared_before_publishing() {
        let ctx = test_context();
        ctx.tokens.set("cv-sess-stale").await;

        let result = apply_session_check(
            &ctx,
            SessionSnapshot::Unauthorized {
                last_updated_at: "2026-01-01T00:00:00Z".to_string(),
                error_message: None,
            },
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(ctx.tokens.get().await, None);
        assert_eq!(
            ctx.latest_session().await.unwrap().status(),
            SessionStatus::Unauthorized
        );
    }

    #[tokio::test]
    async fn validated_session_keeps_the_token() {
        let ctx = test_context();
        ctx.tokens.set("cv-sess-live").await;

        let result = apply_session_check(&ctx, ok_snapshot()).await;

        assert!(result.is_ok());
        assert_eq!(ctx.tokens.get().await.as_deref(), Some("cv-sess-live"));
        assert_eq!(
            ctx.latest_session().await.unwrap().status(),
            SessionStatus::Ok
        );
    }

    #[tokio::test]
    async fn backend_trouble_reports_failure_but_keeps_the_token() {
        let ctx = test_context();
        ctx.tokens.set("cv-sess-live").await;

        let result = apply_session_check(
            &ctx,
            SessionSnapshot::Error {
                last_updated_at: "2026-01-01T00:00:00Z".to_string(),
                error_message: Some("connection refused".to_string()),
            },
        )
        .await;

        assert!(!result.is_ok());
        assert_eq!(ctx.tokens.get().await.as_deref(), Some("cv-sess-live"));
    }

    #[tokio::test]
    async fn restore_without_token_publishes_signed_out() {
        let ctx = test_context();

        let result = restore_once(&ctx).await;

        assert!(result.is_ok());
        assert_eq!(
            ctx.latest_session().await.unwrap().status(),
            SessionStatus::MissingToken
        );
    }
}
