use crate::types::{SessionSnapshot, SessionStatus};

/// Access level a route declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Authenticated,
    Admin,
}

/// What the router should do with a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// Token present but the restoration check has not settled yet; render
    /// a loading state instead of bouncing the user to login.
    Loading,
    Login,
}

pub fn evaluate_route(
    access: RouteAccess,
    has_token: bool,
    latest: Option<&SessionSnapshot>,
) -> RouteDecision {
    if access == RouteAccess::Public {
        return RouteDecision::Allow;
    }

    if !has_token {
        return RouteDecision::Login;
    }

    let Some(snapshot) = latest else {
        return RouteDecision::Loading;
    };

    match snapshot.status() {
        SessionStatus::Ok => match access {
            RouteAccess::Admin => {
                let is_admin = snapshot.account().is_some_and(|a| a.is_admin);
                if is_admin {
                    RouteDecision::Allow
                } else {
                    RouteDecision::Login
                }
            }
            _ => RouteDecision::Allow,
        },
        SessionStatus::Unauthorized | SessionStatus::MissingToken => RouteDecision::Login,
        // Transient backend trouble keeps the last known session alive.
        SessionStatus::RateLimited | SessionStatus::Error => RouteDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Account;

    fn ok_snapshot(is_admin: bool) -> SessionSnapshot {
        SessionSnapshot::Ok {
            account: Account {
                id: "acc_1".to_string(),
                email: "ana@example.com".to_string(),
                display_name: None,
                is_admin,
            },
            last_updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn unauthorized_snapshot() -> SessionSnapshot {
        SessionSnapshot::Unauthorized {
            last_updated_at: "2026-01-01T00:00:00Z".to_string(),
            error_message: None,
        }
    }

    fn error_snapshot() -> SessionSnapshot {
        SessionSnapshot::Error {
            last_updated_at: "2026-01-01T00:00:00Z".to_string(),
            error_message: None,
        }
    }

    #[test]
    fn public_routes_always_render() {
        assert_eq!(
            evaluate_route(RouteAccess::Public, false, None),
            RouteDecision::Allow
        );
    }

    #[test]
    fn protected_route_without_token_redirects_to_login() {
        assert_eq!(
            evaluate_route(RouteAccess::Authenticated, false, None),
            RouteDecision::Login
        );
    }

    #[test]
    fn pending_restoration_shows_loading_not_login() {
        assert_eq!(
            evaluate_route(RouteAccess::Authenticated, true, None),
            RouteDecision::Loading
        );
    }

    #[test]
    fn validated_session_renders_protected_route() {
        let snapshot = ok_snapshot(false);
        assert_eq!(
            evaluate_route(RouteAccess::Authenticated, true, Some(&snapshot)),
            RouteDecision::Allow
        );
    }

    #[test]
    fn rejected_token_redirects_to_login() {
        let snapshot = unauthorized_snapshot();
        assert_eq!(
            evaluate_route(RouteAccess::Authenticated, true, Some(&snapshot)),
            RouteDecision::Login
        );
    }

    #[test]
    fn transient_errors_keep_the_session() {
        let snapshot = error_snapshot();
        assert_eq!(
            evaluate_route(RouteAccess::Authenticated, true, Some(&snapshot)),
            RouteDecision::Allow
        );
    }

    #[test]
    fn admin_routes_require_admin_account() {
        let member = ok_snapshot(false);
        assert_eq!(
            evaluate_route(RouteAccess::Admin, true, Some(&member)),
            RouteDecision::Login
        );

        let admin = ok_snapshot(true);
        assert_eq!(
            evaluate_route(RouteAccess::Admin, true, Some(&admin)),
            RouteDecision::Allow
        );
    }
}
