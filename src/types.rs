use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Ok,
    Unauthorized,
    RateLimited,
    Error,
    MissingToken,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
}

/// Result of the most recent session-restoration check against `/auth/me`.
/// The router reads this (together with token presence) to decide between
/// rendering, a loading state, and a redirect to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionSnapshot {
    Ok {
        #[serde(rename = "account")]
        account: Account,
        #[serde(rename = "lastUpdatedAt")]
        last_updated_at: String,
    },
    Unauthorized {
        #[serde(rename = "lastUpdatedAt")]
        last_updated_at: String,
        #[serde(rename = "errorMessage")]
        error_message: Option<String>,
    },
    RateLimited {
        #[serde(rename = "lastUpdatedAt")]
        last_updated_at: String,
        #[serde(rename = "errorMessage")]
        error_message: Option<String>,
    },
    Error {
        #[serde(rename = "lastUpdatedAt")]
        last_updated_at: String,
        #[serde(rename = "errorMessage")]
        error_message: Option<String>,
    },
    MissingToken {
        #[serde(rename = "lastUpdatedAt")]
        last_updated_at: String,
        #[serde(rename = "errorMessage")]
        error_message: Option<String>,
    },
}

impl SessionSnapshot {
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::Ok { .. } => SessionStatus::Ok,
            Self::Unauthorized { .. } => SessionStatus::Unauthorized,
            Self::RateLimited { .. } => SessionStatus::RateLimited,
            Self::Error { .. } => SessionStatus::Error,
            Self::MissingToken { .. } => SessionStatus::MissingToken,
        }
    }

    pub fn last_updated_at(&self) -> &str {
        match self {
            Self::Ok {
                last_updated_at, ..
            } => last_updated_at,
            Self::Unauthorized {
                last_updated_at, ..
            } => last_updated_at,
            Self::RateLimited {
                last_updated_at, ..
            } => last_updated_at,
            Self::Error {
                last_updated_at, ..
            } => last_updated_at,
            Self::MissingToken {
                last_updated_at, ..
            } => last_updated_at,
        }
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Ok { account, .. } => Some(account),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: String,
    pub title: String,
    pub city: Option<String>,
    pub price: Option<f64>,
    pub listed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppResult<T> {
    Ok { ok: bool, value: T },
    Err { ok: bool, error: AppError },
}

impl<T> AppResult<T> {
    pub fn ok(value: T) -> Self {
        Self::Ok { ok: true, value }
    }

    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Err {
            ok: false,
            error: AppError {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}
