use crate::redact::redact_token;
use crate::types::{Account, ListingSummary, SessionSnapshot};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorStatus {
  Unauthorized,
  RateLimited,
  Error,
}

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("network error")]
  Network(#[from] reqwest::Error),
  #[error("invalid json")]
  Json(#[from] serde_json::Error),
}

/// Token and account payload issued by a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
  pub token: String,
  pub account: Option<Account>,
}

/// Search/filter parameters for the listings index.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
  pub search: Option<String>,
  pub city: Option<String>,
  pub max_price: Option<u64>,
}

impl ListingQuery {
  fn query_string(&self) -> Option<String> {
    let mut pairs = Vec::new();
    if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
      pairs.push(format!("q={}", urlencoding::encode(search)));
    }
    if let Some(city) = self.city.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
      pairs.push(format!("city={}", urlencoding::encode(city)));
    }
    if let Some(max_price) = self.max_price {
      pairs.push(format!("maxPrice={max_price}"));
    }
    if pairs.is_empty() {
      None
    } else {
      Some(pairs.join("&"))
    }
  }
}

fn now_iso() -> String {
  OffsetDateTime::now_utc()
    .format(&time::format_description::well_known::Rfc3339)
    .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn build_headers(token: Option<&str>) -> HeaderMap {
  let mut headers = HeaderMap::new();
  headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
  if let Some(token) = token {
    if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {token}")) {
      headers.insert(AUTHORIZATION, bearer);
    }
  }
  headers
}

fn map_http_status(status_code: u16) -> ApiErrorStatus {
  match status_code {
    401 | 403 => ApiErrorStatus::Unauthorized,
    429 => ApiErrorStatus::RateLimited,
    _ => ApiErrorStatus::Error,
  }
}

fn read_string(value: Option<&Value>) -> Option<String> {
  let s = value?.as_str()?.trim();
  if s.is_empty() {
    None
  } else {
    Some(s.to_string())
  }
}

fn parse_account(value: &Value) -> Option<Account> {
  let obj = value.as_object()?;
  let id = read_string(obj.get("id"))?;
  let email = read_string(obj.get("email"))?;
  Some(Account {
    id,
    email,
    display_name: read_string(obj.get("displayName")),
    is_admin: obj.get("isAdmin").and_then(|v| v.as_bool()).unwrap_or(false),
  })
}

fn parse_listing(value: &Value) -> Option<ListingSummary> {
  let obj = value.as_object()?;
  let id = read_string(obj.get("id"))?;
  let title = read_string(obj.get("title"))?;
  Some(ListingSummary {
    id,
    title,
    city: read_string(obj.get("city")),
    price: obj.get("price").and_then(|v| v.as_f64()),
    listed_at: read_string(obj.get("listedAt")),
  })
}

fn parse_listings(json: &Value) -> Vec<ListingSummary> {
  let items = json
    .get("listings")
    .and_then(|v| v.as_array())
    .or_else(|| json.as_array());
  let Some(items) = items else {
    return vec![];
  };
  items.iter().filter_map(parse_listing).collect()
}

pub struct ApiClient {
  http: reqwest::Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
    Ok(Self {
      http: reqwest::Client::builder().build()?,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// POST /auth/login. On success the backend issues the session token the
  /// caller hands to the token store.
  pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, ApiErrorStatus> {
    let url = format!("{}/auth/login", self.base_url);
    let body = serde_json::json!({ "email": email, "password": password });

    let res = self
      .http
      .post(url)
      .headers(build_headers(None))
      .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
      .json(&body)
      .send()
      .await;

    let res = match res {
      Ok(r) => r,
      Err(e) => {
        tracing::warn!(error = %redact_token(&e.to_string()), "login request failed");
        return Err(ApiErrorStatus::Error);
      }
    };

    if !res.status().is_success() {
      return Err(map_http_status(res.status().as_u16()));
    }

    let json: Value = match res.json().await {
      Ok(v) => v,
      Err(_) => return Err(ApiErrorStatus::Error),
    };
    let Some(token) = read_string(json.get("token")) else {
      return Err(ApiErrorStatus::Error);
    };

    Ok(LoginSession {
      token,
      account: json.get("account").and_then(|v| parse_account(v)),
    })
  }

  /// GET /auth/me — the session-restoration check. Never fails; every
  /// outcome is a snapshot the router can act on.
  pub async fn fetch_session_snapshot(&self, token: &str) -> SessionSnapshot {
    let last_updated_at = now_iso();
    let url = format!("{}/auth/me", self.base_url);

    let res = self
      .http
      .get(url)
      .headers(build_headers(Some(token)))
      .send()
      .await;

    let res = match res {
      Ok(r) => r,
      Err(e) => {
        let msg = redact_token(&e.to_string()).to_string();
        return SessionSnapshot::Error {
          last_updated_at,
          error_message: Some(msg),
        };
      }
    };

    if !res.status().is_success() {
      let status = map_http_status(res.status().as_u16());
      let msg = format!("Casaview API error ({})", res.status().as_u16());
      return match status {
        ApiErrorStatus::Unauthorized => SessionSnapshot::Unauthorized {
          last_updated_at,
          error_message: Some(msg),
        },
        ApiErrorStatus::RateLimited => SessionSnapshot::RateLimited {
          last_updated_at,
          error_message: Some(msg),
        },
        ApiErrorStatus::Error => SessionSnapshot::Error {
          last_updated_at,
          error_message: Some(msg),
        },
      };
    }

    let json: Value = match res.json().await {
      Ok(v) => v,
      Err(e) => {
        return SessionSnapshot::Error {
          last_updated_at,
          error_message: Some(redact_token(&e.to_string()).to_string()),
        };
      }
    };

    match parse_account(json.get("account").unwrap_or(&json)) {
      Some(account) => SessionSnapshot::Ok {
        account,
        last_updated_at,
      },
      None => SessionSnapshot::Error {
        last_updated_at,
        error_message: Some("Malformed account payload.".to_string()),
      },
    }
  }

  /// GET /listings. An absent token sends the request unauthenticated; the
  /// backend then serves the public subset.
  pub async fn fetch_listings(
    &self,
    token: Option<&str>,
    query: Option<&ListingQuery>,
  ) -> Result<Vec<ListingSummary>, ApiErrorStatus> {
    let mut url = format!("{}/listings", self.base_url);
    if let Some(qs) = query.and_then(|q| q.query_string()) {
      url = format!("{url}?{qs}");
    }
    let res = self
      .http
      .get(url)
      .headers(build_headers(token))
      .send()
      .await;

    let res = match res {
      Ok(r) => r,
      Err(_) => return Err(ApiErrorStatus::Error),
    };

    if !res.status().is_success() {
      return Err(map_http_status(res.status().as_u16()));
    }

    let json: Value = match res.json().await {
      Ok(v) => v,
      Err(_) => return Err(ApiErrorStatus::Error),
    };
    Ok(parse_listings(&json))
  }

  pub async fn fetch_listing(
    &self,
    token: Option<&str>,
    listing_id: &str,
  ) -> Result<Option<ListingSummary>, ApiErrorStatus> {
    let url = format!(
      "{}/listings/{}",
      self.base_url,
      urlencoding::encode(listing_id)
    );
    let res = self
      .http
      .get(url)
      .headers(build_headers(token))
      .send()
      .await;

    let res = match res {
      Ok(r) => r,
      Err(_) => return Err(ApiErrorStatus::Error),
    };

    if res.status().as_u16() == 404 {
      return Ok(None);
    }
    if !res.status().is_success() {
      return Err(map_http_status(res.status().as_u16()));
    }

    let json: Value = match res.json().await {
      Ok(v) => v,
      Err(_) => return Err(ApiErrorStatus::Error),
    };
    Ok(parse_listing(json.get("listing").unwrap_or(&json)))
  }

  /// POST /auth/logout. Best effort: the local session is torn down whether
  /// or not the server acknowledges.
  pub async fn logout(&self, token: &str) {
    let url = format!("{}/auth/logout", self.base_url);
    let res = self
      .http
      .post(url)
      .headers(build_headers(Some(token)))
      .send()
      .await;
    if let Err(e) = res {
      tracing::debug!(error = %redact_token(&e.to_string()), "server logout not acknowledged");
    }
  }
}
