use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "casaview-config.json";

pub const KEY_API_BASE_URL: &str = "apiBaseUrl";
pub const KEY_REMEMBER_SESSION: &str = "rememberSession";
pub const KEY_RESTORE_INTERVAL_SECONDS: &str = "restoreIntervalSeconds";
pub const KEY_SESSION_FILE: &str = "sessionFile";

const DEFAULT_API_BASE_URL: &str = "https://api.casaview.app/v1";

fn defaults() -> HashMap<String, Value> {
  HashMap::from([
    (KEY_API_BASE_URL.to_string(), json!(DEFAULT_API_BASE_URL)),
    (KEY_REMEMBER_SESSION.to_string(), json!(false)),
    (KEY_RESTORE_INTERVAL_SECONDS.to_string(), json!(300)),
    (KEY_SESSION_FILE.to_string(), json!("")),
  ])
}

/// App configuration backed by a JSON file of fixed string keys. Unknown or
/// unreadable files fall back to defaults key by key.
#[derive(Clone)]
pub struct AppConfig {
  values: HashMap<String, Value>,
}

impl AppConfig {
  pub fn load(path: &std::path::Path) -> Self {
    let mut values = defaults();
    if let Ok(text) = std::fs::read_to_string(path) {
      match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => {
          for (k, v) in map {
            values.insert(k, v);
          }
        }
        Ok(_) | Err(_) => {
          tracing::warn!(path = %path.display(), "config file is not a JSON object, using defaults");
        }
      }
    }
    Self { values }
  }

  /// Loads `casaview-config.json` from the working directory.
  pub fn load_default() -> Self {
    Self::load(std::path::Path::new(CONFIG_FILE))
  }

  pub fn default_values() -> Self {
    Self { values: defaults() }
  }

  pub fn get_u64(&self, key: &str, fallback: u64) -> u64 {
    self
      .values
      .get(key)
      .and_then(|v| v.as_u64())
      .unwrap_or(fallback)
  }

  pub fn get_bool(&self, key: &str, fallback: bool) -> bool {
    self
      .values
      .get(key)
      .and_then(|v| v.as_bool())
      .unwrap_or(fallback)
  }

  pub fn get_string(&self, key: &str) -> Option<String> {
    let v = self.values.get(key)?;
    let s = v.as_str()?.trim();
    if s.is_empty() {
      None
    } else {
      Some(s.to_string())
    }
  }

  pub fn set(&mut self, key: &str, value: impl Into<Value>) {
    self.values.insert(key.to_string(), value.into());
  }

  pub fn api_base_url(&self) -> String {
    self
      .get_string(KEY_API_BASE_URL)
      .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
  }

  pub fn remember_session(&self) -> bool {
    self.get_bool(KEY_REMEMBER_SESSION, false)
  }

  pub fn restore_interval_seconds(&self) -> u64 {
    self.get_u64(KEY_RESTORE_INTERVAL_SECONDS, 300)
  }

  pub fn session_file_path(&self) -> PathBuf {
    match self.get_string(KEY_SESSION_FILE) {
      Some(path) => PathBuf::from(path),
      None => std::env::temp_dir().join("casaview-session.json"),
    }
  }
}
