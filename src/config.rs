//! Runtime configuration, read from the environment (and `.env` via dotenvy)

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// ---------------------------------------------------------------------------
/// Defaults
/// ---------------------------------------------------------------------------

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_DB_PATH: &str = "fitness-tracker.db";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {name}: {reason}")]
  Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Base URL of the workout backend
  pub api_url: Url,
  /// Bearer token issued by the backend's login. Sync is skipped without one.
  pub api_token: Option<String>,
  pub db_path: PathBuf,
  pub log_level: String,
  pub http_timeout: Duration,
}

fn var_or(name: &str, default: &str) -> String {
  env::var(name)
    .ok()
    .filter(|v| !v.trim().is_empty())
    .unwrap_or_else(|| default.to_string())
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let api_url_raw = var_or("FITNESS_API_URL", DEFAULT_API_URL);
    let api_url = Url::parse(&api_url_raw).map_err(|e| ConfigError::Invalid {
      name: "FITNESS_API_URL",
      reason: format!("{} ({})", e, api_url_raw),
    })?;

    let api_token = env::var("FITNESS_API_TOKEN")
      .ok()
      .map(|t| t.trim().to_string())
      .filter(|t| !t.is_empty());

    let timeout_raw = var_or("FITNESS_HTTP_TIMEOUT_SECS", &DEFAULT_HTTP_TIMEOUT_SECS.to_string());
    let timeout_secs: u64 = match timeout_raw.parse() {
      Ok(secs) if secs > 0 => secs,
      _ => {
        return Err(ConfigError::Invalid {
          name: "FITNESS_HTTP_TIMEOUT_SECS",
          reason: format!("expected a positive integer, got '{}'", timeout_raw),
        })
      }
    };

    Ok(Self {
      api_url,
      api_token,
      db_path: PathBuf::from(var_or("FITNESS_DB_PATH", DEFAULT_DB_PATH)),
      log_level: var_or("FITNESS_LOG_LEVEL", DEFAULT_LOG_LEVEL),
      http_timeout: Duration::from_secs(timeout_secs),
    })
  }
}
