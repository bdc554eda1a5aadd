// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use vitrine::config::DEFAULT_BRAND;
use vitrine::{ReservationConfig, StorefrontConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

/// Credentials for the image script bridge. All three values are required.
#[derive(Clone)]
pub struct DriveConfig {
  pub script_url: String,
  pub bucket_key: String,
  pub folder_id: String,
}

impl std::fmt::Debug for DriveConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DriveConfig")
      .field("script_url", &self.script_url)
      .field("bucket_key", &"[REDACTED]")
      .field("folder_id", &self.folder_id)
      .finish()
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs the server on the in-memory backend.
  pub database_url: Option<String>,

  pub default_brand: String,
  pub tx_max_attempts: u32,
  pub tx_backoff: Duration,

  /// Exposes `POST /auth/admin/signup`. Off unless explicitly enabled.
  pub allow_admin_signup: bool,

  /// `None` disables image upload and delete routes.
  pub drive: Option<DriveConfig>,

  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      default_brand: DEFAULT_BRAND.to_string(),
      tx_max_attempts: 5,
      tx_backoff: Duration::from_millis(10),
      allow_admin_signup: false,
      drive: None,
      seed_db: false,
      log_format: LogFormat::Pretty,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    // Unset and blank variables both fall back to defaults.
    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());
    let env_or = |var_name: &str, default: &str| get_env(var_name).unwrap_or_else(|| default.to_string());

    let server_host = env_or("SERVER_HOST", "127.0.0.1");
    let server_port = env_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL");
    let default_brand = env_or("DEFAULT_BRAND", DEFAULT_BRAND);

    let tx_max_attempts = env_or("TX_MAX_ATTEMPTS", "5")
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid TX_MAX_ATTEMPTS: {}", e)))?;
    if tx_max_attempts == 0 {
      return Err(AppError::Config("TX_MAX_ATTEMPTS must be at least 1".to_string()));
    }
    let tx_backoff = env_or("TX_BACKOFF_MS", "10")
      .parse::<u64>()
      .map(Duration::from_millis)
      .map_err(|e| AppError::Config(format!("Invalid TX_BACKOFF_MS: {}", e)))?;

    let allow_admin_signup = env_or("ALLOW_ADMIN_SIGNUP", "false")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid ALLOW_ADMIN_SIGNUP value: {}", e)))?;

    let drive = match (
      get_env("DRIVE_SCRIPT_URL"),
      get_env("DRIVE_BUCKET_KEY"),
      get_env("DRIVE_FOLDER_ID"),
    ) {
      (Some(script_url), Some(bucket_key), Some(folder_id)) => Some(DriveConfig {
        script_url,
        bucket_key,
        folder_id,
      }),
      (None, None, None) => None,
      _ => {
        tracing::warn!("Image bridge disabled: DRIVE_SCRIPT_URL / DRIVE_BUCKET_KEY / DRIVE_FOLDER_ID are incomplete.");
        None
      }
    };

    let seed_db = env_or("SEED_DB", "false")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    let log_format = match env_or("LOG_FORMAT", "pretty").to_lowercase().as_str() {
      "json" => LogFormat::Json,
      "pretty" | "text" => LogFormat::Pretty,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT '{}'", other))),
    };

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      default_brand,
      tx_max_attempts,
      tx_backoff,
      allow_admin_signup,
      drive,
      seed_db,
      log_format,
    })
  }

  /// The core configuration derived from the server settings.
  pub fn storefront_config(&self) -> StorefrontConfig {
    let defaults = ReservationConfig::default();
    StorefrontConfig {
      default_brand: self.default_brand.clone(),
      reservation: ReservationConfig {
        max_attempts: self.tx_max_attempts,
        initial_backoff: self.tx_backoff,
        max_backoff: defaults.max_backoff.max(self.tx_backoff),
      },
    }
  }
}
