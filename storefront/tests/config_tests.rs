// tests/config_tests.rs

use serial_test::serial;
use std::env;
use std::time::Duration;
use vitrine_storefront::config::{AppConfig, LogFormat};

const VARS: &[&str] = &[
  "SERVER_HOST",
  "SERVER_PORT",
  "DATABASE_URL",
  "DEFAULT_BRAND",
  "TX_MAX_ATTEMPTS",
  "TX_BACKOFF_MS",
  "ALLOW_ADMIN_SIGNUP",
  "DRIVE_SCRIPT_URL",
  "DRIVE_BUCKET_KEY",
  "DRIVE_FOLDER_ID",
  "SEED_DB",
  "LOG_FORMAT",
];

fn clear_env() {
  for var in VARS {
    env::remove_var(var);
  }
}

#[test]
#[serial]
fn defaults_apply_when_nothing_is_set() {
  clear_env();
  let config = AppConfig::from_env().expect("config");
  assert_eq!(config.server_host, "127.0.0.1");
  assert_eq!(config.server_port, 8080);
  assert!(config.database_url.is_none());
  assert_eq!(config.default_brand, "Burmes & Co");
  assert_eq!(config.tx_max_attempts, 5);
  assert_eq!(config.tx_backoff, Duration::from_millis(10));
  assert!(!config.allow_admin_signup);
  assert!(config.drive.is_none());
  assert!(!config.seed_db);
  assert_eq!(config.log_format, LogFormat::Pretty);
}

#[test]
#[serial]
fn values_are_read_from_the_environment() {
  clear_env();
  env::set_var("SERVER_PORT", "9090");
  env::set_var("DATABASE_URL", "postgres://localhost/vitrine");
  env::set_var("DEFAULT_BRAND", "Casa Burmes");
  env::set_var("TX_MAX_ATTEMPTS", "8");
  env::set_var("TX_BACKOFF_MS", "25");
  env::set_var("ALLOW_ADMIN_SIGNUP", "true");
  env::set_var("DRIVE_SCRIPT_URL", "https://script.example.com/exec");
  env::set_var("DRIVE_BUCKET_KEY", "secret");
  env::set_var("DRIVE_FOLDER_ID", "folder-1");
  env::set_var("LOG_FORMAT", "JSON");

  let config = AppConfig::from_env().expect("config");
  assert_eq!(config.server_port, 9090);
  assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/vitrine"));
  assert!(config.allow_admin_signup);
  assert_eq!(config.log_format, LogFormat::Json);
  let drive = config.drive.clone().expect("drive config");
  assert_eq!(drive.folder_id, "folder-1");
  assert!(!format!("{:?}", drive).contains("secret"));

  let core = config.storefront_config();
  assert_eq!(core.default_brand, "Casa Burmes");
  assert_eq!(core.reservation.max_attempts, 8);
  assert_eq!(core.reservation.initial_backoff, Duration::from_millis(25));
  clear_env();
}

#[test]
#[serial]
fn incomplete_drive_settings_disable_the_bridge() {
  clear_env();
  env::set_var("DRIVE_SCRIPT_URL", "https://script.example.com/exec");
  env::set_var("DRIVE_BUCKET_KEY", "secret");
  let config = AppConfig::from_env().expect("config");
  assert!(config.drive.is_none());
  clear_env();
}

#[test]
#[serial]
fn invalid_values_are_configuration_errors() {
  clear_env();
  env::set_var("SERVER_PORT", "not-a-port");
  assert!(AppConfig::from_env().is_err());

  clear_env();
  env::set_var("TX_MAX_ATTEMPTS", "0");
  assert!(AppConfig::from_env().is_err());

  clear_env();
  env::set_var("LOG_FORMAT", "xml");
  assert!(AppConfig::from_env().is_err());
  clear_env();
}
