// storefront/src/lib.rs

//! HTTP front for the Vitrine storefront: actix-web routes over a
//! `vitrine::Storefront`, backed by PostgreSQL when `DATABASE_URL` is set
//! and by the in-memory backend otherwise.

pub mod config;
pub mod db;
pub mod errors;
pub mod services;
pub mod sessions;
pub mod state;
pub mod web;

use std::sync::Arc;
use tracing::{info, warn};
use vitrine::{AuthProvider, Backend, ImageHost, MemoryAuthProvider, MemoryBackend, Storefront};

use crate::config::{AppConfig, LogFormat};
use crate::errors::Result;
use crate::services::ScriptBridge;
use crate::state::AppState;

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// level.
pub fn init_tracing(format: LogFormat) {
  let filter =
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt().with_env_filter(filter);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder
      .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
      .init(),
  }
}

/// Wires backends, the image bridge and the session registry from `config`.
pub async fn build_state(config: AppConfig) -> Result<AppState> {
  let (backend, auth): (Arc<dyn Backend>, Arc<dyn AuthProvider>) = match &config.database_url {
    Some(url) => {
      let pool = db::connect(url).await?;
      db::ensure_schema(&pool).await?;
      (
        Arc::new(db::PgBackend::new(pool.clone())),
        Arc::new(db::PgAuthProvider::new(pool)),
      )
    }
    None => {
      warn!("DATABASE_URL not set; using the in-memory backend. Data is lost on restart.");
      (Arc::new(MemoryBackend::new()), Arc::new(MemoryAuthProvider::new()))
    }
  };

  if config.seed_db {
    db::seed::seed_catalog(backend.as_ref(), &config.default_brand).await?;
  }

  let image_host: Option<Arc<dyn ImageHost>> = match &config.drive {
    Some(drive) => Some(Arc::new(ScriptBridge::new(drive.clone()))),
    None => {
      info!("Image bridge not configured; image routes are disabled.");
      None
    }
  };

  let storefront = Storefront::new(backend, auth, config.storefront_config());
  Ok(AppState::new(storefront, config, image_host))
}
