// storefront/src/state.rs
use crate::config::AppConfig;
use crate::sessions::SessionRegistry;
use std::sync::Arc;
use vitrine::{ImageHost, Storefront};

#[derive(Clone)]
pub struct AppState {
  pub storefront: Arc<Storefront>,
  pub sessions: Arc<SessionRegistry>,
  pub config: Arc<AppConfig>, // Share loaded config
  /// `None` when the image bridge is not configured.
  pub image_host: Option<Arc<dyn ImageHost>>,
}

impl AppState {
  pub fn new(storefront: Storefront, config: AppConfig, image_host: Option<Arc<dyn ImageHost>>) -> Self {
    Self {
      storefront: Arc::new(storefront),
      sessions: Arc::new(SessionRegistry::new()),
      config: Arc::new(config),
      image_host,
    }
  }
}
