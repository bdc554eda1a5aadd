// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use vitrine::{
  Backend, ImageHost, ImageUpload, MemoryAuthProvider, MemoryBackend, Product, ProfileUpdate, Storefront,
  UploadedImage, VitrineError, VitrineResult,
};
use vitrine_storefront::config::AppConfig;
use vitrine_storefront::state::AppState;

pub const PASSWORD: &str = "s3cret-pass";

use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Image host that records calls instead of talking to the script.
#[derive(Debug, Default)]
pub struct RecordingImageHost {
  pub uploads: Mutex<Vec<String>>,
  pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageHost for RecordingImageHost {
  async fn upload(&self, upload: ImageUpload) -> VitrineResult<UploadedImage> {
    upload.validate()?;
    let file_id = format!("file-{}", self.uploads.lock().len() + 1);
    self.uploads.lock().push(upload.resolved_file_name());
    Ok(UploadedImage::new(file_id, None))
  }

  async fn delete(&self, file_id: &str) -> VitrineResult<()> {
    if file_id == "broken" {
      return Err(VitrineError::ImageHost("Drive script failed (500)".to_string()));
    }
    self.deleted.lock().push(file_id.to_string());
    Ok(())
  }
}

pub struct TestServer {
  pub backend: MemoryBackend,
  pub images: Arc<RecordingImageHost>,
  pub state: AppState,
}

pub fn test_config() -> AppConfig {
  AppConfig {
    tx_backoff: Duration::ZERO,
    ..AppConfig::default()
  }
}

pub fn server() -> TestServer {
  server_with(test_config(), true)
}

pub fn server_with(config: AppConfig, with_images: bool) -> TestServer {
  setup_tracing();
  let backend = MemoryBackend::new();
  let images = Arc::new(RecordingImageHost::default());
  let storefront = Storefront::new(
    Arc::new(backend.clone()),
    Arc::new(MemoryAuthProvider::new()),
    config.storefront_config(),
  );
  let image_host: Option<Arc<dyn ImageHost>> = if with_images { Some(images.clone()) } else { None };
  TestServer {
    backend,
    images,
    state: AppState::new(storefront, config, image_host),
  }
}

pub fn product(id: &str, name: &str, stock: Option<u32>) -> Product {
  let now = Utc::now();
  Product {
    id: id.to_string(),
    name: name.to_string(),
    brand: "Burmes & Co".to_string(),
    description: String::new(),
    price_cents: Some(4_500),
    image: None,
    images: Vec::new(),
    category: Some("rings".to_string()),
    stock,
    is_featured: false,
    rating: 0.0,
    num_reviews: 0,
    drive_file_id: None,
    drive_file_ids: Vec::new(),
    created_at: now,
    updated_at: now,
  }
}

impl TestServer {
  pub async fn seed(&self, products: &[Product]) {
    for p in products {
      self.backend.insert_product(p).await.expect("seed product");
    }
  }

  pub async fn stock_of(&self, id: &str) -> Option<u32> {
    self
      .backend
      .get_product(id)
      .await
      .expect("read product")
      .and_then(|p| p.stock)
  }

  /// Signs up a client with a completed profile and returns a bearer token.
  pub async fn client_token(&self, email: &str) -> String {
    let storefront = &self.state.storefront;
    let session = storefront
      .sign_up_client(email, PASSWORD, Some("Ana"))
      .await
      .expect("client sign-up");
    storefront
      .update_profile(
        &session,
        ProfileUpdate {
          full_name: Some("Ana Burmes".to_string()),
          phone: Some("+34 600 000 000".to_string()),
          ..Default::default()
        },
      )
      .await
      .expect("profile update");
    self.state.sessions.issue(session)
  }

  pub async fn admin_token(&self) -> String {
    let session = self
      .state
      .storefront
      .sign_up_admin("admin@burmes.co", PASSWORD, Some("Admin"))
      .await
      .expect("admin sign-up");
    self.state.sessions.issue(session)
  }
}

pub fn bearer(token: &str) -> (&'static str, String) {
  ("Authorization", format!("Bearer {}", token))
}
