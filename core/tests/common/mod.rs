// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use vitrine::{
    Backend, MemoryAuthProvider, MemoryBackend, Product, ProfileUpdate, ReservationConfig, Session, Storefront,
    StorefrontConfig,
};

pub const PASSWORD: &str = "s3cret-pass";

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer() // Important for tests to capture output
        .try_init()
        .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
    Lazy::force(&TRACING_INIT);
}

/// Retries without sleeping so conflict tests stay fast.
pub fn fast_reservation() -> ReservationConfig {
    ReservationConfig {
        max_attempts: 5,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
    }
}

pub struct Harness {
    pub backend: MemoryBackend,
    pub auth: Arc<MemoryAuthProvider>,
    pub storefront: Storefront,
}

pub fn harness() -> Harness {
    harness_with(fast_reservation())
}

pub fn harness_with(reservation: ReservationConfig) -> Harness {
    setup_tracing();
    let backend = MemoryBackend::new();
    let auth = Arc::new(MemoryAuthProvider::new());
    let config = StorefrontConfig {
        reservation,
        ..StorefrontConfig::default()
    };
    let storefront = Storefront::new(Arc::new(backend.clone()), auth.clone(), config);
    Harness {
        backend,
        auth,
        storefront,
    }
}

pub fn product(id: &str, name: &str, stock: Option<u32>) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        name: name.to_string(),
        brand: "Burmes & Co".to_string(),
        description: format!("{} in sterling silver", name),
        price_cents: Some(4_500),
        image: None,
        images: vec![format!("https://drive.google.com/file/d/img-{}/view", id)],
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

pub async fn seed(backend: &MemoryBackend, products: &[Product]) {
    for p in products {
        backend.insert_product(p).await.expect("seed product");
    }
}

pub async fn stock_of(backend: &MemoryBackend, id: &str) -> Option<u32> {
    backend
        .get_product(id)
        .await
        .expect("read product")
        .and_then(|p| p.stock)
}

/// Signs up a client and completes the profile.
pub async fn client(storefront: &Storefront, email: &str) -> Session {
    let session = storefront
        .sign_up_client(email, PASSWORD, Some("Ana"))
        .await
        .expect("client sign-up");
    storefront
        .update_profile(
            &session,
            ProfileUpdate {
                full_name: Some("Ana Burmes".to_string()),
                address: Some("Calle Mayor 1".to_string()),
                phone: Some("+34 600 000 000".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("profile update");
    session
}

pub async fn admin(storefront: &Storefront) -> Session {
    storefront
        .sign_up_admin("admin@burmes.co", PASSWORD, Some("Admin"))
        .await
        .expect("admin sign-up")
}
