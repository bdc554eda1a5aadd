// tests/pg_backend_tests.rs
//
// Runs against a real database: `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.

use chrono::Utc;
use std::sync::Arc;
use vitrine::reservation::reserve;
use vitrine::{Backend, CartLine, Contact, Product, ReservationConfig, VitrineError};
use vitrine_storefront::db::{self, PgBackend};

async fn backend() -> PgBackend {
  let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set for ignored tests");
  let pool = db::connect(&url).await.expect("connect");
  db::ensure_schema(&pool).await.expect("schema");
  PgBackend::new(pool)
}

fn product(id: &str, stock: Option<u32>) -> Product {
  let now = Utc::now();
  Product {
    id: id.to_string(),
    name: format!("Test {}", id),
    brand: "Burmes & Co".to_string(),
    description: String::new(),
    price_cents: Some(1_000),
    image: None,
    images: Vec::new(),
    category: Some("test".to_string()),
    stock,
    is_featured: false,
    rating: 0.0,
    num_reviews: 0,
    drive_file_id: None,
    drive_file_ids: vec!["f1".to_string()],
    created_at: now,
    updated_at: now,
  }
}

#[tokio::test]
#[ignore]
async fn product_rows_round_trip_untracked_stock() {
  let backend = backend().await;
  let id = backend.new_document_id();
  backend.insert_product(&product(&id, None)).await.expect("insert");
  let stored = backend.get_product(&id).await.expect("get").expect("present");
  assert_eq!(stored.stock, None);
  assert_eq!(stored.drive_file_ids, vec!["f1".to_string()]);
  backend.delete_product(&id).await.expect("delete");
  assert!(matches!(
    backend.delete_product(&id).await,
    Err(VitrineError::NotFound { .. })
  ));
}

#[tokio::test]
#[ignore]
async fn concurrent_reservations_never_oversell() {
  let backend = Arc::new(backend().await);
  let id = backend.new_document_id();
  backend.insert_product(&product(&id, Some(3))).await.expect("insert");

  let config = ReservationConfig::default();
  let mut handles = Vec::new();
  for i in 0..10 {
    let backend = backend.clone();
    let config = config.clone();
    let id = id.clone();
    handles.push(tokio::spawn(async move {
      let uid = format!("pg-test-user-{}", i);
      reserve(backend.as_ref(), &config, &uid, Contact::default(), &[CartLine::new(id, 1)]).await
    }));
  }

  let mut successes = 0;
  for handle in handles {
    match handle.await.expect("task") {
      Ok(_) => successes += 1,
      Err(VitrineError::InsufficientStock { available, .. }) => assert_eq!(available, 0),
      Err(other) => panic!("unexpected error: {}", other),
    }
  }
  assert_eq!(successes, 3);
  let stored = backend.get_product(&id).await.expect("get").expect("present");
  assert_eq!(stored.stock, Some(0));

  for i in 0..10 {
    backend.delete_requests(&format!("pg-test-user-{}", i)).await.expect("cleanup");
  }
  backend.delete_product(&id).await.expect("cleanup");
}
