// examples/submit_request.rs

//! Walks through a client checkout against the in-memory backend.
//! Run with `RUST_LOG=debug` to see the reservation spans.

use std::sync::Arc;
use vitrine::{
    MemoryAuthProvider, MemoryBackend, ProductDraft, ProfileUpdate, Storefront, StorefrontConfig, VitrineError,
};

#[tokio::main]
async fn main() -> Result<(), VitrineError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let storefront = Storefront::new(
        Arc::new(MemoryBackend::new()),
        Arc::new(MemoryAuthProvider::new()),
        StorefrontConfig::default(),
    );

    let admin = storefront.sign_up_admin("admin@burmes.co", "admin-pass", Some("Admin")).await?;
    let ring = storefront
        .create_product(
            &admin,
            ProductDraft {
                name: "Silver Ring".to_string(),
                price_cents: Some(4_500),
                stock: Some(3),
                ..Default::default()
            },
        )
        .await?;

    let ana = storefront.sign_up_client("ana@example.com", "client-pass", Some("Ana")).await?;
    storefront
        .update_profile(
            &ana,
            ProfileUpdate {
                full_name: Some("Ana Burmes".to_string()),
                phone: Some("+34 600 000 000".to_string()),
                ..Default::default()
            },
        )
        .await?;

    storefront.add_to_cart(&ana, &ring.id, 2).await?;
    let request_number = storefront.submit_cart(&ana).await?;
    println!("Request {} submitted.", request_number);

    let remaining = storefront.product(&ring.id).await?.stock;
    println!("Silver Ring stock is now {:?}.", remaining);

    // Asking for more than what is left fails without touching stock.
    storefront.add_to_cart(&ana, &ring.id, 1).await?;
    storefront.set_cart_quantity(&ana, 0, 5).await?;
    match storefront.submit_request(&ana, &[vitrine::CartLine::new(ring.id.clone(), 5)]).await {
        Err(e @ VitrineError::InsufficientStock { .. }) => println!("Refused: {}", e),
        other => println!("Unexpected: {:?}", other),
    }
    Ok(())
}
