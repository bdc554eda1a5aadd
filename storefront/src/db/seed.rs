// storefront/src/db/seed.rs

use chrono::Utc;
use tracing::{info, instrument};
use vitrine::{Backend, Product, ProductDraft, VitrineResult};

fn draft(name: &str, category: &str, price_cents: i64, stock: u32, featured: bool) -> ProductDraft {
  ProductDraft {
    name: name.to_string(),
    description: Some(format!("{} from the house collection.", name)),
    price_cents: Some(price_cents),
    category: Some(category.to_string()),
    stock: Some(stock),
    is_featured: featured,
    ..Default::default()
  }
}

fn sample_catalog() -> Vec<ProductDraft> {
  vec![
    draft("Silver Band Ring", "rings", 4_500, 12, true),
    draft("Emerald Solitaire", "rings", 38_000, 2, true),
    draft("Pearl Drop Earrings", "earrings", 9_900, 6, false),
    draft("Gold Hoops", "earrings", 15_500, 4, false),
    draft("Rope Chain Necklace", "necklaces", 22_000, 3, true),
    draft("Charm Bracelet", "bracelets", 7_800, 0, false),
  ]
}

/// Inserts a small sample catalog when the catalog is empty. Returns how
/// many products were written.
#[instrument(name = "seed::seed_catalog", skip(backend), err(Display))]
pub async fn seed_catalog(backend: &dyn Backend, default_brand: &str) -> VitrineResult<usize> {
  if !backend.list_products(None).await?.is_empty() {
    info!("Catalog already populated; skipping seed.");
    return Ok(0);
  }
  let now = Utc::now();
  let drafts = sample_catalog();
  let count = drafts.len();
  for draft in drafts {
    let product = Product::from_draft(backend.new_document_id(), draft, default_brand, now);
    backend.insert_product(&product).await?;
  }
  info!(products = count, "Seeded sample catalog.");
  Ok(count)
}

#[cfg(test)]
mod tests {
  use super::*;
  use vitrine::MemoryBackend;

  #[tokio::test]
  async fn seeds_only_an_empty_catalog() {
    let backend = MemoryBackend::new();
    assert_eq!(seed_catalog(&backend, "Burmes & Co").await.expect("seed"), 6);
    assert_eq!(seed_catalog(&backend, "Burmes & Co").await.expect("reseed"), 0);

    let rings = backend.list_products(Some("rings")).await.expect("list");
    assert_eq!(rings.len(), 2);
    assert!(rings.iter().all(|p| p.brand == "Burmes & Co"));
  }
}
