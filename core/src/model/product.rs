// core/src/model/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{VitrineError, VitrineResult};

const UNNAMED_PRODUCT: &str = "this product";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub description: String,
    pub price_cents: Option<i64>,
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: Option<String>,
    /// Units available. `None` means the product does not track stock.
    pub stock: Option<u32>,
    pub is_featured: bool,
    pub rating: f64,
    pub num_reviews: u32,
    pub drive_file_id: Option<String>,
    #[serde(default)]
    pub drive_file_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Name used in customer-facing messages.
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            UNNAMED_PRODUCT
        } else {
            trimmed
        }
    }

    pub fn is_sold_out(&self) -> bool {
        self.stock == Some(0)
    }

    /// Builds a product from an admin draft. Missing brand falls back to
    /// `default_brand`, missing stock to zero.
    pub fn from_draft(
        id: impl Into<String>,
        draft: ProductDraft,
        default_brand: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let mut product = Self {
            id: id.into(),
            name: String::new(),
            brand: String::new(),
            description: String::new(),
            price_cents: None,
            image: None,
            images: Vec::new(),
            category: None,
            stock: Some(0),
            is_featured: false,
            rating: 0.0,
            num_reviews: 0,
            drive_file_id: None,
            drive_file_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        product.apply_draft(draft, default_brand, now);
        product
    }

    /// Replaces every editable field with the draft's values.
    pub fn apply_draft(&mut self, draft: ProductDraft, default_brand: &str, now: DateTime<Utc>) {
        self.name = draft.name;
        self.brand = draft.brand.filter(|b| !b.trim().is_empty()).unwrap_or_else(|| default_brand.to_string());
        self.description = draft.description.unwrap_or_default();
        self.price_cents = draft.price_cents;
        self.image = draft.image.filter(|i| !i.trim().is_empty());
        self.images = draft.images;
        self.category = draft.category.filter(|c| !c.trim().is_empty());
        self.stock = Some(draft.stock.unwrap_or(0));
        self.is_featured = draft.is_featured;
        self.rating = draft.rating.unwrap_or(0.0);
        self.num_reviews = draft.num_reviews.unwrap_or(0);
        self.drive_file_id = draft.drive_file_id.filter(|d| !d.trim().is_empty());
        self.drive_file_ids = draft.drive_file_ids;
        self.updated_at = now;
    }
}

/// Upper bound on a single price, one hundred million in major units.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Admin-submitted product form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDraft {
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub category: Option<String>,
    pub stock: Option<u32>,
    pub is_featured: bool,
    pub rating: Option<f64>,
    pub num_reviews: Option<u32>,
    pub drive_file_id: Option<String>,
    pub drive_file_ids: Vec<String>,
}

impl ProductDraft {
    pub fn validate(&self) -> VitrineResult<()> {
        if self.name.trim().is_empty() {
            return Err(VitrineError::Validation("Product name is required.".to_string()));
        }
        if let Some(price) = self.price_cents {
            if price < 0 {
                return Err(VitrineError::Validation("Price cannot be negative.".to_string()));
            }
            if price > MAX_PRICE_CENTS {
                return Err(VitrineError::Validation("Price is too large.".to_string()));
            }
        }
        if let Some(rating) = self.rating {
            if !rating.is_finite() || rating < 0.0 {
                return Err(VitrineError::Validation("Rating must be a non-negative number.".to_string()));
            }
        }
        Ok(())
    }
}
