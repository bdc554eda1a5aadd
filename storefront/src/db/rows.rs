// storefront/src/db/rows.rs

//! Row <-> model mapping. Queries are checked at runtime, so every column
//! is read by name.

use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;
use vitrine::{CartLine, Contact, Product, Request, RequestLine, RequestStatus, Role, UserRecord};

pub(crate) const USER_COLUMNS: &str = "uid, email, display_name, role, profile_completed, full_name, address, \
   work_title, phone, has_whatsapp, cart, created_at";

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, brand, description, price_cents, image, images, category, \
   stock, is_featured, rating, num_reviews, drive_file_id, drive_file_ids, created_at, updated_at";

pub(crate) const REQUEST_COLUMNS: &str = "id, user_id, user_email, full_name, address, phone, has_whatsapp, items, \
   status, request_number, created_at";

fn decode_err<E>(err: E) -> sqlx::Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  sqlx::Error::Decode(Box::new(err))
}

/// Counts are stored as BIGINT. Negative values read as zero.
fn to_u32(value: i64) -> u32 {
  u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

pub(crate) fn to_i64(value: u32) -> i64 {
  i64::from(value)
}

pub(crate) fn user_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
  let role: String = row.try_get("role")?;
  let Json(cart): Json<Vec<CartLine>> = row.try_get("cart")?;
  Ok(UserRecord {
    uid: row.try_get("uid")?,
    email: row.try_get("email")?,
    display_name: row.try_get("display_name")?,
    role: role.parse::<Role>().map_err(decode_err)?,
    profile_completed: row.try_get("profile_completed")?,
    full_name: row.try_get("full_name")?,
    address: row.try_get("address")?,
    work_title: row.try_get("work_title")?,
    phone: row.try_get("phone")?,
    has_whatsapp: row.try_get("has_whatsapp")?,
    cart,
    created_at: row.try_get("created_at")?,
  })
}

pub(crate) fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
  let Json(images): Json<Vec<String>> = row.try_get("images")?;
  let Json(drive_file_ids): Json<Vec<String>> = row.try_get("drive_file_ids")?;
  let stock: Option<i64> = row.try_get("stock")?;
  let num_reviews: i64 = row.try_get("num_reviews")?;
  Ok(Product {
    id: row.try_get("id")?,
    name: row.try_get("name")?,
    brand: row.try_get("brand")?,
    description: row.try_get("description")?,
    price_cents: row.try_get("price_cents")?,
    image: row.try_get("image")?,
    images,
    category: row.try_get("category")?,
    stock: stock.map(to_u32),
    is_featured: row.try_get("is_featured")?,
    rating: row.try_get("rating")?,
    num_reviews: to_u32(num_reviews),
    drive_file_id: row.try_get("drive_file_id")?,
    drive_file_ids,
    created_at: row.try_get("created_at")?,
    updated_at: row.try_get("updated_at")?,
  })
}

pub(crate) fn request_from_row(row: &PgRow) -> Result<Request, sqlx::Error> {
  let status: String = row.try_get("status")?;
  let Json(items): Json<Vec<RequestLine>> = row.try_get("items")?;
  Ok(Request {
    id: row.try_get("id")?,
    user_id: row.try_get("user_id")?,
    contact: Contact {
      user_email: row.try_get("user_email")?,
      full_name: row.try_get("full_name")?,
      address: row.try_get("address")?,
      phone: row.try_get("phone")?,
      has_whatsapp: row.try_get("has_whatsapp")?,
    },
    items,
    status: status.parse::<RequestStatus>().map_err(decode_err)?,
    request_number: row.try_get("request_number")?,
    created_at: row.try_get("created_at")?,
  })
}
