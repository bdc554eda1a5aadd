// storefront/src/db/backend.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use tracing::{debug, instrument};
use vitrine::{Backend, CartLine, Product, Request, RequestStatus, Transaction, UserRecord, VitrineError, VitrineResult};

use super::map_sqlx_error;
use super::rows::{
  product_from_row, request_from_row, to_i64, user_from_row, PRODUCT_COLUMNS, REQUEST_COLUMNS, USER_COLUMNS,
};

/// `Backend` over a Postgres pool. The reservation transaction locks the
/// product rows it reads (`SELECT ... FOR UPDATE`), so concurrent
/// reservations of the same product serialize instead of overselling.
#[derive(Debug, Clone)]
pub struct PgBackend {
  pool: PgPool,
}

impl PgBackend {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

const UPSERT_USER: &str = "INSERT INTO users (uid, email, display_name, role, profile_completed, full_name, address, \
   work_title, phone, has_whatsapp, cart, created_at) \
   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
   ON CONFLICT (uid) DO UPDATE SET email = EXCLUDED.email, display_name = EXCLUDED.display_name, \
   role = EXCLUDED.role, profile_completed = EXCLUDED.profile_completed, full_name = EXCLUDED.full_name, \
   address = EXCLUDED.address, work_title = EXCLUDED.work_title, phone = EXCLUDED.phone, \
   has_whatsapp = EXCLUDED.has_whatsapp, cart = EXCLUDED.cart";

const INSERT_USER_IF_ABSENT: &str = "INSERT INTO users (uid, email, display_name, role, profile_completed, full_name, \
   address, work_title, phone, has_whatsapp, cart, created_at) \
   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
   ON CONFLICT (uid) DO NOTHING";

const INSERT_PRODUCT: &str = "INSERT INTO products (id, name, brand, description, price_cents, image, images, \
   category, stock, is_featured, rating, num_reviews, drive_file_id, drive_file_ids, created_at, updated_at) \
   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)";

const UPDATE_PRODUCT: &str = "UPDATE products SET name = $2, brand = $3, description = $4, price_cents = $5, \
   image = $6, images = $7, category = $8, stock = $9, is_featured = $10, rating = $11, num_reviews = $12, \
   drive_file_id = $13, drive_file_ids = $14, created_at = $15, updated_at = $16 WHERE id = $1";

const INSERT_REQUEST: &str = "INSERT INTO requests (id, user_id, user_email, full_name, address, phone, \
   has_whatsapp, items, status, request_number, created_at) \
   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)";

fn bind_user<'q>(
  query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
  user: &'q UserRecord,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
  query
    .bind(&user.uid)
    .bind(&user.email)
    .bind(&user.display_name)
    .bind(user.role.as_str())
    .bind(user.profile_completed)
    .bind(&user.full_name)
    .bind(&user.address)
    .bind(&user.work_title)
    .bind(&user.phone)
    .bind(user.has_whatsapp)
    .bind(Json(&user.cart))
    .bind(user.created_at)
}

fn bind_product<'q>(
  query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
  product: &'q Product,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
  query
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.brand)
    .bind(&product.description)
    .bind(product.price_cents)
    .bind(&product.image)
    .bind(Json(&product.images))
    .bind(&product.category)
    .bind(product.stock.map(to_i64))
    .bind(product.is_featured)
    .bind(product.rating)
    .bind(to_i64(product.num_reviews))
    .bind(&product.drive_file_id)
    .bind(Json(&product.drive_file_ids))
    .bind(product.created_at)
    .bind(product.updated_at)
}

#[async_trait]
impl Backend for PgBackend {
  async fn get_user(&self, uid: &str) -> VitrineResult<Option<UserRecord>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE uid = $1", USER_COLUMNS))
      .bind(uid)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    row.as_ref().map(user_from_row).transpose().map_err(map_sqlx_error)
  }

  async fn put_user(&self, user: &UserRecord) -> VitrineResult<()> {
    bind_user(sqlx::query(UPSERT_USER), user)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    Ok(())
  }

  async fn create_user_if_absent(&self, user: &UserRecord) -> VitrineResult<bool> {
    let result = bind_user(sqlx::query(INSERT_USER_IF_ABSENT), user)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    Ok(result.rows_affected() == 1)
  }

  async fn set_cart(&self, uid: &str, cart: &[CartLine]) -> VitrineResult<()> {
    let result = sqlx::query("UPDATE users SET cart = $2 WHERE uid = $1")
      .bind(uid)
      .bind(Json(cart))
      .execute(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    if result.rows_affected() == 0 {
      return Err(VitrineError::not_found("user", uid));
    }
    Ok(())
  }

  async fn list_users(&self) -> VitrineResult<Vec<UserRecord>> {
    let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY created_at ASC, uid ASC", USER_COLUMNS))
      .fetch_all(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    rows.iter().map(user_from_row).collect::<Result<_, _>>().map_err(map_sqlx_error)
  }

  async fn delete_user(&self, uid: &str) -> VitrineResult<()> {
    sqlx::query("DELETE FROM users WHERE uid = $1")
      .bind(uid)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    Ok(())
  }

  async fn list_products(&self, category: Option<&str>) -> VitrineResult<Vec<Product>> {
    let rows = sqlx::query(&format!(
      "SELECT {} FROM products WHERE ($1::TEXT IS NULL OR category = $1)",
      PRODUCT_COLUMNS
    ))
    .bind(category)
    .fetch_all(&self.pool)
    .await
    .map_err(map_sqlx_error)?;
    rows.iter().map(product_from_row).collect::<Result<_, _>>().map_err(map_sqlx_error)
  }

  async fn get_product(&self, id: &str) -> VitrineResult<Option<Product>> {
    let row = sqlx::query(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    row.as_ref().map(product_from_row).transpose().map_err(map_sqlx_error)
  }

  async fn insert_product(&self, product: &Product) -> VitrineResult<()> {
    bind_product(sqlx::query(INSERT_PRODUCT), product)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    Ok(())
  }

  async fn update_product(&self, product: &Product) -> VitrineResult<()> {
    let result = bind_product(sqlx::query(UPDATE_PRODUCT), product)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    if result.rows_affected() == 0 {
      return Err(VitrineError::not_found("product", &product.id));
    }
    Ok(())
  }

  async fn delete_product(&self, id: &str) -> VitrineResult<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    if result.rows_affected() == 0 {
      return Err(VitrineError::not_found("product", id));
    }
    Ok(())
  }

  async fn list_requests(&self, uid: &str) -> VitrineResult<Vec<Request>> {
    let rows = sqlx::query(&format!(
      "SELECT {} FROM requests WHERE user_id = $1 ORDER BY created_at DESC",
      REQUEST_COLUMNS
    ))
    .bind(uid)
    .fetch_all(&self.pool)
    .await
    .map_err(map_sqlx_error)?;
    rows.iter().map(request_from_row).collect::<Result<_, _>>().map_err(map_sqlx_error)
  }

  async fn update_request_status(&self, uid: &str, request_id: &str, status: RequestStatus) -> VitrineResult<()> {
    let result = sqlx::query("UPDATE requests SET status = $3 WHERE user_id = $1 AND id = $2")
      .bind(uid)
      .bind(request_id)
      .bind(status.as_str())
      .execute(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    if result.rows_affected() == 0 {
      return Err(VitrineError::not_found("request", request_id));
    }
    Ok(())
  }

  async fn delete_requests(&self, uid: &str) -> VitrineResult<u64> {
    let result = sqlx::query("DELETE FROM requests WHERE user_id = $1")
      .bind(uid)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    Ok(result.rows_affected())
  }

  async fn begin(&self) -> VitrineResult<Box<dyn Transaction>> {
    let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
    Ok(Box::new(PgTransaction {
      tx,
      stock_writes: Vec::new(),
      new_requests: Vec::new(),
      cleared_carts: Vec::new(),
    }))
  }
}

/// Reads go through the open database transaction; writes are buffered and
/// flushed right before `COMMIT`. Dropping it rolls back.
struct PgTransaction {
  tx: sqlx::Transaction<'static, Postgres>,
  stock_writes: Vec<(String, u32, DateTime<Utc>)>,
  new_requests: Vec<Request>,
  cleared_carts: Vec<String>,
}

#[async_trait]
impl Transaction for PgTransaction {
  async fn product(&mut self, id: &str) -> VitrineResult<Option<Product>> {
    let row = sqlx::query(&format!("SELECT {} FROM products WHERE id = $1 FOR UPDATE", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&mut *self.tx)
      .await
      .map_err(map_sqlx_error)?;
    row.as_ref().map(product_from_row).transpose().map_err(map_sqlx_error)
  }

  fn set_stock(&mut self, product_id: &str, stock: u32, updated_at: DateTime<Utc>) {
    self.stock_writes.push((product_id.to_string(), stock, updated_at));
  }

  fn insert_request(&mut self, request: Request) {
    self.new_requests.push(request);
  }

  fn clear_cart(&mut self, uid: &str) {
    self.cleared_carts.push(uid.to_string());
  }

  #[instrument(name = "PgTransaction::commit", skip_all, err(Display))]
  async fn commit(self: Box<Self>) -> VitrineResult<()> {
    let PgTransaction {
      mut tx,
      stock_writes,
      new_requests,
      cleared_carts,
    } = *self;

    for (id, stock, updated_at) in &stock_writes {
      sqlx::query("UPDATE products SET stock = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(to_i64(*stock))
        .bind(*updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
    }
    for request in &new_requests {
      sqlx::query(INSERT_REQUEST)
        .bind(&request.id)
        .bind(&request.user_id)
        .bind(&request.contact.user_email)
        .bind(&request.contact.full_name)
        .bind(&request.contact.address)
        .bind(&request.contact.phone)
        .bind(request.contact.has_whatsapp)
        .bind(Json(&request.items))
        .bind(request.status.as_str())
        .bind(&request.request_number)
        .bind(request.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
    }
    for uid in &cleared_carts {
      sqlx::query("UPDATE users SET cart = '[]'::jsonb WHERE uid = $1")
        .bind(uid)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
    }

    tx.commit().await.map_err(map_sqlx_error)?;
    debug!(
      stock_writes = stock_writes.len(),
      requests = new_requests.len(),
      "Reservation committed."
    );
    Ok(())
  }
}
