// core/src/store/mod.rs

//! Data-access contracts. A `Backend` is the document database: plain
//! reads and writes for users, products and requests, plus `begin()` for the
//! one multi-document transaction the storefront needs.

mod memory;

pub use memory::MemoryBackend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::VitrineResult;
use crate::model::{CartLine, Product, Request, RequestStatus, UserRecord};

#[async_trait]
pub trait Backend: Send + Sync {
    // --- users ---
    async fn get_user(&self, uid: &str) -> VitrineResult<Option<UserRecord>>;

    /// Inserts or replaces the whole record.
    async fn put_user(&self, user: &UserRecord) -> VitrineResult<()>;

    /// Inserts only when no record exists. Returns whether a record was written.
    async fn create_user_if_absent(&self, user: &UserRecord) -> VitrineResult<bool>;

    /// Replaces the embedded cart. `NotFound` when the user has no record.
    async fn set_cart(&self, uid: &str, cart: &[CartLine]) -> VitrineResult<()>;

    async fn list_users(&self) -> VitrineResult<Vec<UserRecord>>;

    async fn delete_user(&self, uid: &str) -> VitrineResult<()>;

    // --- products ---
    /// Products in `category`, or all products. Order is unspecified.
    async fn list_products(&self, category: Option<&str>) -> VitrineResult<Vec<Product>>;

    async fn get_product(&self, id: &str) -> VitrineResult<Option<Product>>;

    async fn insert_product(&self, product: &Product) -> VitrineResult<()>;

    /// Replaces an existing product. `NotFound` when absent.
    async fn update_product(&self, product: &Product) -> VitrineResult<()>;

    /// `NotFound` when absent.
    async fn delete_product(&self, id: &str) -> VitrineResult<()>;

    // --- requests ---
    /// Requests of one user, newest first.
    async fn list_requests(&self, uid: &str) -> VitrineResult<Vec<Request>>;

    /// `NotFound` when the request does not exist under `uid`.
    async fn update_request_status(&self, uid: &str, request_id: &str, status: RequestStatus) -> VitrineResult<()>;

    /// Deletes every request of `uid`, returning how many were removed.
    async fn delete_requests(&self, uid: &str) -> VitrineResult<u64>;

    // --- transactions ---
    async fn begin(&self) -> VitrineResult<Box<dyn Transaction>>;

    /// Document id for a record created inside a transaction.
    fn new_document_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// A read-then-write unit of work. Reads happen first and are tracked; writes
/// are buffered and only become visible on a successful `commit`. Dropping a
/// transaction without committing discards its writes.
#[async_trait]
pub trait Transaction: Send {
    /// Reads a product as part of the transaction's read set.
    async fn product(&mut self, id: &str) -> VitrineResult<Option<Product>>;

    fn set_stock(&mut self, product_id: &str, stock: u32, updated_at: DateTime<Utc>);

    fn insert_request(&mut self, request: Request);

    fn clear_cart(&mut self, uid: &str);

    /// Applies every buffered write atomically. Fails with `Conflict` when a
    /// document in the read set changed since it was read.
    async fn commit(self: Box<Self>) -> VitrineResult<()>;
}
