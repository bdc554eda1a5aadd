// core/src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{Backend, Transaction};
use crate::error::{VitrineError, VitrineResult};
use crate::model::{CartLine, Product, Request, RequestStatus, UserRecord};

#[derive(Debug, Clone)]
struct Versioned<T> {
    version: u64,
    doc: T,
}

#[derive(Debug, Default)]
struct State {
    clock: u64,
    users: HashMap<String, Versioned<UserRecord>>,
    products: HashMap<String, Versioned<Product>>,
    /// Requests are a sub-collection of their owner.
    requests: HashMap<String, Vec<Request>>,
}

impl State {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn product_version(&self, id: &str) -> Option<u64> {
        self.products.get(id).map(|p| p.version)
    }
}

#[derive(Debug, Default)]
struct Counters {
    commits: AtomicU64,
    conflicts: AtomicU64,
    injected_conflicts: AtomicU32,
}

/// Optimistic in-memory document store. Every write bumps the document's
/// version; transactions validate the versions they read at commit time.
///
/// IMPORTANT: the state lock is a blocking `parking_lot` lock and is never
/// held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<RwLock<State>>,
    counters: Arc<Counters>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` commits fail with `Conflict`, to exercise retries.
    pub fn inject_conflicts(&self, n: u32) {
        self.counters.injected_conflicts.store(n, Ordering::SeqCst);
    }

    pub fn committed_transactions(&self) -> u64 {
        self.counters.commits.load(Ordering::SeqCst)
    }

    pub fn conflicted_transactions(&self) -> u64 {
        self.counters.conflicts.load(Ordering::SeqCst)
    }

    fn take_injected_conflict(&self) -> bool {
        self
            .counters
            .injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get_user(&self, uid: &str) -> VitrineResult<Option<UserRecord>> {
        Ok(self.state.read().users.get(uid).map(|u| u.doc.clone()))
    }

    async fn put_user(&self, user: &UserRecord) -> VitrineResult<()> {
        let mut state = self.state.write();
        let version = state.tick();
        state.users.insert(
            user.uid.clone(),
            Versioned {
                version,
                doc: user.clone(),
            },
        );
        Ok(())
    }

    async fn create_user_if_absent(&self, user: &UserRecord) -> VitrineResult<bool> {
        let mut state = self.state.write();
        if state.users.contains_key(&user.uid) {
            return Ok(false);
        }
        let version = state.tick();
        state.users.insert(
            user.uid.clone(),
            Versioned {
                version,
                doc: user.clone(),
            },
        );
        Ok(true)
    }

    async fn set_cart(&self, uid: &str, cart: &[CartLine]) -> VitrineResult<()> {
        let mut state = self.state.write();
        let version = state.tick();
        let user = state.users.get_mut(uid).ok_or_else(|| VitrineError::not_found("user", uid))?;
        user.doc.cart = cart.to_vec();
        user.version = version;
        Ok(())
    }

    async fn list_users(&self) -> VitrineResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.state.read().users.values().map(|u| u.doc.clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.uid.cmp(&b.uid)));
        Ok(users)
    }

    async fn delete_user(&self, uid: &str) -> VitrineResult<()> {
        self.state.write().users.remove(uid);
        Ok(())
    }

    async fn list_products(&self, category: Option<&str>) -> VitrineResult<Vec<Product>> {
        let state = self.state.read();
        Ok(
            state
                .products
                .values()
                .filter(|p| category.map_or(true, |c| p.doc.category.as_deref() == Some(c)))
                .map(|p| p.doc.clone())
                .collect(),
        )
    }

    async fn get_product(&self, id: &str) -> VitrineResult<Option<Product>> {
        Ok(self.state.read().products.get(id).map(|p| p.doc.clone()))
    }

    async fn insert_product(&self, product: &Product) -> VitrineResult<()> {
        let mut state = self.state.write();
        if state.products.contains_key(&product.id) {
            return Err(VitrineError::Validation(format!("Product {} already exists", product.id)));
        }
        let version = state.tick();
        state.products.insert(
            product.id.clone(),
            Versioned {
                version,
                doc: product.clone(),
            },
        );
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> VitrineResult<()> {
        let mut state = self.state.write();
        let version = state.tick();
        let slot = state
            .products
            .get_mut(&product.id)
            .ok_or_else(|| VitrineError::not_found("product", &product.id))?;
        slot.doc = product.clone();
        slot.version = version;
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> VitrineResult<()> {
        self
            .state
            .write()
            .products
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| VitrineError::not_found("product", id))
    }

    async fn list_requests(&self, uid: &str) -> VitrineResult<Vec<Request>> {
        let mut requests = self.state.read().requests.get(uid).cloned().unwrap_or_default();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn update_request_status(
        &self,
        uid: &str,
        request_id: &str,
        status: RequestStatus,
    ) -> VitrineResult<()> {
        let mut state = self.state.write();
        let request = state
            .requests
            .get_mut(uid)
            .and_then(|reqs| reqs.iter_mut().find(|r| r.id == request_id))
            .ok_or_else(|| VitrineError::not_found("request", request_id))?;
        request.status = status;
        Ok(())
    }

    async fn delete_requests(&self, uid: &str) -> VitrineResult<u64> {
        let removed = self.state.write().requests.remove(uid).map(|r| r.len()).unwrap_or(0);
        Ok(removed as u64)
    }

    async fn begin(&self) -> VitrineResult<Box<dyn Transaction>> {
        Ok(Box::new(MemoryTransaction {
            backend: self.clone(),
            reads: HashMap::new(),
            stock_writes: Vec::new(),
            new_requests: Vec::new(),
            cleared_carts: Vec::new(),
        }))
    }
}

struct MemoryTransaction {
    backend: MemoryBackend,
    /// Product id -> version seen (`None` when the product was absent).
    reads: HashMap<String, Option<u64>>,
    stock_writes: Vec<(String, u32, DateTime<Utc>)>,
    new_requests: Vec<Request>,
    cleared_carts: Vec<String>,
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn product(&mut self, id: &str) -> VitrineResult<Option<Product>> {
        let state = self.backend.state.read();
        let found = state.products.get(id);
        self.reads.insert(id.to_string(), found.map(|p| p.version));
        Ok(found.map(|p| p.doc.clone()))
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

    #[instrument(name = "MemoryTransaction::commit", skip_all, err(Display))]
    async fn commit(self: Box<Self>) -> VitrineResult<()> {
        let MemoryTransaction {
            backend,
            reads,
            stock_writes,
            new_requests,
            cleared_carts,
        } = *self;

        if backend.take_injected_conflict() {
            backend.counters.conflicts.fetch_add(1, Ordering::SeqCst);
            warn!("Injected commit conflict.");
            return Err(VitrineError::Conflict("injected conflict".to_string()));
        }

        let mut state = backend.state.write();
        for (id, seen) in &reads {
            if state.product_version(id) != *seen {
                backend.counters.conflicts.fetch_add(1, Ordering::SeqCst);
                debug!(product_id = %id, "Read set changed before commit.");
                return Err(VitrineError::Conflict(format!("product {} changed during transaction", id)));
            }
        }

        for (id, stock, updated_at) in stock_writes {
            let version = state.tick();
            if let Some(slot) = state.products.get_mut(&id) {
                slot.doc.stock = Some(stock);
                slot.doc.updated_at = updated_at;
                slot.version = version;
            }
        }
        for request in new_requests {
            state.requests.entry(request.user_id.clone()).or_default().push(request);
        }
        for uid in cleared_carts {
            let version = state.tick();
            if let Some(user) = state.users.get_mut(&uid) {
                user.doc.cart.clear();
                user.version = version;
            }
        }

        backend.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
