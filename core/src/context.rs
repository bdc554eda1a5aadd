// core/src/context.rs

//! `Storefront` is the data-access context every client surface goes
//! through. It holds no per-user state: callers pass the `Session` returned
//! by a sign-in to each operation.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::auth::{AuthProvider, AuthUser};
use crate::cart;
use crate::config::StorefrontConfig;
use crate::error::{VitrineError, VitrineResult};
use crate::media::normalize_product_images;
use crate::model::{
    CartLine, Contact, Product, ProductDraft, ProfileUpdate, Request, RequestStatus, Role, UserRecord,
};
use crate::reservation;
use crate::session::Session;
use crate::store::Backend;

#[derive(Clone)]
pub struct Storefront {
    backend: Arc<dyn Backend>,
    auth: Arc<dyn AuthProvider>,
    config: StorefrontConfig,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Storefront {
    pub fn new(
        backend: Arc<dyn Backend>,
        auth: Arc<dyn AuthProvider>,
        config: StorefrontConfig,
    ) -> Self {
        Self { backend, auth, config }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    // --- accounts ---

    /// Creates the client record for a first-time identity. Existing records
    /// are returned untouched.
    async fn ensure_user_record(&self, user: &AuthUser) -> VitrineResult<UserRecord> {
        let fresh = UserRecord::new_client(&user.uid, user.email.clone(), user.display_name.clone(), Utc::now());
        if self.backend.create_user_if_absent(&fresh).await? {
            info!(uid = %user.uid, "Created client record.");
            return Ok(fresh);
        }
        self
            .backend
            .get_user(&user.uid)
            .await?
            .ok_or_else(|| VitrineError::not_found("user", &user.uid))
    }

    #[instrument(name = "Storefront::sign_up_client", skip(self, password), err(Display))]
    pub async fn sign_up_client(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> VitrineResult<Session> {
        let user = self.auth.create_account(email, password, display_name).await?;
        let record = self.ensure_user_record(&user).await?;
        Ok(Session::new(&user, Some(&record)))
    }

    #[instrument(name = "Storefront::sign_in_client", skip(self, password), err(Display))]
    pub async fn sign_in_client(&self, email: &str, password: &str) -> VitrineResult<Session> {
        let user = self.auth.sign_in(email, password).await?;
        let record = self.ensure_user_record(&user).await?;
        Ok(Session::new(&user, Some(&record)))
    }

    /// Only succeeds for identities whose record carries the admin role.
    #[instrument(name = "Storefront::sign_in_admin", skip(self, password), err(Display))]
    pub async fn sign_in_admin(&self, email: &str, password: &str) -> VitrineResult<Session> {
        let user = self.auth.sign_in(email, password).await?;
        match self.backend.get_user(&user.uid).await? {
            Some(record) if record.is_admin() => Ok(Session::new(&user, Some(&record))),
            _ => {
                warn!(uid = %user.uid, "Admin sign-in refused for non-admin account.");
                Err(VitrineError::NotAdmin)
            }
        }
    }

    #[instrument(name = "Storefront::sign_up_admin", skip(self, password), err(Display))]
    pub async fn sign_up_admin(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> VitrineResult<Session> {
        let user = self.auth.create_account(email, password, display_name).await?;
        let record = UserRecord::new_admin(&user.uid, user.email.clone(), user.display_name.clone(), Utc::now());
        self.backend.put_user(&record).await?;
        info!(uid = %user.uid, "Created admin record.");
        Ok(Session::new(&user, Some(&record)))
    }

    pub async fn user_record(&self, session: &Session) -> VitrineResult<Option<UserRecord>> {
        self.backend.get_user(&session.uid).await
    }

    /// Clients must fill in their contact profile before using the cart.
    pub async fn profile_needs_completion(&self, session: &Session) -> VitrineResult<bool> {
        if session.is_admin() {
            return Ok(false);
        }
        Ok(match self.backend.get_user(&session.uid).await? {
            None => true,
            Some(record) => record.role == Role::Client && !record.profile_completed,
        })
    }

    #[instrument(name = "Storefront::update_profile", skip(self, session, update), fields(uid = %session.uid), err(Display))]
    pub async fn update_profile(
        &self,
        session: &Session,
        update: ProfileUpdate,
    ) -> VitrineResult<UserRecord> {
        let mut record = self.load_or_new_record(session).await?;
        record.apply_profile(update);
        self.backend.put_user(&record).await?;
        Ok(record)
    }

    /// Reauthenticates, then removes the user's requests, record and account,
    /// in that order.
    #[instrument(name = "Storefront::delete_account", skip(self, session, password), fields(uid = %session.uid), err(Display))]
    pub async fn delete_account(&self, session: &Session, password: &str) -> VitrineResult<()> {
        if password.is_empty() {
            return Err(VitrineError::Validation(
                "Please enter your password to confirm account deletion.".to_string(),
            ));
        }
        self.auth.reauthenticate(&session.uid, password).await?;
        let removed = self.backend.delete_requests(&session.uid).await?;
        self.backend.delete_user(&session.uid).await?;
        self.auth.delete_account(&session.uid).await?;
        info!(requests_removed = removed, "Account deleted.");
        Ok(())
    }

    async fn load_or_new_record(&self, session: &Session) -> VitrineResult<UserRecord> {
        Ok(match self.backend.get_user(&session.uid).await? {
            Some(record) => record,
            None => UserRecord::new_client(&session.uid, session.email.clone(), session.display_name.clone(), Utc::now()),
        })
    }

    // --- cart ---

    pub async fn cart(&self, session: &Session) -> VitrineResult<Vec<CartLine>> {
        session.require_client()?;
        Ok(self.backend.get_user(&session.uid).await?.map(|u| u.cart).unwrap_or_default())
    }

    async fn persist_cart(
        &self,
        session: &Session,
        lines: Vec<CartLine>,
    ) -> VitrineResult<Vec<CartLine>> {
        match self.backend.set_cart(&session.uid, &lines).await {
            Ok(()) => Ok(lines),
            Err(VitrineError::NotFound { .. }) => {
                let mut record = self.load_or_new_record(session).await?;
                record.cart = lines.clone();
                self.backend.put_user(&record).await?;
                Ok(lines)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(name = "Storefront::set_cart", skip(self, session, lines), fields(uid = %session.uid, lines = lines.len()), err(Display))]
    pub async fn set_cart(
        &self,
        session: &Session,
        lines: Vec<CartLine>,
    ) -> VitrineResult<Vec<CartLine>> {
        session.require_client()?;
        let lines = lines
            .into_iter()
            .filter(|l| !l.product_id.trim().is_empty())
            .map(|mut l| {
                l.quantity = l.quantity.max(1);
                l
            })
            .collect();
        self.persist_cart(session, lines).await
    }

    #[instrument(name = "Storefront::add_to_cart", skip(self, session), fields(uid = %session.uid), err(Display))]
    pub async fn add_to_cart(
        &self,
        session: &Session,
        product_id: &str,
        quantity: i64,
    ) -> VitrineResult<Vec<CartLine>> {
        session.require_client()?;
        let product = self.product(product_id).await?;
        let mut lines = self.cart(session).await?;
        cart::add_product(&mut lines, &product, cart::coerce_quantity(quantity))?;
        self.persist_cart(session, lines).await
    }

    #[instrument(name = "Storefront::set_cart_quantity", skip(self, session), fields(uid = %session.uid), err(Display))]
    pub async fn set_cart_quantity(
        &self,
        session: &Session,
        index: usize,
        quantity: i64,
    ) -> VitrineResult<Vec<CartLine>> {
        let mut lines = self.cart(session).await?;
        cart::set_quantity(&mut lines, index, quantity)?;
        self.persist_cart(session, lines).await
    }

    #[instrument(name = "Storefront::remove_from_cart", skip(self, session), fields(uid = %session.uid), err(Display))]
    pub async fn remove_from_cart(
        &self,
        session: &Session,
        index: usize,
    ) -> VitrineResult<Vec<CartLine>> {
        let mut lines = self.cart(session).await?;
        cart::remove_line(&mut lines, index)?;
        self.persist_cart(session, lines).await
    }

    // --- requests ---

    /// Runs the stock-reservation transaction for `lines` and returns the new
    /// request id.
    #[instrument(name = "Storefront::submit_request", skip(self, session, lines), fields(uid = %session.uid, lines = lines.len()), err(Display))]
    pub async fn submit_request(
        &self,
        session: &Session,
        lines: &[CartLine],
    ) -> VitrineResult<String> {
        session.require_client()?;
        let record = self.backend.get_user(&session.uid).await?;
        let contact = Contact::from_user(record.as_ref(), session.email.as_deref());
        let request = reservation::reserve(
            self.backend.as_ref(),
            &self.config.reservation,
            &session.uid,
            contact,
            lines,
        )
        .await?;
        Ok(request.id)
    }

    /// Submits the stored cart, refusing carts the client could not check out.
    pub async fn submit_cart(&self, session: &Session) -> VitrineResult<String> {
        let lines = self.cart(session).await?;
        if lines.is_empty() {
            return Err(VitrineError::EmptyCart);
        }
        if cart::has_stock_issues(&lines) {
            return Err(VitrineError::Validation(
                "Some items exceed the available stock. Adjust the cart before submitting.".to_string(),
            ));
        }
        self.submit_request(session, &lines).await
    }

    pub async fn my_requests(&self, session: &Session) -> VitrineResult<Vec<Request>> {
        self.backend.list_requests(&session.uid).await
    }

    /// Every client's requests, newest first.
    #[instrument(name = "Storefront::requests_for_admin", skip_all, err(Display))]
    pub async fn requests_for_admin(&self, session: &Session) -> VitrineResult<Vec<Request>> {
        session.require_admin()?;
        let mut all = Vec::new();
        for user in self.client_users().await? {
            all.extend(self.backend.list_requests(&user.uid).await?);
        }
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    pub async fn users_for_admin(&self, session: &Session) -> VitrineResult<Vec<UserRecord>> {
        session.require_admin()?;
        self.client_users().await
    }

    async fn client_users(&self) -> VitrineResult<Vec<UserRecord>> {
        Ok(
            self
                .backend
                .list_users()
                .await?
                .into_iter()
                .filter(|u| u.role == Role::Client)
                .collect(),
        )
    }

    #[instrument(name = "Storefront::update_request_status", skip(self, session), err(Display))]
    pub async fn update_request_status(
        &self,
        session: &Session,
        user_id: &str,
        request_id: &str,
        status: RequestStatus,
    ) -> VitrineResult<()> {
        session.require_admin()?;
        self.backend.update_request_status(user_id, request_id, status).await
    }

    // --- catalog ---

    /// Catalog listing sorted by name, case-insensitively, with normalized
    /// image URLs.
    pub async fn products(&self, category: Option<&str>) -> VitrineResult<Vec<Product>> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let mut products = self.backend.list_products(category).await?;
        products.iter_mut().for_each(normalize_product_images);
        products.sort_by_cached_key(|p| p.name.to_lowercase());
        Ok(products)
    }

    pub async fn product(&self, id: &str) -> VitrineResult<Product> {
        let mut product = self
            .backend
            .get_product(id)
            .await?
            .ok_or_else(|| VitrineError::not_found("product", id))?;
        normalize_product_images(&mut product);
        Ok(product)
    }

    #[instrument(name = "Storefront::create_product", skip(self, session, draft), fields(name = %draft.name), err(Display))]
    pub async fn create_product(
        &self,
        session: &Session,
        draft: ProductDraft,
    ) -> VitrineResult<Product> {
        session.require_admin()?;
        draft.validate()?;
        let product = Product::from_draft(
            self.backend.new_document_id(),
            draft,
            &self.config.default_brand,
            Utc::now(),
        );
        self.backend.insert_product(&product).await?;
        info!(product_id = %product.id, "Product created.");
        Ok(product)
    }

    #[instrument(name = "Storefront::update_product", skip(self, session, draft), err(Display))]
    pub async fn update_product(
        &self,
        session: &Session,
        id: &str,
        draft: ProductDraft,
    ) -> VitrineResult<Product> {
        session.require_admin()?;
        draft.validate()?;
        let mut product = self
            .backend
            .get_product(id)
            .await?
            .ok_or_else(|| VitrineError::not_found("product", id))?;
        product.apply_draft(draft, &self.config.default_brand, Utc::now());
        self.backend.update_product(&product).await?;
        Ok(product)
    }

    /// Returns the removed product so the caller can clean up hosted images.
    #[instrument(name = "Storefront::delete_product", skip(self, session), err(Display))]
    pub async fn delete_product(&self, session: &Session, id: &str) -> VitrineResult<Product> {
        session.require_admin()?;
        let product = self
            .backend
            .get_product(id)
            .await?
            .ok_or_else(|| VitrineError::not_found("product", id))?;
        self.backend.delete_product(id).await?;
        Ok(product)
    }
}
