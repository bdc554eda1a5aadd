// src/lib.rs

//! Vitrine: the data-access context of a small jewelry storefront.
//!
//! Vitrine sits between client surfaces and the managed services a
//! storefront depends on:
//!  - A document `Backend` holding users (with embedded carts), products and
//!    per-user purchase requests.
//!  - An `AuthProvider` that owns credentials.
//!  - An `ImageHost` bridge that stores product photos.
//!
//! The one piece of real logic is the stock-reservation transaction
//! (`reservation::reserve`): a cart becomes a `Request` while stock is
//! decremented, all in one optimistic transaction that is retried on
//! conflict and never drives stock below zero.

pub mod auth;
pub mod cart;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod media;
pub mod model;
pub mod reservation;
pub mod session;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::auth::{normalize_email, AuthProvider, AuthUser, MemoryAuthProvider};
pub use crate::cart::CartSummary;
pub use crate::config::{ReservationConfig, StorefrontConfig};
pub use crate::context::Storefront;
pub use crate::error::{VitrineError, VitrineResult};
pub use crate::media::{ImageHost, ImageUpload, UploadedImage};
pub use crate::model::{
    CartLine, Contact, Product, ProductDraft, ProfileUpdate, Request, RequestLine, RequestStatus, Role, UserRecord,
};
pub use crate::session::Session;
pub use crate::store::{Backend, MemoryBackend, Transaction};

/*
    Typical flow:
    1. Build a `Storefront` from a backend, an auth provider and a config.
    2. `sign_in_client` returns a `Session`; keep it for the user's lifetime.
    3. `add_to_cart` / `set_cart_quantity` / `remove_from_cart` persist the
       cart on every change.
    4. `submit_cart` runs the reservation and returns the request number.
    5. Admins list requests with `requests_for_admin` and mark them completed
       with `update_request_status`.
*/
