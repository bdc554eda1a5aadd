// core/src/model/mod.rs

//! Documents stored by a `Backend`: users with their embedded carts, catalog
//! products, and the purchase requests created from carts.

pub mod product;
pub mod request;
pub mod user;

pub use product::{Product, ProductDraft, MAX_PRICE_CENTS};
pub use request::{Contact, Request, RequestLine, RequestStatus};
pub use user::{CartLine, ProfileUpdate, Role, UserRecord};
