// storefront/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod auth_handlers;
pub mod cart_handlers;
pub mod image_handlers;
pub mod product_handlers;
pub mod request_handlers;
