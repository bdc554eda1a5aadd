// storefront/src/services/mod.rs

pub mod image_bridge;

pub use image_bridge::ScriptBridge;
