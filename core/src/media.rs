// core/src/media.rs

//! Product images live in a shared drive folder reached through a script
//! bridge. Documents may hold full share links, thumbnail links or bare file
//! ids; everything served to clients is normalized to a thumbnail URL.

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{VitrineError, VitrineResult};
use crate::model::Product;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

static SHARE_LINK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/file/d/([a-zA-Z0-9_-]+)").ok());
static ID_PARAM: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[?&]id=([a-zA-Z0-9_-]+)").ok());
static SHORT_LINK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").ok());

fn first_capture<'a>(re: &Option<Regex>, s: &'a str) -> Option<&'a str> {
    re.as_ref()?.captures(s)?.get(1).map(|m| m.as_str())
}

/// Pulls the drive file id out of a share link, thumbnail link or bare id.
pub fn extract_file_id(url_or_id: &str) -> Option<&str> {
    let s = url_or_id.trim();
    if s.is_empty() {
        return None;
    }
    if !s.contains('/') && !s.contains('?') {
        return Some(s);
    }
    first_capture(&SHARE_LINK, s)
        .or_else(|| first_capture(&ID_PARAM, s))
        .or_else(|| first_capture(&SHORT_LINK, s))
}

pub fn thumbnail_url(url_or_id: &str) -> Option<String> {
    extract_file_id(url_or_id).map(|id| format!("https://drive.google.com/thumbnail?id={}&sz=w1000", id))
}

/// Rewrites `images` and `image` to thumbnail URLs. When no stored image
/// resolves, falls back to the drive file ids (or the single legacy id).
pub fn normalize_product_images(product: &mut Product) {
    let mut images: Vec<String> = product.images.iter().filter_map(|u| thumbnail_url(u)).collect();

    if product.drive_file_ids.is_empty() {
        if let Some(id) = product.drive_file_id.clone() {
            product.drive_file_ids = vec![id];
        }
    }
    if images.is_empty() {
        images = product.drive_file_ids.iter().filter_map(|id| thumbnail_url(id)).collect();
    }

    product.image = images
        .first()
        .cloned()
        .or_else(|| product.image.as_deref().and_then(thumbnail_url));
    product.images = images;
}

/// An upload as the client sends it: the file already base64 encoded.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub base64: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl ImageUpload {
    pub fn validate(&self) -> VitrineResult<()> {
        if self.base64.trim().is_empty() {
            return Err(VitrineError::Validation("Missing base64".to_string()));
        }
        Ok(())
    }

    pub fn resolved_file_name(&self) -> String {
        self
            .file_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("product-{}.jpg", Utc::now().timestamp_millis()))
    }

    pub fn resolved_mime_type(&self) -> String {
        self
            .mime_type
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub file_id: String,
    pub image_url: String,
}

impl UploadedImage {
    /// Uses the host-provided URL when present, else the thumbnail URL.
    pub fn new(file_id: String, image_url: Option<String>) -> Self {
        let image_url = image_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("https://drive.google.com/thumbnail?id={}&sz=w1000", file_id));
        Self { file_id, image_url }
    }
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, upload: ImageUpload) -> VitrineResult<UploadedImage>;

    async fn delete(&self, file_id: &str) -> VitrineResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_ids_pass_through() {
        assert_eq!(extract_file_id("1AbC_d-9"), Some("1AbC_d-9"));
        assert_eq!(extract_file_id("   "), None);
    }

    #[test]
    fn share_and_query_links_resolve() {
        assert_eq!(
            extract_file_id("https://drive.google.com/file/d/1xYz-_9/view?usp=sharing"),
            Some("1xYz-_9")
        );
        assert_eq!(extract_file_id("https://drive.google.com/open?id=abc123"), Some("abc123"));
        assert_eq!(
            extract_file_id("https://drive.google.com/thumbnail?sz=w1000&id=abc123"),
            Some("abc123")
        );
        assert_eq!(extract_file_id("https://docs.google.com/d/qwe/edit"), Some("qwe"));
        assert_eq!(extract_file_id("https://example.com/photo.jpg"), None);
    }

    #[test]
    fn link_patterns_are_tried_in_order() {
        assert_eq!(extract_file_id("https://drive.google.com/file/d/?id=fallback"), Some("fallback"));
        assert_eq!(
            extract_file_id("https://drive.google.com/d/short/file/d/share"),
            Some("share")
        );
        assert_eq!(extract_file_id("https://drive.google.com/uc?export=view&id=a1-b_2"), Some("a1-b_2"));
    }

    #[test]
    fn thumbnail_is_stable_for_thumbnails() {
        let url = thumbnail_url("abc").unwrap();
        assert_eq!(url, "https://drive.google.com/thumbnail?id=abc&sz=w1000");
        assert_eq!(thumbnail_url(&url).as_deref(), Some(url.as_str()));
    }

    #[test]
    fn uploaded_image_falls_back_to_thumbnail() {
        let img = UploadedImage::new("f1".to_string(), None);
        assert_eq!(img.image_url, "https://drive.google.com/thumbnail?id=f1&sz=w1000");
        let img = UploadedImage::new("f1".to_string(), Some("https://cdn/x.png".to_string()));
        assert_eq!(img.image_url, "https://cdn/x.png");
    }
}
