// storefront/src/services/image_bridge.rs

//! Product photos live in a shared drive folder behind an HTTPS script. The
//! script takes a JSON `action` and answers `{success, fileId, imageUrl, error}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use vitrine::{ImageHost, ImageUpload, UploadedImage, VitrineError, VitrineResult};

use crate::config::DriveConfig;

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
enum ScriptCall<'a> {
  #[serde(rename_all = "camelCase")]
  Upload {
    key: &'a str,
    folder_id: &'a str,
    file_name: String,
    mime_type: String,
    base64: &'a str,
  },
  #[serde(rename_all = "camelCase")]
  Delete { key: &'a str, file_id: &'a str },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ScriptReply {
  success: bool,
  file_id: Option<String>,
  image_url: Option<String>,
  error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScriptBridge {
  config: DriveConfig,
  http_client: Client,
}

impl ScriptBridge {
  pub fn new(config: DriveConfig) -> Self {
    Self {
      config,
      http_client: Client::new(),
    }
  }

  async fn call(&self, call: &ScriptCall<'_>) -> VitrineResult<ScriptReply> {
    let response = self
      .http_client
      .post(&self.config.script_url)
      .json(call)
      .send()
      .await
      .map_err(|e| VitrineError::ImageHost(format!("Drive script unreachable: {}", e)))?;

    let status = response.status();
    // A reply that is not JSON is treated like an unsuccessful one.
    let reply = response.json::<ScriptReply>().await.unwrap_or_default();
    if !status.is_success() || !reply.success {
      let message = reply
        .error
        .clone()
        .unwrap_or_else(|| format!("Drive script failed ({})", status.as_u16()));
      error!(status = status.as_u16(), error = %message, "Drive script call failed.");
      return Err(VitrineError::ImageHost(message));
    }
    Ok(reply)
  }
}

#[async_trait]
impl ImageHost for ScriptBridge {
  #[instrument(name = "ScriptBridge::upload", skip(self, upload), fields(file_name = ?upload.file_name), err(Display))]
  async fn upload(&self, upload: ImageUpload) -> VitrineResult<UploadedImage> {
    upload.validate()?;
    let call = ScriptCall::Upload {
      key: &self.config.bucket_key,
      folder_id: &self.config.folder_id,
      file_name: upload.resolved_file_name(),
      mime_type: upload.resolved_mime_type(),
      base64: &upload.base64,
    };
    let reply = self.call(&call).await?;
    let file_id = reply
      .file_id
      .filter(|id| !id.trim().is_empty())
      .ok_or_else(|| VitrineError::ImageHost("Drive script returned no file id".to_string()))?;
    info!(file_id = %file_id, "Image uploaded.");
    Ok(UploadedImage::new(file_id, reply.image_url))
  }

  #[instrument(name = "ScriptBridge::delete", skip(self), err(Display))]
  async fn delete(&self, file_id: &str) -> VitrineResult<()> {
    if file_id.trim().is_empty() {
      return Err(VitrineError::Validation("Missing fileId".to_string()));
    }
    let call = ScriptCall::Delete {
      key: &self.config.bucket_key,
      file_id,
    };
    self.call(&call).await?;
    info!("Image deleted.");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn upload_call_matches_script_contract() {
    let call = ScriptCall::Upload {
      key: "k",
      folder_id: "folder",
      file_name: "ring.jpg".to_string(),
      mime_type: "image/jpeg".to_string(),
      base64: "AAAA",
    };
    assert_eq!(
      serde_json::to_value(&call).unwrap(),
      json!({
        "action": "upload",
        "key": "k",
        "folderId": "folder",
        "fileName": "ring.jpg",
        "mimeType": "image/jpeg",
        "base64": "AAAA"
      })
    );
  }

  #[test]
  fn delete_call_matches_script_contract() {
    let call = ScriptCall::Delete { key: "k", file_id: "f1" };
    assert_eq!(
      serde_json::to_value(&call).unwrap(),
      json!({"action": "delete", "key": "k", "fileId": "f1"})
    );
  }

  #[test]
  fn replies_tolerate_missing_fields() {
    let reply: ScriptReply = serde_json::from_value(json!({"success": false})).unwrap();
    assert!(!reply.success);
    assert!(reply.file_id.is_none() && reply.error.is_none());
  }
}
