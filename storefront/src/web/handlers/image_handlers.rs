// storefront/src/web/handlers/image_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;
use vitrine::{ImageHost, ImageUpload};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedSession;

fn image_host(app_state: &AppState) -> Result<&Arc<dyn ImageHost>, AppError> {
  app_state
    .image_host
    .as_ref()
    .ok_or_else(|| AppError::Disabled("image hosting is not configured".to_string()))
}

#[instrument(name = "handler::upload_image", skip_all, fields(uid = %auth.session.uid))]
pub async fn upload_image_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  req_payload: web::Json<ImageUpload>,
) -> Result<HttpResponse, AppError> {
  auth.session.require_admin()?;
  let uploaded = image_host(&app_state)?.upload(req_payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({
      "success": true,
      "fileId": uploaded.file_id,
      "imageUrl": uploaded.image_url,
  })))
}

#[instrument(name = "handler::delete_image", skip(app_state, auth), fields(uid = %auth.session.uid))]
pub async fn delete_image_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  auth.session.require_admin()?;
  image_host(&app_state)?.delete(&path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
