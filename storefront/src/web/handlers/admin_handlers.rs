// storefront/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use vitrine::{ProductDraft, RequestStatus};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedSession;

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: RequestStatus,
}

// --- Catalog ---

#[instrument(name = "handler::create_product", skip_all, fields(uid = %auth.session.uid))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  req_payload: web::Json<ProductDraft>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .storefront
    .create_product(&auth.session, req_payload.into_inner())
    .await?;
  Ok(HttpResponse::Created().json(json!({ "product": product })))
}

#[instrument(name = "handler::update_product", skip(app_state, auth, req_payload), fields(uid = %auth.session.uid))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  path: web::Path<String>,
  req_payload: web::Json<ProductDraft>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .storefront
    .update_product(&auth.session, &path.into_inner(), req_payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

/// Removes the product, then its hosted images. Image cleanup failures are
/// logged and do not fail the request.
#[instrument(name = "handler::delete_product", skip(app_state, auth), fields(uid = %auth.session.uid))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let removed = app_state
    .storefront
    .delete_product(&auth.session, &path.into_inner())
    .await?;

  let mut file_ids = removed.drive_file_ids.clone();
  if file_ids.is_empty() {
    file_ids.extend(removed.drive_file_id.clone());
  }

  let mut images_removed = 0usize;
  if let Some(host) = &app_state.image_host {
    for file_id in &file_ids {
      match host.delete(file_id).await {
        Ok(()) => images_removed += 1,
        Err(e) => warn!(file_id = %file_id, error = %e, "Could not delete hosted image."),
      }
    }
  }
  info!(product_id = %removed.id, images_removed, "Product deleted.");
  Ok(HttpResponse::Ok().json(json!({
      "deleted": removed.id,
      "imagesRemoved": images_removed,
  })))
}

// --- Requests & users ---

#[instrument(name = "handler::admin_requests", skip_all, fields(uid = %auth.session.uid))]
pub async fn list_requests_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
) -> Result<HttpResponse, AppError> {
  let requests = app_state.storefront.requests_for_admin(&auth.session).await?;
  Ok(HttpResponse::Ok().json(json!({ "requests": requests })))
}

#[instrument(name = "handler::admin_users", skip_all, fields(uid = %auth.session.uid))]
pub async fn list_users_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
) -> Result<HttpResponse, AppError> {
  let users = app_state.storefront.users_for_admin(&auth.session).await?;
  Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

#[instrument(name = "handler::update_request_status", skip(app_state, auth, req_payload), fields(uid = %auth.session.uid, status = %req_payload.status))]
pub async fn update_request_status_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  path: web::Path<(String, String)>,
  req_payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let (user_id, request_id) = path.into_inner();
  app_state
    .storefront
    .update_request_status(&auth.session, &user_id, &request_id, req_payload.status)
    .await?;
  Ok(HttpResponse::Ok().json(json!({
      "requestId": request_id,
      "status": req_payload.status,
  })))
}
