// storefront/src/web/handlers/request_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use vitrine::{CartLine, VitrineError};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedSession;

#[derive(Deserialize, Debug, Default)]
pub struct SubmitRequestPayload {
  /// Lines to submit instead of the stored cart.
  #[serde(default)]
  pub items: Option<Vec<CartLine>>,
}

/// An empty body submits the stored cart. A body that does not parse is
/// rejected; it never falls back to the stored cart.
#[instrument(name = "handler::submit_request", skip_all, fields(uid = %auth.session.uid))]
pub async fn submit_request_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let payload = if body.iter().all(u8::is_ascii_whitespace) {
    SubmitRequestPayload::default()
  } else {
    serde_json::from_slice::<SubmitRequestPayload>(&body)
      .map_err(|e| VitrineError::Validation(format!("Invalid request body: {}", e)))?
  };
  let request_id = match payload.items {
    Some(items) => app_state.storefront.submit_request(&auth.session, &items).await?,
    None => app_state.storefront.submit_cart(&auth.session).await?,
  };
  info!(request_id = %request_id, "Request submitted.");
  Ok(HttpResponse::Created().json(json!({
      "message": "Request sent. We'll contact you soon.",
      "requestId": request_id,
  })))
}

#[instrument(name = "handler::my_requests", skip_all, fields(uid = %auth.session.uid))]
pub async fn my_requests_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
) -> Result<HttpResponse, AppError> {
  let requests = app_state.storefront.my_requests(&auth.session).await?;
  Ok(HttpResponse::Ok().json(json!({ "requests": requests })))
}
