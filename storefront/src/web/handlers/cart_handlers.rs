// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use vitrine::{CartLine, CartSummary};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedSession;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: String,
  /// Missing, zero and negative quantities all add a single unit.
  #[serde(default)]
  pub quantity: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct SetQuantityPayload {
  pub quantity: i64,
}

#[derive(Deserialize, Debug)]
pub struct ReplaceCartPayload {
  pub items: Vec<CartLine>,
}

fn summary(lines: Vec<CartLine>) -> HttpResponse {
  HttpResponse::Ok().json(CartSummary::from(lines))
}

// --- Handler Implementations ---

#[instrument(name = "handler::get_cart", skip_all, fields(uid = %auth.session.uid))]
pub async fn get_cart_handler(app_state: web::Data<AppState>, auth: AuthenticatedSession) -> Result<HttpResponse, AppError> {
  let lines = app_state.storefront.cart(&auth.session).await?;
  Ok(summary(lines))
}

#[instrument(name = "handler::replace_cart", skip_all, fields(uid = %auth.session.uid, lines = req_payload.items.len()))]
pub async fn replace_cart_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  req_payload: web::Json<ReplaceCartPayload>,
) -> Result<HttpResponse, AppError> {
  let lines = app_state
    .storefront
    .set_cart(&auth.session, req_payload.into_inner().items)
    .await?;
  Ok(summary(lines))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, auth),
    fields(uid = %auth.session.uid, product_id = %req_payload.product_id, quantity = ?req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  req_payload: web::Json<AddToCartRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let lines = app_state
    .storefront
    .add_to_cart(&auth.session, &req_payload.product_id, req_payload.quantity.unwrap_or(1))
    .await?;
  info!(lines = lines.len(), "Item added to cart.");
  Ok(summary(lines))
}

#[instrument(name = "handler::set_cart_quantity", skip(app_state, auth, req_payload), fields(uid = %auth.session.uid))]
pub async fn set_quantity_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  path: web::Path<usize>,
  req_payload: web::Json<SetQuantityPayload>,
) -> Result<HttpResponse, AppError> {
  let lines = app_state
    .storefront
    .set_cart_quantity(&auth.session, path.into_inner(), req_payload.quantity)
    .await?;
  Ok(summary(lines))
}

#[instrument(name = "handler::remove_from_cart", skip(app_state, auth), fields(uid = %auth.session.uid))]
pub async fn remove_item_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  path: web::Path<usize>,
) -> Result<HttpResponse, AppError> {
  let lines = app_state
    .storefront
    .remove_from_cart(&auth.session, path.into_inner())
    .await?;
  Ok(summary(lines))
}
