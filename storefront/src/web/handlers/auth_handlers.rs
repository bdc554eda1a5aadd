// storefront/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use vitrine::{ProfileUpdate, Session};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedSession;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequestPayload {
  pub email: String,
  pub password: String,
  #[serde(default)]
  pub display_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct DeleteAccountPayload {
  #[serde(default)]
  pub password: String,
}

async fn session_response(app_state: &AppState, session: Session, created: bool) -> Result<HttpResponse, AppError> {
  let needs_profile = app_state.storefront.profile_needs_completion(&session).await?;
  let token = app_state.sessions.issue(session.clone());
  let body = json!({
      "token": token,
      "session": session,
      "needsProfile": needs_profile,
  });
  Ok(if created {
    HttpResponse::Created().json(body)
  } else {
    HttpResponse::Ok().json(body)
  })
}

// --- Handler Implementations ---

#[instrument(name = "handler::signup", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let session = app_state
    .storefront
    .sign_up_client(&payload.email, &payload.password, payload.display_name.as_deref())
    .await?;
  info!(uid = %session.uid, "Client signed up.");
  session_response(&app_state, session, true).await
}

#[instrument(name = "handler::signin", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let session = app_state
    .storefront
    .sign_in_client(&req_payload.email, &req_payload.password)
    .await?;
  session_response(&app_state, session, false).await
}

#[instrument(name = "handler::admin_signin", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn admin_signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let session = app_state
    .storefront
    .sign_in_admin(&req_payload.email, &req_payload.password)
    .await?;
  session_response(&app_state, session, false).await
}

#[instrument(name = "handler::admin_signup", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn admin_signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  if !app_state.config.allow_admin_signup {
    return Err(AppError::Disabled("admin sign-up".to_string()));
  }
  let payload = req_payload.into_inner();
  let session = app_state
    .storefront
    .sign_up_admin(&payload.email, &payload.password, payload.display_name.as_deref())
    .await?;
  info!(uid = %session.uid, "Admin signed up.");
  session_response(&app_state, session, true).await
}

#[instrument(name = "handler::signout", skip_all, fields(uid = %auth.session.uid))]
pub async fn signout_handler(app_state: web::Data<AppState>, auth: AuthenticatedSession) -> HttpResponse {
  app_state.sessions.revoke(&auth.token);
  HttpResponse::NoContent().finish()
}

#[instrument(name = "handler::me", skip_all, fields(uid = %auth.session.uid))]
pub async fn me_handler(app_state: web::Data<AppState>, auth: AuthenticatedSession) -> Result<HttpResponse, AppError> {
  let record = app_state.storefront.user_record(&auth.session).await?;
  let needs_profile = app_state.storefront.profile_needs_completion(&auth.session).await?;
  Ok(HttpResponse::Ok().json(json!({
      "session": auth.session,
      "user": record,
      "needsProfile": needs_profile,
  })))
}

#[instrument(name = "handler::update_profile", skip_all, fields(uid = %auth.session.uid))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  req_payload: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
  let record = app_state
    .storefront
    .update_profile(&auth.session, req_payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "user": record })))
}

/// Deleting the account also signs the user out everywhere.
#[instrument(name = "handler::delete_account", skip_all, fields(uid = %auth.session.uid))]
pub async fn delete_account_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedSession,
  req_payload: web::Json<DeleteAccountPayload>,
) -> Result<HttpResponse, AppError> {
  app_state
    .storefront
    .delete_account(&auth.session, &req_payload.password)
    .await?;
  let revoked = app_state.sessions.revoke_user(&auth.session.uid);
  info!(revoked_tokens = revoked, "Account deleted.");
  Ok(HttpResponse::NoContent().finish())
}
