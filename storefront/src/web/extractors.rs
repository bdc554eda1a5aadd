// storefront/src/web/extractors.rs

use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use vitrine::Session;

use crate::errors::AppError;
use crate::state::AppState;

/// The caller's session, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
  pub token: String,
  pub session: Session,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
  req
    .headers()
    .get(actix_web::http::header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl FromRequest for AuthenticatedSession {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      return ready(Err(AppError::Internal("Application state is not configured.".to_string())));
    };
    let Some(token) = bearer_token(req) else {
      warn!("Missing or malformed Authorization header.");
      return ready(Err(AppError::Auth("Sign in to continue.".to_string())));
    };
    match state.sessions.get(token) {
      Some(session) => ready(Ok(AuthenticatedSession {
        token: token.to_string(),
        session,
      })),
      None => {
        warn!("Unknown or revoked session token.");
        ready(Err(AppError::Auth("Your session has expired. Please sign in again.".to_string())))
      }
    }
  }
}
