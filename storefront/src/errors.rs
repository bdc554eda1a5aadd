// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use vitrine::VitrineError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Domain(#[from] VitrineError),

  #[error("Authentication required: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  /// A route whose backing service is not configured on this server.
  #[error("Feature disabled: {0}")]
  Disabled(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Domain(e) => match e {
        VitrineError::InsufficientStock { .. } | VitrineError::OutOfStock { .. } => StatusCode::CONFLICT,
        VitrineError::EmptyCart | VitrineError::Validation(_) => StatusCode::BAD_REQUEST,
        VitrineError::NotFound { .. } => StatusCode::NOT_FOUND,
        VitrineError::Unauthenticated | VitrineError::InvalidCredentials | VitrineError::IncorrectPassword => {
          StatusCode::UNAUTHORIZED
        }
        VitrineError::EmailInUse(_) | VitrineError::Conflict(_) => StatusCode::CONFLICT,
        VitrineError::NotAdmin | VitrineError::Forbidden(_) => StatusCode::FORBIDDEN,
        VitrineError::ImageHost(_) => StatusCode::BAD_GATEWAY,
        VitrineError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Disabled(_) => StatusCode::NOT_FOUND,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
    }

    let body = match self {
      AppError::Domain(VitrineError::InsufficientStock {
        product_id, available, ..
      }) => json!({"error": self.to_string(), "productId": product_id, "available": available}),
      AppError::Domain(VitrineError::OutOfStock { product_id, .. }) => {
        json!({"error": self.to_string(), "productId": product_id})
      }
      // Retries were exhausted; the client may try again.
      AppError::Domain(VitrineError::Conflict(_)) => {
        json!({"error": "The store is busy right now. Please try submitting again."})
      }
      AppError::Domain(VitrineError::Backend { .. }) | AppError::Sqlx(_) => {
        json!({"error": "Database operation failed"})
      }
      AppError::Config(m) => json!({"error": "Configuration issue", "detail": m}),
      AppError::Internal(m) => json!({"error": "An internal error occurred", "detail": m}),
      other => json!({"error": other.to_string()}),
    };
    HttpResponse::build(status).json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::to_bytes;

  #[test]
  fn domain_errors_map_to_http_statuses() {
    let cases = [
      (VitrineError::EmptyCart, StatusCode::BAD_REQUEST),
      (VitrineError::not_found("product", "p1"), StatusCode::NOT_FOUND),
      (VitrineError::IncorrectPassword, StatusCode::UNAUTHORIZED),
      (VitrineError::NotAdmin, StatusCode::FORBIDDEN),
      (VitrineError::Conflict("busy".to_string()), StatusCode::CONFLICT),
      (VitrineError::ImageHost("down".to_string()), StatusCode::BAD_GATEWAY),
    ];
    for (err, status) in cases {
      assert_eq!(AppError::from(err).status_code(), status);
    }
  }

  #[actix_web::test]
  async fn insufficient_stock_body_names_the_product() {
    let err = AppError::from(VitrineError::InsufficientStock {
      product_id: "ring".to_string(),
      product_name: "Silver Ring".to_string(),
      available: 1,
    });
    let resp = err.error_response();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let bytes = to_bytes(resp.into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Not enough stock for Silver Ring. Only 1 left.");
    assert_eq!(body["available"], 1);
  }
}
