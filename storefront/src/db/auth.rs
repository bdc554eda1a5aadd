// storefront/src/db/auth.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use vitrine::credentials::{hash_password, verify_password};
use vitrine::{normalize_email, AuthProvider, AuthUser, VitrineError, VitrineResult};

use super::map_sqlx_error;

const UNIQUE_VIOLATION: &str = "23505";

/// Accounts stored next to the storefront data, passwords hashed with
/// Argon2.
#[derive(Debug, Clone)]
pub struct PgAuthProvider {
  pool: PgPool,
}

impl PgAuthProvider {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl AuthProvider for PgAuthProvider {
  #[instrument(name = "PgAuthProvider::create_account", skip(self, password), err(Display))]
  async fn create_account(&self, email: &str, password: &str, display_name: Option<&str>) -> VitrineResult<AuthUser> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
      return Err(VitrineError::Validation("A valid email is required.".to_string()));
    }
    let password_hash = hash_password(password)?;
    let user = AuthUser {
      uid: Uuid::new_v4().simple().to_string(),
      email: Some(email.clone()),
      display_name: display_name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
    };

    let inserted = sqlx::query(
      "INSERT INTO accounts (uid, email, display_name, password_hash, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&user.uid)
    .bind(&email)
    .bind(&user.display_name)
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(&self.pool)
    .await;

    match inserted {
      Ok(_) => {
        debug!(uid = %user.uid, "Account created.");
        Ok(user)
      }
      Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
        Err(VitrineError::EmailInUse(email))
      }
      Err(e) => Err(map_sqlx_error(e)),
    }
  }

  #[instrument(name = "PgAuthProvider::sign_in", skip(self, password), err(Display))]
  async fn sign_in(&self, email: &str, password: &str) -> VitrineResult<AuthUser> {
    let email = normalize_email(email);
    let row = sqlx::query("SELECT uid, email, display_name, password_hash FROM accounts WHERE email = $1")
      .bind(&email)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx_error)?
      .ok_or(VitrineError::InvalidCredentials)?;

    let user = AuthUser {
      uid: row.try_get("uid").map_err(map_sqlx_error)?,
      email: row.try_get("email").map_err(map_sqlx_error)?,
      display_name: row.try_get("display_name").map_err(map_sqlx_error)?,
    };
    let hash: String = row.try_get("password_hash").map_err(map_sqlx_error)?;
    if verify_password(&hash, password)? {
      Ok(user)
    } else {
      warn!(uid = %user.uid, "Password mismatch on sign-in.");
      Err(VitrineError::InvalidCredentials)
    }
  }

  #[instrument(name = "PgAuthProvider::reauthenticate", skip(self, password), err(Display))]
  async fn reauthenticate(&self, uid: &str, password: &str) -> VitrineResult<()> {
    let hash: String = sqlx::query_scalar("SELECT password_hash FROM accounts WHERE uid = $1")
      .bind(uid)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx_error)?
      .ok_or(VitrineError::Unauthenticated)?;
    if verify_password(&hash, password)? {
      Ok(())
    } else {
      Err(VitrineError::IncorrectPassword)
    }
  }

  #[instrument(name = "PgAuthProvider::delete_account", skip(self), err(Display))]
  async fn delete_account(&self, uid: &str) -> VitrineResult<()> {
    let result = sqlx::query("DELETE FROM accounts WHERE uid = $1")
      .bind(uid)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx_error)?;
    if result.rows_affected() == 0 {
      return Err(VitrineError::not_found("account", uid));
    }
    Ok(())
  }
}
