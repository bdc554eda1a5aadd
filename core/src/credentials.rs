// core/src/credentials.rs

//! Password hashing for the bundled `AuthProvider` implementations.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{debug, error, instrument};

use crate::error::{VitrineError, VitrineResult};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Hashes a plain-text password with Argon2 and a fresh random salt.
#[instrument(name = "credentials::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> VitrineResult<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VitrineError::Validation(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LEN
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(password.as_bytes(), &salt) {
        Ok(hash) => {
            debug!("Password hashed.");
            Ok(hash.to_string())
        }
        Err(argon_err) => {
            error!(error = %argon_err, "Argon2 password hashing failed.");
            Err(VitrineError::Backend {
                source: anyhow::anyhow!("password hashing failed: {}", argon_err),
            })
        }
    }
}

/// Checks `provided` against a stored Argon2 hash. A mismatch is `Ok(false)`;
/// only malformed hashes and internal failures are errors.
#[instrument(name = "credentials::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided: &str) -> VitrineResult<bool> {
    if provided.is_empty() {
        return Ok(false);
    }
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "Stored password hash is malformed.");
        VitrineError::Backend {
            source: anyhow::anyhow!("invalid stored password hash: {}", e),
        }
    })?;

    match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(other) => {
            error!(error = %other, "Argon2 password verification failed.");
            Err(VitrineError::Backend {
                source: anyhow::anyhow!("password verification failed: {}", other),
            })
        }
    }
}
