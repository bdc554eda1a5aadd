// core/src/auth/mod.rs

//! The authentication provider is an external collaborator. `Storefront`
//! only needs to create accounts, check passwords and delete accounts.

mod memory;

pub use memory::MemoryAuthProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VitrineResult;

/// Identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Fails with `EmailInUse` when the email is taken.
    async fn create_account(&self, email: &str, password: &str, display_name: Option<&str>) -> VitrineResult<AuthUser>;

    /// Fails with `InvalidCredentials` on unknown email or wrong password.
    async fn sign_in(&self, email: &str, password: &str) -> VitrineResult<AuthUser>;

    /// Re-checks the password of an already signed-in account before a
    /// sensitive operation. Fails with `IncorrectPassword`.
    async fn reauthenticate(&self, uid: &str, password: &str) -> VitrineResult<()>;

    async fn delete_account(&self, uid: &str) -> VitrineResult<()>;
}

/// Emails compare case-insensitively and ignore surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
