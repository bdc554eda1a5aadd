// core/src/auth/memory.rs

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{normalize_email, AuthProvider, AuthUser};
use crate::credentials::{hash_password, verify_password};
use crate::error::{VitrineError, VitrineResult};

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password_hash: String,
}

/// Process-local accounts with Argon2-hashed passwords. Used by tests and by
/// the server when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    fn password_hash_for_email(&self, email: &str) -> Option<(AuthUser, String)> {
        let accounts = self.accounts.read();
        accounts
            .values()
            .find(|a| a.user.email.as_deref() == Some(email))
            .map(|a| (a.user.clone(), a.password_hash.clone()))
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    #[instrument(name = "MemoryAuthProvider::create_account", skip(self, password), err(Display))]
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> VitrineResult<AuthUser> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(VitrineError::Validation("A valid email is required.".to_string()));
        }
        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write();
        if accounts.values().any(|a| a.user.email.as_deref() == Some(email.as_str())) {
            return Err(VitrineError::EmailInUse(email));
        }
        let user = AuthUser {
            uid: Uuid::new_v4().simple().to_string(),
            email: Some(email),
            display_name: display_name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
        };
        accounts.insert(
            user.uid.clone(),
            Account {
                user: user.clone(),
                password_hash,
            },
        );
        debug!(uid = %user.uid, "Account created.");
        Ok(user)
    }

    #[instrument(name = "MemoryAuthProvider::sign_in", skip(self, password), err(Display))]
    async fn sign_in(&self, email: &str, password: &str) -> VitrineResult<AuthUser> {
        let email = normalize_email(email);
        let (user, hash) = self
            .password_hash_for_email(&email)
            .ok_or(VitrineError::InvalidCredentials)?;
        if verify_password(&hash, password)? {
            Ok(user)
        } else {
            warn!(uid = %user.uid, "Password mismatch on sign-in.");
            Err(VitrineError::InvalidCredentials)
        }
    }

    #[instrument(name = "MemoryAuthProvider::reauthenticate", skip(self, password), err(Display))]
    async fn reauthenticate(&self, uid: &str, password: &str) -> VitrineResult<()> {
        let hash = {
            let accounts = self.accounts.read();
            accounts
                .get(uid)
                .map(|a| a.password_hash.clone())
                .ok_or(VitrineError::Unauthenticated)?
        };
        if verify_password(&hash, password)? {
            Ok(())
        } else {
            Err(VitrineError::IncorrectPassword)
        }
    }

    #[instrument(name = "MemoryAuthProvider::delete_account", skip(self), err(Display))]
    async fn delete_account(&self, uid: &str) -> VitrineResult<()> {
        self
            .accounts
            .write()
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| VitrineError::not_found("account", uid))
    }
}
