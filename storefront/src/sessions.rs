// storefront/src/sessions.rs

//! Opaque bearer tokens mapped to signed-in `Session`s. Tokens live in
//! process memory only; a restart signs everyone out.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;
use vitrine::Session;

#[derive(Debug, Default)]
pub struct SessionRegistry {
  sessions: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores `session` under a fresh token and returns the token.
  pub fn issue(&self, session: Session) -> String {
    let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    debug!(uid = %session.uid, "Issued session token.");
    self.sessions.write().insert(token.clone(), session);
    token
  }

  pub fn get(&self, token: &str) -> Option<Session> {
    self.sessions.read().get(token).cloned()
  }

  pub fn revoke(&self, token: &str) -> bool {
    self.sessions.write().remove(token).is_some()
  }

  /// Drops every token belonging to `uid`. Returns how many were removed.
  pub fn revoke_user(&self, uid: &str) -> usize {
    let mut sessions = self.sessions.write();
    let before = sessions.len();
    sessions.retain(|_, s| s.uid != uid);
    before - sessions.len()
  }

  pub fn len(&self) -> usize {
    self.sessions.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use vitrine::Role;

  fn session(uid: &str) -> Session {
    Session {
      uid: uid.to_string(),
      email: Some(format!("{}@example.com", uid)),
      display_name: None,
      role: Role::Client,
    }
  }

  #[test]
  fn issued_tokens_resolve_until_revoked() {
    let registry = SessionRegistry::new();
    let token = registry.issue(session("ana"));
    assert_eq!(registry.get(&token).map(|s| s.uid), Some("ana".to_string()));
    assert!(registry.revoke(&token));
    assert!(registry.get(&token).is_none());
    assert!(!registry.revoke(&token));
  }

  #[test]
  fn revoke_user_drops_every_token_of_that_user() {
    let registry = SessionRegistry::new();
    registry.issue(session("ana"));
    registry.issue(session("ana"));
    let other = registry.issue(session("bo"));
    assert_eq!(registry.revoke_user("ana"), 2);
    assert_eq!(registry.len(), 1);
    assert!(registry.get(&other).is_some());
  }
}
