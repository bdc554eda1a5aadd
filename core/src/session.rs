// core/src/session.rs

use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::{VitrineError, VitrineResult};
use crate::model::{Role, UserRecord};

/// The signed-in customer or admin. Passed explicitly to every `Storefront`
/// operation; there is no ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
}

impl Session {
    pub fn new(auth_user: &AuthUser, record: Option<&UserRecord>) -> Self {
        Self {
            uid: auth_user.uid.clone(),
            email: auth_user.email.clone(),
            display_name: auth_user
                .display_name
                .clone()
                .or_else(|| record.and_then(|r| r.display_name.clone())),
            // A missing record reads as a client, same as a record without a role.
            role: record.map(|r| r.role).unwrap_or_default(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> VitrineResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(VitrineError::Forbidden("admin access required".to_string()))
        }
    }

    pub fn require_client(&self) -> VitrineResult<()> {
        if self.is_admin() {
            Err(VitrineError::Forbidden("admins cannot use the cart or submit requests".to_string()))
        } else {
            Ok(())
        }
    }
}
