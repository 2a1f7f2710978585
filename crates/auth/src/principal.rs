use serde::{Deserialize, Serialize};

use tenantdesk_core::UserId;

use crate::Role;

/// The authenticated human behind a session token.
///
/// The client only ever holds this snapshot as decoded from token claims; it
/// is immutable for the lifetime of the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: Option<String>,
    pub role: Role,
}

impl Principal {
    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }

    /// Name to show in console headers; falls back to the numeric id.
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("user #{}", self.user_id),
        }
    }
}
