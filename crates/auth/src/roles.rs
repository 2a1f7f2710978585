use core::str::FromStr;

use serde::{Deserialize, Serialize};

use tenantdesk_core::DomainError;

/// Role carried by a session token.
///
/// The set is closed: a token naming any other role fails to decode and is
/// treated as absent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrator of a single tenant's chatbot console.
    TenantAdmin,
    /// Platform staff; may enter any tenant's console.
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::TenantAdmin => "tenant_admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tenant_admin" => Ok(Role::TenantAdmin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}
