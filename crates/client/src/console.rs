//! Admin console header view-model.

use serde::Serialize;

use tenantdesk_auth::EffectiveIdentity;
use tenantdesk_core::TenantId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleMode {
    TenantAdmin,
    SuperAdmin,
    /// A super-admin inside another tenant's console.
    SuperAdminViewing,
}

impl ConsoleMode {
    pub fn title(&self) -> &'static str {
        match self {
            ConsoleMode::TenantAdmin => "Admin console",
            ConsoleMode::SuperAdmin => "Super admin mode",
            ConsoleMode::SuperAdminViewing => "Viewing tenant (super admin)",
        }
    }
}

/// What the console header shows for the current identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleHeader {
    pub mode: ConsoleMode,
    pub username: String,
    pub tenant_id: Option<TenantId>,
    pub tariff_label: String,
    /// Whether the "back to super admin" action is offered.
    pub show_exit_tenant_view: bool,
}

impl ConsoleHeader {
    /// `None` for an unauthenticated identity (no header is rendered).
    pub fn from_identity(identity: &EffectiveIdentity) -> Option<Self> {
        let principal = identity.principal.as_ref()?;

        let mode = match (identity.is_super_admin(), identity.is_impersonating) {
            (false, _) => ConsoleMode::TenantAdmin,
            (true, false) => ConsoleMode::SuperAdmin,
            (true, true) => ConsoleMode::SuperAdminViewing,
        };

        Some(Self {
            mode,
            username: principal.display_name(),
            tenant_id: identity.acting_tenant_id,
            tariff_label: identity
                .acting_tariff_id
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "not set".to_string()),
            show_exit_tenant_view: mode == ConsoleMode::SuperAdminViewing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantdesk_auth::{Principal, Role};
    use tenantdesk_core::{TariffId, UserId};

    fn identity(role: Role, tenant: Option<i64>, tariff: Option<&str>, viewing: bool) -> EffectiveIdentity {
        EffectiveIdentity {
            acting_tenant_id: tenant.map(TenantId::new),
            acting_tariff_id: tariff.map(TariffId::from),
            role: Some(role),
            is_impersonating: viewing,
            principal: Some(Principal {
                user_id: UserId::new(3),
                username: Some("maria".into()),
                role,
            }),
        }
    }

    #[test]
    fn unauthenticated_renders_nothing() {
        assert_eq!(ConsoleHeader::from_identity(&EffectiveIdentity::unauthenticated()), None);
    }

    #[test]
    fn modes() {
        let h = ConsoleHeader::from_identity(&identity(Role::TenantAdmin, Some(5), Some("basic"), false)).unwrap();
        assert_eq!(h.mode, ConsoleMode::TenantAdmin);
        assert_eq!(h.tariff_label, "basic");
        assert!(!h.show_exit_tenant_view);

        let h = ConsoleHeader::from_identity(&identity(Role::SuperAdmin, None, None, false)).unwrap();
        assert_eq!(h.mode, ConsoleMode::SuperAdmin);
        assert_eq!(h.tariff_label, "not set");
        assert!(!h.show_exit_tenant_view);

        let h = ConsoleHeader::from_identity(&identity(Role::SuperAdmin, Some(42), Some("premium"), true)).unwrap();
        assert_eq!(h.mode, ConsoleMode::SuperAdminViewing);
        assert_eq!(h.tenant_id, Some(TenantId::new(42)));
        assert_eq!(h.username, "maria");
        assert!(h.show_exit_tenant_view);
    }
}
