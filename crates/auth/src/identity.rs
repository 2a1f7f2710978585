//! Effective identity: who is acting, for which tenant, on which tariff.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tenantdesk_core::{TariffId, TenantId};

use crate::claims::SessionClaims;
use crate::impersonation::ImpersonationContext;
use crate::token_store::TokenStore;
use crate::{Principal, Role};

/// Derived identity for the current render. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveIdentity {
    pub acting_tenant_id: Option<TenantId>,
    pub acting_tariff_id: Option<TariffId>,
    pub role: Option<Role>,
    pub is_impersonating: bool,
    /// The authenticated human; `None` when unauthenticated.
    pub principal: Option<Principal>,
}

/// Session lifecycle state as seen from the resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Impersonating,
}

impl EffectiveIdentity {
    pub fn unauthenticated() -> Self {
        Self {
            acting_tenant_id: None,
            acting_tariff_id: None,
            role: None,
            is_impersonating: false,
            principal: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.role.is_some()
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.is_some_and(|r| r.is_super_admin())
    }

    pub fn state(&self) -> SessionState {
        match (self.role, self.is_impersonating) {
            (None, _) => SessionState::Anonymous,
            (Some(_), false) => SessionState::Authenticated,
            (Some(_), true) => SessionState::Impersonating,
        }
    }
}

/// Pure derivation rule from token claims and impersonation context.
///
/// An impersonation context is honoured only for a super-admin token; for any
/// other role it is ignored, which tolerates stale or forged session storage.
pub fn derive_identity(
    claims: Option<&SessionClaims>,
    impersonation: Option<&ImpersonationContext>,
) -> EffectiveIdentity {
    let Some(claims) = claims else {
        return EffectiveIdentity::unauthenticated();
    };

    let principal = Some(claims.principal());

    match impersonation {
        Some(ctx) if ctx.active && claims.role.is_super_admin() => EffectiveIdentity {
            acting_tenant_id: Some(ctx.viewed_tenant_id),
            acting_tariff_id: ctx.viewed_tariff_id.clone(),
            role: Some(claims.role),
            is_impersonating: true,
            principal,
        },
        other => {
            if other.is_some_and(|ctx| ctx.active) {
                tracing::warn!(
                    user_id = %claims.user_id,
                    role = %claims.role,
                    "ignoring impersonation context for non super-admin"
                );
            }
            EffectiveIdentity {
                acting_tenant_id: claims.tenant_id,
                acting_tariff_id: claims.tariff_id.clone(),
                role: Some(claims.role),
                is_impersonating: false,
                principal,
            }
        }
    }
}

/// Reads both stores on every call; nothing is cached between calls.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: TokenStore,
}

impl IdentityResolver {
    pub fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }

    pub fn resolve(&self) -> EffectiveIdentity {
        self.resolve_at(Utc::now())
    }

    pub fn resolve_at(&self, now: DateTime<Utc>) -> EffectiveIdentity {
        let token = self.tokens.current_at(now);
        let impersonation = self.tokens.impersonation().get();
        derive_identity(token.as_ref().map(|t| t.claims()), impersonation.as_ref())
    }
}
