//! Entitlement checks over the tariff table.
//!
//! All answers fail closed: a missing tariff, an unknown tariff id, an
//! unknown feature key or an unknown limit key resolve to "denied" / zero.
//! Nothing here returns an error or panics, so views can call it anywhere.

use serde::Serialize;

use tenantdesk_auth::{EffectiveIdentity, Role};
use tenantdesk_core::TariffId;

use crate::keys::{FeatureKey, LimitKey};
use crate::tariff::{TariffDefinition, TariffTable, UNLIMITED};

/// Remaining capacity under a tariff limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quota {
    Unlimited,
    Remaining(u64),
}

impl Quota {
    pub fn allows_one_more(&self) -> bool {
        match self {
            Quota::Unlimited => true,
            Quota::Remaining(n) => *n > 0,
        }
    }
}

/// Why a feature check was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthenticated,
    NoTariff,
    UnknownTariff,
    UnknownFeature,
    FeatureDisabled,
}

/// Auditable outcome of a feature check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementDecision {
    pub feature: String,
    pub tariff_id: Option<TariffId>,
    pub role: Option<Role>,
    pub granted: bool,
    pub reason: String,
    pub denial: Option<DenialKind>,
}

enum Grant {
    SuperAdminBypass,
    TariffFlag,
}

#[derive(Debug, Clone, Default)]
pub struct EntitlementEngine {
    table: TariffTable,
}

impl EntitlementEngine {
    pub fn new(table: TariffTable) -> Self {
        Self { table }
    }

    /// Engine over the stock plans.
    pub fn builtin() -> Self {
        Self::new(TariffTable::builtin())
    }

    pub fn table(&self) -> &TariffTable {
        &self.table
    }

    /// Swap in freshly fetched reference data.
    pub fn replace_table(&mut self, table: TariffTable) {
        self.table = table;
    }

    /// Whether `role` may use `feature` under `tariff_id`.
    ///
    /// A super-admin always passes, including while viewing a tenant whose
    /// own tariff lacks the feature.
    pub fn has_feature(&self, tariff_id: Option<&TariffId>, feature: &FeatureKey, role: Role) -> bool {
        self.decide(tariff_id, feature, Some(role)).is_ok()
    }

    pub fn remaining_quota(
        &self,
        tariff_id: Option<&TariffId>,
        limit: &LimitKey,
        current_count: u64,
    ) -> Quota {
        let Some(def) = self.lookup(tariff_id) else {
            return Quota::Remaining(0);
        };

        match def.limit(limit) {
            Some(UNLIMITED) => Quota::Unlimited,
            Some(max) if max >= 0 => Quota::Remaining((max as u64).saturating_sub(current_count)),
            Some(max) => {
                tracing::warn!(tariff_id = %def.id, limit = %limit, value = max, "malformed limit; treating as zero");
                Quota::Remaining(0)
            }
            None => {
                tracing::warn!(tariff_id = %def.id, limit = %limit, "unknown limit key; denying");
                Quota::Remaining(0)
            }
        }
    }

    pub fn can_consume_one_more(
        &self,
        tariff_id: Option<&TariffId>,
        limit: &LimitKey,
        current_count: u64,
    ) -> bool {
        self.remaining_quota(tariff_id, limit, current_count).allows_one_more()
    }

    /// Feature check for a resolved identity. Unauthenticated is denied.
    pub fn has_feature_for(&self, identity: &EffectiveIdentity, feature: &FeatureKey) -> bool {
        self.decide(identity.acting_tariff_id.as_ref(), feature, identity.role).is_ok()
    }

    /// Quota check for a resolved identity.
    ///
    /// Platform staff are not held to the viewed tenant's quota.
    pub fn can_consume_for(&self, identity: &EffectiveIdentity, limit: &LimitKey, current_count: u64) -> bool {
        match identity.role {
            None => false,
            Some(Role::SuperAdmin) => true,
            Some(Role::TenantAdmin) => {
                self.can_consume_one_more(identity.acting_tariff_id.as_ref(), limit, current_count)
            }
        }
    }

    /// Whether `role` may enter other tenants' consoles.
    pub fn can_enter_tenant(role: Role) -> bool {
        role.is_super_admin()
    }

    /// Explain a feature decision (for diagnostics panels and logs).
    pub fn explain(
        &self,
        tariff_id: Option<&TariffId>,
        feature: &FeatureKey,
        role: Option<Role>,
    ) -> EntitlementDecision {
        let outcome = self.decide(tariff_id, feature, role);
        let tariff = tariff_id.map(|t| t.as_str()).unwrap_or("<none>");

        let (granted, reason, denial) = match outcome {
            Ok(Grant::SuperAdminBypass) => (
                true,
                "super admin passes every feature check".to_string(),
                None,
            ),
            Ok(Grant::TariffFlag) => (
                true,
                format!("tariff '{tariff}' enables '{feature}'"),
                None,
            ),
            Err(kind) => {
                let reason = match kind {
                    DenialKind::Unauthenticated => "no authenticated session".to_string(),
                    DenialKind::NoTariff => "tenant has no tariff assigned".to_string(),
                    DenialKind::UnknownTariff => format!("tariff '{tariff}' is not defined"),
                    DenialKind::UnknownFeature => {
                        format!("tariff '{tariff}' does not define '{feature}'")
                    }
                    DenialKind::FeatureDisabled => {
                        format!("tariff '{tariff}' does not include '{feature}'")
                    }
                };
                (false, reason, Some(kind))
            }
        };

        EntitlementDecision {
            feature: feature.to_string(),
            tariff_id: tariff_id.cloned(),
            role,
            granted,
            reason,
            denial,
        }
    }

    fn decide(
        &self,
        tariff_id: Option<&TariffId>,
        feature: &FeatureKey,
        role: Option<Role>,
    ) -> Result<Grant, DenialKind> {
        let role = role.ok_or(DenialKind::Unauthenticated)?;
        if role.is_super_admin() {
            return Ok(Grant::SuperAdminBypass);
        }

        let tariff_id = tariff_id.ok_or(DenialKind::NoTariff)?;
        let def = self.table.get(tariff_id).ok_or_else(|| {
            tracing::warn!(tariff_id = %tariff_id, feature = %feature, "unknown tariff; denying");
            DenialKind::UnknownTariff
        })?;

        match def.feature(feature) {
            Some(true) => Ok(Grant::TariffFlag),
            Some(false) => Err(DenialKind::FeatureDisabled),
            None => {
                tracing::warn!(tariff_id = %tariff_id, feature = %feature, "unknown feature key; denying");
                Err(DenialKind::UnknownFeature)
            }
        }
    }

    fn lookup(&self, tariff_id: Option<&TariffId>) -> Option<&TariffDefinition> {
        let tariff_id = tariff_id?;
        let def = self.table.get(tariff_id);
        if def.is_none() {
            tracing::warn!(tariff_id = %tariff_id, "unknown tariff; quota is zero");
        }
        def
    }
}
