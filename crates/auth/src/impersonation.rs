//! Super-admin "view as tenant" state.
//!
//! The context lives in session-scoped storage only, so it never survives the
//! end of a browser session. The store records state and nothing else:
//! navigation and the role precondition belong to the caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tenantdesk_core::{TariffId, TenantId};

use crate::storage::KeyValueStorage;

pub const VIEWING_FLAG_KEY: &str = "superadmin_viewing_tenant";
pub const VIEWING_TENANT_KEY: &str = "superadmin_viewing_tenant_id";
pub const VIEWING_TARIFF_KEY: &str = "superadmin_viewing_tariff_id";
pub const RETURN_TAB_KEY: &str = "superadmin_active_tab";

const ALL_KEYS: [&str; 4] = [
    VIEWING_FLAG_KEY,
    VIEWING_TENANT_KEY,
    VIEWING_TARIFF_KEY,
    RETURN_TAB_KEY,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpersonationContext {
    pub active: bool,
    pub viewed_tenant_id: TenantId,
    pub viewed_tariff_id: Option<TariffId>,
}

#[derive(Clone)]
pub struct ImpersonationStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl ImpersonationStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Record that the acting super-admin is viewing `tenant_id`.
    ///
    /// The caller must have checked the role; readers re-check it anyway.
    pub fn enter(&self, tenant_id: TenantId, tariff_id: Option<TariffId>) {
        match &tariff_id {
            Some(tariff) => self.storage.set(VIEWING_TARIFF_KEY, tariff.as_str()),
            None => self.storage.remove(VIEWING_TARIFF_KEY),
        }
        self.storage.set(VIEWING_TENANT_KEY, &tenant_id.to_string());
        // Flag last: a half-written context reads as inactive.
        self.storage.set(VIEWING_FLAG_KEY, "true");

        tracing::debug!(tenant_id = %tenant_id, "impersonation context written");
    }

    /// Drop the context, returning the remembered super-admin tab if any.
    ///
    /// Idempotent: with no active context this only returns `None`.
    pub fn exit(&self) -> Option<String> {
        let tab = self.return_tab();
        self.storage.remove_many(&ALL_KEYS);
        tab
    }

    pub fn is_active(&self) -> bool {
        self.get().is_some()
    }

    /// Current context, or `None` when absent or unreadable.
    pub fn get(&self) -> Option<ImpersonationContext> {
        if self.storage.get(VIEWING_FLAG_KEY).as_deref() != Some("true") {
            return None;
        }

        let raw_tenant = self.storage.get(VIEWING_TENANT_KEY);
        let Some(viewed_tenant_id) = raw_tenant
            .as_deref()
            .and_then(|raw| raw.parse::<TenantId>().ok())
        else {
            tracing::warn!(value = ?raw_tenant, "impersonation flag set without a readable tenant id");
            return None;
        };

        let viewed_tariff_id = self
            .storage
            .get(VIEWING_TARIFF_KEY)
            .and_then(|raw| raw.parse::<TariffId>().ok());

        Some(ImpersonationContext {
            active: true,
            viewed_tenant_id,
            viewed_tariff_id,
        })
    }

    /// Remember which super-admin console tab to reopen after `exit`.
    pub fn remember_tab(&self, tab: &str) {
        self.storage.set(RETURN_TAB_KEY, tab);
    }

    pub fn return_tab(&self) -> Option<String> {
        self.storage.get(RETURN_TAB_KEY)
    }
}
