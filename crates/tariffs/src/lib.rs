//! `tenantdesk-tariffs`: tariff reference data and the entitlement engine.
//!
//! Every question a view asks about "may this tenant use X" or "how many more
//! Y" goes through [`EntitlementEngine`]; views never branch on roles
//! themselves.

pub mod entitlements;
pub mod keys;
pub mod tariff;

pub use entitlements::{DenialKind, EntitlementDecision, EntitlementEngine, Quota};
pub use keys::{FeatureKey, LimitKey};
pub use tariff::{TariffDefinition, TariffError, TariffTable, UNLIMITED};
