//! `tenantdesk-core` — shared identifiers and the domain error model.
//!
//! This crate has no IO and no knowledge of tokens, storage or HTTP.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{TariffId, TenantId, UserId};
