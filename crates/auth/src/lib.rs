//! `tenantdesk-auth`: session, token and impersonation boundary.
//!
//! This crate is decoupled from HTTP: it decides who is acting, for which
//! tenant, and keeps that state in injectable storage.

pub mod claims;
pub mod decode;
pub mod identity;
pub mod impersonation;
pub mod principal;
pub mod roles;
pub mod session;
pub mod storage;
pub mod token_store;

#[cfg(test)]
mod testing;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use decode::{ClaimsDecoder, Decoded, Hs256Decoder, InvalidToken, UnverifiedDecoder};
pub use identity::{EffectiveIdentity, IdentityResolver, SessionState, derive_identity};
pub use impersonation::{ImpersonationContext, ImpersonationStore};
pub use principal::Principal;
pub use roles::Role;
pub use session::{SessionContext, SessionError, SessionEvent};
pub use storage::{InMemoryStorage, KeyValueStorage};
pub use token_store::{SessionToken, TokenStore};
