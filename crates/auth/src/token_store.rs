//! Durable bearer token storage.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::claims::SessionClaims;
use crate::decode::{ClaimsDecoder, Decoded};
use crate::impersonation::ImpersonationStore;
use crate::storage::KeyValueStorage;

pub const TOKEN_KEY: &str = "auth_token";

/// A raw bearer string together with its decoded claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    raw: String,
    claims: SessionClaims,
}

impl SessionToken {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }
}

/// Holds the current bearer token in local (durable) storage.
///
/// The store also owns the impersonation store handle, because clearing the
/// token must always clear the impersonation context with it.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
    decoder: Arc<dyn ClaimsDecoder>,
    impersonation: ImpersonationStore,
}

impl TokenStore {
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        decoder: Arc<dyn ClaimsDecoder>,
        impersonation: ImpersonationStore,
    ) -> Self {
        Self {
            storage,
            decoder,
            impersonation,
        }
    }

    pub fn impersonation(&self) -> &ImpersonationStore {
        &self.impersonation
    }

    /// Store a new token. Any impersonation context belonged to the previous
    /// token and is dropped first.
    pub fn save(&self, token: &str) {
        self.impersonation.exit();
        self.storage.set(TOKEN_KEY, token.trim());
    }

    /// Whether any token string is stored, valid or not.
    pub fn has_raw(&self) -> bool {
        self.storage.get(TOKEN_KEY).is_some()
    }

    pub fn current(&self) -> Option<SessionToken> {
        self.current_at(Utc::now())
    }

    /// Decoded token, or `None` if absent, malformed or expired.
    ///
    /// An unusable stored token is cleared (with the impersonation context)
    /// so every later read sees a consistent logged-out state.
    pub fn current_at(&self, now: DateTime<Utc>) -> Option<SessionToken> {
        let raw = self.storage.get(TOKEN_KEY)?;

        match self.decoder.decode(&raw, now) {
            Decoded::Valid(claims) => Some(SessionToken { raw, claims }),
            Decoded::Invalid(reason) => {
                tracing::warn!(%reason, "discarding unusable session token");
                self.clear();
                None
            }
        }
    }

    /// Remove the token and any impersonation context.
    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.impersonation.exit();
    }
}
