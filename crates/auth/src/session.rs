//! Injectable session context.
//!
//! A [`SessionContext`] bundles the token store, the impersonation store and
//! the identity resolver behind one handle that views receive explicitly.
//! Tests build isolated contexts over in-memory storage.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;

use tenantdesk_core::{TariffId, TenantId};

use crate::decode::{ClaimsDecoder, UnverifiedDecoder};
use crate::identity::{EffectiveIdentity, IdentityResolver, SessionState};
use crate::impersonation::ImpersonationStore;
use crate::storage::{InMemoryStorage, KeyValueStorage};
use crate::token_store::TokenStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("token rejected: not a valid session token")]
    InvalidToken,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("only a super admin may enter another tenant's console")]
    NotSuperAdmin,
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
    /// The session ended without the user asking: expiry or a `401`.
    /// Views redirect to login on this event.
    Expired,
    ImpersonationStarted { tenant_id: TenantId },
    ImpersonationEnded { return_tab: Option<String> },
}

/// Best-effort fan-out of session events to subscribers.
#[derive(Debug, Default)]
struct SessionEvents {
    subscribers: Mutex<Vec<Sender<SessionEvent>>>,
}

impl SessionEvents {
    fn publish(&self, event: SessionEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            // Drop any dead subscribers while publishing.
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }
}

pub struct SessionContext {
    tokens: TokenStore,
    resolver: IdentityResolver,
    events: SessionEvents,
}

impl SessionContext {
    /// `local` must be durable storage; `session` must end with the browser
    /// session (impersonation must not survive a restart).
    pub fn new(
        local: Arc<dyn KeyValueStorage>,
        session: Arc<dyn KeyValueStorage>,
        decoder: Arc<dyn ClaimsDecoder>,
    ) -> Self {
        let impersonation = ImpersonationStore::new(session);
        let tokens = TokenStore::new(local, decoder, impersonation);
        Self {
            resolver: IdentityResolver::new(tokens.clone()),
            tokens,
            events: SessionEvents::default(),
        }
    }

    /// Isolated context over in-memory storage.
    pub fn in_memory() -> Self {
        Self::new(
            InMemoryStorage::shared(),
            InMemoryStorage::shared(),
            Arc::new(UnverifiedDecoder::new()),
        )
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn impersonation(&self) -> &ImpersonationStore {
        self.tokens.impersonation()
    }

    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Effective identity right now.
    ///
    /// Detecting an unusable stored token here tears the session down and
    /// publishes [`SessionEvent::Expired`].
    pub fn resolve(&self) -> EffectiveIdentity {
        let had_token = self.tokens.has_raw();
        let identity = self.resolver.resolve();
        if had_token && !identity.is_authenticated() {
            self.events.publish(SessionEvent::Expired);
        }
        identity
    }

    /// Raw bearer string for outbound requests, read straight from the token
    /// store (never the impersonated tenant).
    pub fn bearer_token(&self) -> Option<String> {
        let had_token = self.tokens.has_raw();
        let token = self.tokens.current();
        if had_token && token.is_none() {
            self.events.publish(SessionEvent::Expired);
        }
        token.map(|t| t.raw().to_string())
    }

    pub fn state(&self) -> SessionState {
        self.resolve().state()
    }

    /// Store a freshly issued token. An unusable token leaves the session
    /// anonymous.
    pub fn login(&self, token: &str) -> Result<EffectiveIdentity, SessionError> {
        self.tokens.save(token);
        let identity = self.resolver.resolve();
        if !identity.is_authenticated() {
            return Err(SessionError::InvalidToken);
        }

        tracing::info!(
            user_id = ?identity.principal.as_ref().map(|p| p.user_id),
            role = ?identity.role,
            tenant_id = ?identity.acting_tenant_id,
            "session started"
        );
        self.events.publish(SessionEvent::LoggedIn);
        Ok(identity)
    }

    pub fn logout(&self) {
        self.tokens.clear();
        tracing::info!("session ended by logout");
        self.events.publish(SessionEvent::LoggedOut);
    }

    /// Tear the session down after the server rejected the token.
    pub fn expire(&self) {
        self.tokens.clear();
        tracing::warn!("session expired; credentials cleared");
        self.events.publish(SessionEvent::Expired);
    }

    /// Enter `tenant_id`'s admin console as the current super-admin.
    ///
    /// Navigation to the tenant console is the caller's job.
    pub fn enter_tenant(
        &self,
        tenant_id: TenantId,
        tariff_id: Option<TariffId>,
    ) -> Result<EffectiveIdentity, SessionError> {
        let identity = self.resolve();
        if !identity.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }
        if !identity.is_super_admin() {
            tracing::warn!(role = ?identity.role, tenant_id = %tenant_id, "refusing impersonation");
            return Err(SessionError::NotSuperAdmin);
        }

        self.impersonation().enter(tenant_id, tariff_id);
        tracing::info!(tenant_id = %tenant_id, "entered tenant console");
        self.events.publish(SessionEvent::ImpersonationStarted { tenant_id });
        Ok(self.resolver.resolve())
    }

    /// Leave the tenant console. Returns the super-admin tab to reopen.
    pub fn exit_tenant(&self) -> Option<String> {
        let was_active = self.impersonation().is_active();
        let return_tab = self.impersonation().exit();
        if was_active {
            tracing::info!("left tenant console");
            self.events.publish(SessionEvent::ImpersonationEnded {
                return_tab: return_tab.clone(),
            });
        }
        return_tab
    }
}
