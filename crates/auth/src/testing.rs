//! Token fixtures for unit tests.

use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;

use tenantdesk_core::{TariffId, TenantId, UserId};

use crate::{Role, SessionClaims};

pub const TEST_SECRET: &str = "test-secret";

/// Claims valid for the next ten minutes, truncated to whole seconds.
pub fn claims_for(role: Role, tenant_id: Option<TenantId>, tariff_id: Option<&str>) -> SessionClaims {
    let now = Utc.timestamp_opt(Utc::now().timestamp(), 0).unwrap();
    SessionClaims {
        user_id: UserId::new(7),
        username: Some("admin".to_string()),
        role,
        tenant_id,
        tariff_id: tariff_id.map(TariffId::from),
        issued_at: now,
        expires_at: now + Duration::minutes(10),
    }
}

pub fn mint(claims: &SessionClaims) -> String {
    mint_raw(claims)
}

pub fn mint_raw<T: Serialize>(payload: &T) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        payload,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}
