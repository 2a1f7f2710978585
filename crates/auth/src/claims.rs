use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tenantdesk_core::{TariffId, TenantId, UserId};

use crate::{Principal, Role};

/// Tolerated clock difference (seconds) between the issuing server and this client.
pub const CLOCK_SKEW_LEEWAY_SECS: i64 = 60;

/// Session token claims (the decoded JWT payload).
///
/// `tenant_id` is `None` only for a super-admin acting in the platform-wide
/// context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    pub role: Role,

    #[serde(default)]
    pub tenant_id: Option<TenantId>,

    #[serde(default)]
    pub tariff_id: Option<TariffId>,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of session claims.
///
/// Signature checks happen in the decoder; this only looks at `iat`/`exp`.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now + Duration::seconds(CLOCK_SKEW_LEEWAY_SECS) < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn claims_at(iat: i64, exp: i64) -> SessionClaims {
        SessionClaims {
            user_id: UserId::new(1),
            username: Some("ops".into()),
            role: Role::SuperAdmin,
            tenant_id: None,
            tariff_id: None,
            issued_at: Utc.timestamp_opt(iat, 0).unwrap(),
            expires_at: Utc.timestamp_opt(exp, 0).unwrap(),
        }
    }

    #[test]
    fn window_checks() {
        let claims = claims_at(1_000, 2_000);
        let at = |s| Utc.timestamp_opt(s, 0).unwrap();

        assert_eq!(validate_claims(&claims, at(1_500)), Ok(()));
        assert_eq!(validate_claims(&claims, at(2_000)), Err(TokenValidationError::Expired));
        assert_eq!(validate_claims(&claims, at(500)), Err(TokenValidationError::NotYetValid));
        // Within the skew leeway.
        assert_eq!(validate_claims(&claims, at(950)), Ok(()));
        assert_eq!(
            validate_claims(&claims_at(2_000, 2_000), at(2_000)),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn wire_format_uses_short_time_claims() {
        let json = serde_json::to_value(claims_at(10, 20)).unwrap();
        assert_eq!(json["iat"], 10);
        assert_eq!(json["exp"], 20);
        assert_eq!(json["role"], "super_admin");
        assert!(json["tenant_id"].is_null());
    }

    #[test]
    fn missing_optional_claims_default_to_none() {
        let claims: SessionClaims = serde_json::from_str(
            r#"{"user_id":5,"role":"tenant_admin","tenant_id":3,"iat":10,"exp":20}"#,
        )
        .unwrap();
        assert_eq!(claims.tenant_id, Some(TenantId::new(3)));
        assert_eq!(claims.tariff_id, None);
        assert_eq!(claims.username, None);
    }
}
