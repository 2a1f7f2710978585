//! Typed token decoding.
//!
//! Decoding never fails loudly: every outcome is a [`Decoded`] value and the
//! caller decides what an invalid token means (always "logged out" here).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// Why a stored token could not be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidToken {
    #[error("token is empty")]
    Empty,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Result of decoding a raw bearer string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Valid(SessionClaims),
    Invalid(InvalidToken),
}

impl Decoded {
    pub fn is_valid(&self) -> bool {
        matches!(self, Decoded::Valid(_))
    }

    pub fn valid(self) -> Option<SessionClaims> {
        match self {
            Decoded::Valid(claims) => Some(claims),
            Decoded::Invalid(_) => None,
        }
    }
}

/// Turns a raw bearer string into claims.
pub trait ClaimsDecoder: Send + Sync {
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Decoded;
}

/// Reads the claims without checking the signature.
///
/// The server stays the authority on every request; the client only needs the
/// claims to decide what to render.
pub struct UnverifiedDecoder {
    validation: Validation,
}

impl UnverifiedDecoder {
    pub fn new() -> Self {
        let mut validation = base_validation();
        validation.insecure_disable_signature_validation();
        Self { validation }
    }
}

impl Default for UnverifiedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimsDecoder for UnverifiedDecoder {
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Decoded {
        decode_with(token, &DecodingKey::from_secret(&[]), &self.validation, now)
    }
}

/// HS256 decoder that also verifies the signature with a shared secret.
pub struct Hs256Decoder {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256Decoder {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation: base_validation(),
        }
    }
}

impl ClaimsDecoder for Hs256Decoder {
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Decoded {
        decode_with(token, &self.key, &self.validation, now)
    }
}

// Time checks are done by `validate_claims` against an injectable `now`.
fn base_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation
}

fn decode_with(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
    now: DateTime<Utc>,
) -> Decoded {
    let token = token.trim();
    if token.is_empty() {
        return Decoded::Invalid(InvalidToken::Empty);
    }

    let claims = match jsonwebtoken::decode::<SessionClaims>(token, key, validation) {
        Ok(data) => data.claims,
        Err(e) => return Decoded::Invalid(InvalidToken::Malformed(e.to_string())),
    };

    match validate_claims(&claims, now) {
        Ok(()) => Decoded::Valid(claims),
        Err(e) => Decoded::Invalid(e.into()),
    }
}
