//! Login against the backend auth endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tenantdesk_auth::{EffectiveIdentity, SessionError};

use crate::transport::{AuthenticatedTransport, TransportError, read_json};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Only `token` is consumed; the other fields are the server's convenience
/// copy of the claims.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("login returned an unusable token: {0}")]
    Session(#[from] SessionError),
}

pub struct LoginClient<'a> {
    transport: &'a AuthenticatedTransport,
    url: String,
}

impl<'a> LoginClient<'a> {
    pub fn new(transport: &'a AuthenticatedTransport, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }

    /// Exchange credentials for a token and start the session.
    ///
    /// Goes out unauthenticated: a `401` here means bad credentials, not an
    /// expired session, so it must not tear anything down.
    pub async fn login(&self, credentials: &Credentials) -> Result<EffectiveIdentity, LoginError> {
        let resp = self
            .transport
            .http()
            .post(&self.url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            tracing::info!(username = %credentials.username, "login rejected");
            return Err(LoginError::InvalidCredentials);
        }

        let body: LoginResponse = read_json(resp).await?;
        let identity = self.transport.session().login(&body.token)?;
        Ok(identity)
    }

    /// End the session locally. There is no server-side logout call.
    pub fn logout(&self) {
        self.transport.session().logout();
    }
}
