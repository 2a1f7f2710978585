//! Authenticated HTTP transport.
//!
//! Every outbound call goes through [`AuthenticatedTransport`]. The bearer
//! token travels under `X-Authorization` because the deployment's proxy strips
//! the standard `Authorization` header; the origin reads the alternate one.
//! Keep the header name and the `Bearer ` prefix exactly as they are.

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use tenantdesk_auth::SessionContext;

use crate::config::ClientConfig;

pub const AUTH_HEADER: &str = "X-Authorization";
pub const TENANT_PARAM: &str = "tenant_id";

#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered `401`; the session has been torn down.
    #[error("session expired; please log in again")]
    SessionExpired,

    #[error("no acting tenant for a tenant-scoped request")]
    NoActingTenant,

    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({0}): {1}")]
    Api(u16, String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Per-call request options. Cloned before the token is added, so callers can
/// reuse one value across requests.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            query: Vec::new(),
            json: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            json: Some(body),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

pub struct AuthenticatedTransport {
    http: reqwest::Client,
    session: Arc<SessionContext>,
}

impl AuthenticatedTransport {
    pub fn new(session: Arc<SessionContext>, config: &ClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self::with_client(http, session))
    }

    pub fn with_client(http: reqwest::Client, session: Arc<SessionContext>) -> Self {
        Self { http, session }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send a request, authenticated when a token is present.
    ///
    /// Without a token the request goes out unauthenticated (some endpoints
    /// are public). A `401` yields [`TransportError::SessionExpired`] and, if a
    /// token was sent, tears the session down. There is no retry and no refresh.
    pub async fn request(&self, url: &str, options: &RequestOptions) -> Result<Response, TransportError> {
        let options = options.clone();

        let mut req = self.http.request(options.method.clone(), url);
        for (key, value) in &options.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !options.query.is_empty() {
            req = req.query(&options.query);
        }
        if let Some(body) = &options.json {
            req = req.json(body);
        }
        let token = self.session.bearer_token();
        if let Some(token) = &token {
            req = req.header(AUTH_HEADER, format!("Bearer {token}"));
        }

        let resp = req.send().await.map_err(|e| TransportError::Network(e.to_string()))?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            // Only a rejected token ends a session; an anonymous 401 has none to end.
            if token.is_some() {
                tracing::warn!(%url, "request rejected with 401; ending session");
                self.session.expire();
            } else {
                tracing::debug!(%url, "anonymous request rejected with 401");
            }
            return Err(TransportError::SessionExpired);
        }

        Ok(resp)
    }

    /// Send a request scoped to the acting tenant.
    ///
    /// The tenant comes from the resolved identity (the viewed tenant while
    /// impersonating), never from the token's own claim.
    pub async fn tenant_scoped(&self, url: &str, options: &RequestOptions) -> Result<Response, TransportError> {
        let identity = self.session.resolve();
        let tenant_id = identity.acting_tenant_id.ok_or(TransportError::NoActingTenant)?;
        let options = options.clone().query(TENANT_PARAM, tenant_id);
        self.request(url, &options).await
    }

    /// `request` + status check + JSON decode.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<T, TransportError> {
        let resp = self.request(url, options).await?;
        read_json(resp).await
    }

    /// `tenant_scoped` + status check + JSON decode.
    pub async fn fetch_tenant_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<T, TransportError> {
        let resp = self.tenant_scoped(url, options).await?;
        read_json(resp).await
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, TransportError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(TransportError::Api(status.as_u16(), resp.text().await.unwrap_or_default()));
    }
    resp.json().await.map_err(|e| TransportError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_builder_friendly() {
        let opts = RequestOptions::post_json(serde_json::json!({"a": 1}))
            .query("action", "toggle")
            .header("X-Trace", "1");

        assert_eq!(opts.method, Method::POST);
        assert_eq!(opts.query, vec![("action".to_string(), "toggle".to_string())]);
        assert_eq!(opts.headers, vec![("X-Trace".to_string(), "1".to_string())]);
        assert_eq!(RequestOptions::get().method, Method::GET);
    }

    #[test]
    fn header_name_is_not_the_standard_one() {
        assert_eq!(AUTH_HEADER, "X-Authorization");
        assert_ne!(AUTH_HEADER.to_ascii_lowercase(), "authorization");
    }
}
