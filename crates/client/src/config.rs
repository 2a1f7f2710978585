//! Client configuration from the environment.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use tenantdesk_auth::{ClaimsDecoder, Hs256Decoder, UnverifiedDecoder};

pub const ENV_API_URL: &str = "TENANTDESK_API_URL";
pub const ENV_LOGIN_URL: &str = "TENANTDESK_LOGIN_URL";
pub const ENV_TARIFFS_URL: &str = "TENANTDESK_TARIFFS_URL";
pub const ENV_STORAGE_DIR: &str = "TENANTDESK_STORAGE_DIR";
pub const ENV_JWT_SECRET: &str = "TENANTDESK_JWT_SECRET";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "TENANTDESK_HTTP_TIMEOUT_SECS";

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend functions.
    pub api_url: String,
    pub login_url: String,
    pub tariffs_url: String,
    /// Where durable local storage lives; `None` uses the platform data dir.
    pub storage_dir: Option<PathBuf>,
    /// When set, token signatures are verified (HS256).
    pub jwt_secret: Option<String>,
    pub http_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty(ENV_API_URL).unwrap_or_else(|| {
            tracing::warn!("{ENV_API_URL} not set; using dev default {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });
        let api_url = validate_url(ENV_API_URL, api_url.trim_end_matches('/').to_string())?;

        let login_url = match non_empty(ENV_LOGIN_URL) {
            Some(url) => validate_url(ENV_LOGIN_URL, url)?,
            None => format!("{api_url}/auth/login"),
        };
        let tariffs_url = match non_empty(ENV_TARIFFS_URL) {
            Some(url) => validate_url(ENV_TARIFFS_URL, url)?,
            None => format!("{api_url}/tariff-management"),
        };

        let http_timeout = match non_empty(ENV_HTTP_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    key: ENV_HTTP_TIMEOUT_SECS,
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url,
            login_url,
            tariffs_url,
            storage_dir: non_empty(ENV_STORAGE_DIR).map(PathBuf::from),
            jwt_secret: non_empty(ENV_JWT_SECRET),
            http_timeout,
        })
    }

    /// Token decoder matching this configuration.
    pub fn decoder(&self) -> Arc<dyn ClaimsDecoder> {
        match &self.jwt_secret {
            Some(secret) => Arc::new(Hs256Decoder::new(secret)),
            None => Arc::new(UnverifiedDecoder::new()),
        }
    }
}

fn validate_url(key: &'static str, value: String) -> Result<String, ConfigError> {
    match reqwest::Url::parse(&value) {
        Ok(_) => Ok(value),
        Err(e) => Err(ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_derive_from_api_url() {
        let cfg = ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "https://functions.example.com/")]))
            .unwrap();

        assert_eq!(cfg.api_url, "https://functions.example.com");
        assert_eq!(cfg.login_url, "https://functions.example.com/auth/login");
        assert_eq!(cfg.tariffs_url, "https://functions.example.com/tariff-management");
        assert_eq!(cfg.http_timeout, Duration::from_secs(30));
        assert_eq!(cfg.jwt_secret, None);
        assert_eq!(cfg.storage_dir, None);
    }

    #[test]
    fn missing_api_url_falls_back_to_dev_default() {
        let cfg = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn explicit_values_win() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "http://api.local"),
            (ENV_LOGIN_URL, "http://auth.local/login"),
            (ENV_HTTP_TIMEOUT_SECS, "5"),
            (ENV_JWT_SECRET, "s3cret"),
            (ENV_STORAGE_DIR, "/tmp/tenantdesk"),
        ]))
        .unwrap();

        assert_eq!(cfg.login_url, "http://auth.local/login");
        assert_eq!(cfg.http_timeout, Duration::from_secs(5));
        assert_eq!(cfg.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(cfg.storage_dir, Some(PathBuf::from("/tmp/tenantdesk")));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_HTTP_TIMEOUT_SECS, .. }));

        let err = ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_API_URL, .. }));
    }
}
