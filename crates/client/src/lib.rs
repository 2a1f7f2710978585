//! `tenantdesk-client`
//!
//! **Responsibility:** the I/O edge of the admin consoles.
//!
//! This crate provides:
//! - `AuthenticatedTransport`: every outbound call, with bearer injection and
//!   uniform `401` handling
//! - Durable file-backed local storage for the bearer token
//! - Environment-driven client configuration
//! - Login and tariff reference-data calls
//! - The admin console header view-model
//!
//! Remote endpoints remain the authority; nothing here caches remote data.

pub mod config;
pub mod console;
pub mod login;
pub mod storage;
pub mod tariffs;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use console::{ConsoleHeader, ConsoleMode};
pub use login::{Credentials, LoginClient, LoginError};
pub use storage::{FileStorage, StorageError};
pub use tariffs::{TariffFetchError, fetch_tariff_table};
pub use transport::{AUTH_HEADER, AuthenticatedTransport, RequestOptions, TransportError};
