//! Tariff reference data from the backend.

use thiserror::Error;

use tenantdesk_tariffs::{TariffError, TariffTable};

use crate::transport::{AuthenticatedTransport, RequestOptions, TransportError};

#[derive(Debug, Error)]
pub enum TariffFetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Tariff(#[from] TariffError),
}

/// Load the tariff table published at `url`.
pub async fn fetch_tariff_table(
    transport: &AuthenticatedTransport,
    url: &str,
) -> Result<TariffTable, TariffFetchError> {
    let resp = transport.request(url, &RequestOptions::get()).await?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;
    if !status.is_success() {
        return Err(TransportError::Api(status.as_u16(), body).into());
    }

    let table = TariffTable::from_json(&body)?;
    tracing::info!(tariffs = table.len(), "tariff reference data loaded");
    Ok(table)
}
