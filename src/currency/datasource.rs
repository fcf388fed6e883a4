use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::endpoint::{LiveCurrencyRateEndpoint, SupportedCurrenciesEndpoint};
use super::model::{ApiPayload, CurrencyErrorModel, LiveRatesModel, SupportedCurrencyModel};
use crate::networking::{
    CallError, DEFAULT_REQUEST_TIMEOUT, Decoded, Endpoint, EndpointError, EndpointResult, Network,
};

/// Why a currency fetch produced no data.
#[derive(Debug)]
pub enum CurrencyError {
    /// No base URL or access key configured. Nothing was sent.
    Config(String),
    /// Error status or transport failure.
    Endpoint(EndpointError),
    /// The call itself failed (bad request, unreadable error body).
    Call(CallError),
    /// The success body did not match the expected model.
    InvalidContent(serde_json::Error),
    /// The API accepted the request but reported an error in the payload.
    Api(CurrencyErrorModel),
}

impl fmt::Display for CurrencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyError::Config(msg) => write!(f, "config error: {msg}"),
            CurrencyError::Endpoint(e) => write!(f, "{e}"),
            CurrencyError::Call(e) => write!(f, "{e}"),
            CurrencyError::InvalidContent(e) => write!(f, "Invalid content response: {e}"),
            CurrencyError::Api(e) => write!(
                f,
                "API error {}: {}",
                e.code,
                e.info.as_deref().unwrap_or("no details")
            ),
        }
    }
}

impl std::error::Error for CurrencyError {}

/// Outcome of a currency fetch.
#[derive(Debug)]
pub enum CurrencyResult<T> {
    /// `None` when the server answered without a body.
    Value(Option<T>),
    Error(CurrencyError),
}

impl<T> CurrencyResult<T> {
    pub fn into_result(self) -> Result<Option<T>, CurrencyError> {
        match self {
            CurrencyResult::Value(value) => Ok(value),
            CurrencyResult::Error(e) => Err(e),
        }
    }
}

/// Fetches and decodes the live-rate API.
pub struct CurrencyDataSource {
    network: Arc<Network>,
    base_url: String,
    access_key: String,
    request_timeout: Duration,
}

impl CurrencyDataSource {
    pub fn new(network: Arc<Network>, base_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            network,
            base_url: base_url.into(),
            access_key: access_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub async fn fetch_supported_currencies(&self) -> CurrencyResult<SupportedCurrencyModel> {
        info!("Fetching supported currencies");
        let endpoint = SupportedCurrenciesEndpoint::new(&self.base_url, &self.access_key)
            .with_timeout(self.request_timeout);
        self.fetch(&endpoint).await
    }

    pub async fn fetch_live_rates(&self) -> CurrencyResult<LiveRatesModel> {
        info!("Fetching live currency rates");
        let endpoint = LiveCurrencyRateEndpoint::new(&self.base_url, &self.access_key)
            .with_timeout(self.request_timeout);
        self.fetch(&endpoint).await
    }

    async fn fetch<T>(&self, endpoint: &dyn Endpoint) -> CurrencyResult<T>
    where
        T: DeserializeOwned + ApiPayload,
    {
        if self.base_url.trim().is_empty() {
            return CurrencyResult::Error(CurrencyError::Config("base URL is not set".to_string()));
        }
        if self.access_key.trim().is_empty() {
            return CurrencyResult::Error(CurrencyError::Config(
                "access key is not set".to_string(),
            ));
        }

        let result = match self.network.execute(endpoint).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Currency call to '{}' failed: {e}", endpoint.path());
                return CurrencyResult::Error(CurrencyError::Call(e));
            }
        };

        match result {
            EndpointResult::Error(e) => {
                warn!("Currency call to '{}' returned {e}", endpoint.path());
                CurrencyResult::Error(CurrencyError::Endpoint(e))
            }
            response @ EndpointResult::Response { .. } => match response.decode_response::<T>() {
                Decoded::Value(Some(model)) => match model.api_error() {
                    Some(api_error) => {
                        warn!("Currency API rejected '{}': {:?}", endpoint.path(), api_error);
                        CurrencyResult::Error(CurrencyError::Api(api_error.clone()))
                    }
                    None => CurrencyResult::Value(Some(model)),
                },
                Decoded::Value(None) => {
                    debug!("Currency call to '{}' returned no body", endpoint.path());
                    CurrencyResult::Value(None)
                }
                Decoded::Error(e) => CurrencyResult::Error(CurrencyError::InvalidContent(e)),
            },
        }
    }
}
