use std::time::Duration;

use crate::networking::{DEFAULT_REQUEST_TIMEOUT, Endpoint, HttpBody};

const ACCESS_KEY_PARAM: &str = "access_key";

fn access_key_body(access_key: &str) -> HttpBody {
    HttpBody::from([(ACCESS_KEY_PARAM.to_string(), access_key.to_string())])
}

/// Live USD quotes for every supported currency.
#[derive(Debug, Clone)]
pub struct LiveCurrencyRateEndpoint {
    base_url: String,
    access_key: String,
    timeout: Duration,
}

impl LiveCurrencyRateEndpoint {
    pub fn new(base_url: &str, access_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            access_key: access_key.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Endpoint for LiveCurrencyRateEndpoint {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn path(&self) -> &str {
        "live"
    }

    fn body(&self) -> Option<HttpBody> {
        Some(access_key_body(&self.access_key))
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }
}

/// Currency codes with their display names.
#[derive(Debug, Clone)]
pub struct SupportedCurrenciesEndpoint {
    base_url: String,
    access_key: String,
    timeout: Duration,
}

impl SupportedCurrenciesEndpoint {
    pub fn new(base_url: &str, access_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            access_key: access_key.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Endpoint for SupportedCurrenciesEndpoint {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn path(&self) -> &str {
        "list"
    }

    fn body(&self) -> Option<HttpBody> {
        Some(access_key_body(&self.access_key))
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }
}
