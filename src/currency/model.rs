//! Response models of the live-rate API.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Error block the API embeds in a `200` response when a call is rejected.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CurrencyErrorModel {
    pub code: i32,
    #[serde(default)]
    pub info: Option<String>,
}

/// A payload that may carry an embedded API error.
pub trait ApiPayload {
    fn api_error(&self) -> Option<&CurrencyErrorModel>;
}

/// A currency code with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyData {
    pub code: String,
    pub name: String,
}

/// How many units of a currency one unit of the source currency buys.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRate {
    pub code: String,
    pub rate: f64,
}

/// `GET /live`
#[derive(Deserialize, Debug, Clone, Default)]
pub struct LiveRatesModel {
    pub success: Option<bool>,
    #[serde(alias = "term")]
    pub terms: Option<String>,
    pub privacy: Option<String>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub quotes: Option<Map<String, Value>>,
    pub error: Option<CurrencyErrorModel>,
}

impl LiveRatesModel {
    /// Quotes keyed by target currency. Keys arrive as `<source><target>`
    /// (e.g. `USDJPY`), so the three-letter source prefix is dropped.
    ///
    /// Empty when the payload names no source currency.
    pub fn currency_quotes(&self) -> Vec<CurrencyRate> {
        if self.source.as_deref().is_none_or(|s| s.trim().is_empty()) {
            return Vec::new();
        }

        self.quotes
            .iter()
            .flatten()
            .filter_map(|(key, value)| {
                let code = key.get(3..).filter(|c| !c.is_empty())?;
                let rate = value.as_f64()?;
                Some(CurrencyRate {
                    code: code.to_string(),
                    rate,
                })
            })
            .collect()
    }
}

impl ApiPayload for LiveRatesModel {
    fn api_error(&self) -> Option<&CurrencyErrorModel> {
        self.error.as_ref()
    }
}

/// `GET /list`
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SupportedCurrencyModel {
    pub success: Option<bool>,
    #[serde(alias = "term")]
    pub terms: Option<String>,
    pub privacy: Option<String>,
    pub currencies: Option<Map<String, Value>>,
    pub error: Option<CurrencyErrorModel>,
}

impl SupportedCurrencyModel {
    pub fn currency_list(&self) -> Vec<CurrencyData> {
        self.currencies
            .iter()
            .flatten()
            .map(|(code, name)| CurrencyData {
                code: code.clone(),
                name: match name {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })
            .collect()
    }
}

impl ApiPayload for SupportedCurrencyModel {
    fn api_error(&self) -> Option<&CurrencyErrorModel> {
        self.error.as_ref()
    }
}
