//! # Currency
//!
//! The live-rate API: its two endpoints, their response models, a data
//! source that turns calls into `CurrencyResult`s, and USD conversion.

pub mod datasource;
pub mod endpoint;
pub mod model;
pub mod rates;

pub use datasource::{CurrencyDataSource, CurrencyError, CurrencyResult};
pub use endpoint::{LiveCurrencyRateEndpoint, SupportedCurrenciesEndpoint};
pub use model::{
    ApiPayload, CurrencyData, CurrencyErrorModel, CurrencyRate, LiveRatesModel,
    SupportedCurrencyModel,
};
pub use rates::{CurrencyEntry, RateBook, USD, convert_amount};
