//! # Core Application Logic
//!
//! Everything the command line needs beyond the library modules.
//! It knows nothing about how results are printed.
//!
//! ```text
//!     ┌────────────┐      ┌──────────────────┐      ┌────────────┐
//!     │   config   │ ───► │     Converter    │ ───► │  RateBook  │
//!     │ (toml+env) │      │ (fetch, ensure)  │      │ (in memory)│
//!     └────────────┘      └────────┬─────────┘      └────────────┘
//!                                  │
//!                                  ▼
//!                         CurrencyDataSource → Network
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Settings file, env overrides and resolution
//! - [`converter`]: Rate book upkeep and conversions

pub mod config;
pub mod converter;

pub use converter::Converter;
