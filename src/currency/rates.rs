//! Rate lookup and USD conversion.

use std::collections::BTreeMap;

use log::debug;

use super::model::{CurrencyData, CurrencyRate};

pub const USD: &str = "USD";

/// One currency as known locally: its USD quote and, once fetched, its name.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyEntry {
    pub code: String,
    pub rate: Option<f64>,
    pub name: Option<String>,
}

/// Quotes joined with currency names, keyed and ordered by currency code.
#[derive(Debug, Clone, Default)]
pub struct RateBook {
    entries: BTreeMap<String, CurrencyEntry>,
}

impl RateBook {
    /// Starts a fresh book from live quotes, replacing nothing but itself.
    pub fn from_quotes(quotes: &[CurrencyRate]) -> Self {
        let entries = quotes
            .iter()
            .map(|quote| {
                let code = quote.code.to_ascii_uppercase();
                let entry = CurrencyEntry {
                    code: code.clone(),
                    rate: Some(quote.rate),
                    name: None,
                };
                (code, entry)
            })
            .collect();
        Self { entries }
    }

    /// Sets display names for currencies already in the book. Names for
    /// unknown codes are ignored.
    pub fn apply_names(&mut self, currencies: &[CurrencyData]) {
        let mut applied = 0usize;
        for currency in currencies {
            if let Some(entry) = self.entries.get_mut(&currency.code.to_ascii_uppercase()) {
                entry.name = Some(currency.name.clone());
                applied += 1;
            }
        }
        debug!("Applied {applied} of {} currency names", currencies.len());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry has a name yet.
    pub fn needs_names(&self) -> bool {
        self.entries.values().all(|e| e.name.is_none())
    }

    pub fn get(&self, code: &str) -> Option<&CurrencyEntry> {
        self.entries.get(&code.trim().to_ascii_uppercase())
    }

    pub fn usd(&self) -> Option<&CurrencyEntry> {
        self.get(USD)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CurrencyEntry> {
        self.entries.values()
    }

    /// Converts `amount` of `code` into a formatted USD amount.
    pub fn convert_to_usd(&self, amount: f64, code: &str) -> Option<String> {
        let rate = self.get(code)?.rate?;
        let converted = convert_amount(Some(amount), Some(rate));
        (!converted.is_empty()).then_some(converted)
    }
}

/// `amount / rate_for_usd`, formatted the US way: thousands separators and at
/// most two fraction digits, trailing zeros dropped. Empty when either input
/// is missing or the result is not finite.
pub fn convert_amount(amount: Option<f64>, rate_for_usd: Option<f64>) -> String {
    let (Some(amount), Some(rate)) = (amount, rate_for_usd) else {
        return String::new();
    };

    let value = amount / rate;
    if !value.is_finite() {
        return String::new();
    }
    debug!("Converted value = {value}");
    format_amount(value)
}

fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value.is_sign_negative() && fixed != "0.00" { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}
