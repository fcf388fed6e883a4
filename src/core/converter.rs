//! Keeps a `RateBook` filled from the data source and answers conversions.

use log::{debug, info};

use crate::currency::{CurrencyDataSource, CurrencyError, RateBook};

pub struct Converter {
    source: CurrencyDataSource,
    book: RateBook,
}

impl Converter {
    pub fn new(source: CurrencyDataSource) -> Self {
        Self {
            source,
            book: RateBook::default(),
        }
    }

    pub fn book(&self) -> &RateBook {
        &self.book
    }

    /// Replaces the book with fresh live quotes. Returns the number of quotes.
    ///
    /// Names already applied are carried over for codes that are still quoted.
    pub async fn refresh_rates(&mut self) -> Result<usize, CurrencyError> {
        let model = self.source.fetch_live_rates().await.into_result()?;
        let quotes = model.map(|m| m.currency_quotes()).unwrap_or_default();

        let mut book = RateBook::from_quotes(&quotes);
        let known_names: Vec<_> = self
            .book
            .entries()
            .filter_map(|e| {
                e.name.clone().map(|name| crate::currency::CurrencyData {
                    code: e.code.clone(),
                    name,
                })
            })
            .collect();
        book.apply_names(&known_names);

        info!("Rate book refreshed with {} quotes", book.len());
        self.book = book;
        Ok(self.book.len())
    }

    /// Fetches currency names into the book. Returns the number of names received.
    pub async fn load_names(&mut self) -> Result<usize, CurrencyError> {
        let model = self.source.fetch_supported_currencies().await.into_result()?;
        let names = model.map(|m| m.currency_list()).unwrap_or_default();
        self.book.apply_names(&names);
        Ok(names.len())
    }

    /// Fetches quotes only when the book is empty.
    pub async fn ensure_rates(&mut self) -> Result<(), CurrencyError> {
        if self.book.is_empty() {
            self.refresh_rates().await?;
        } else {
            debug!("Using {} cached quotes", self.book.len());
        }
        Ok(())
    }

    /// Fetches names only when none are known yet.
    pub async fn ensure_names(&mut self) -> Result<(), CurrencyError> {
        self.ensure_rates().await?;
        if self.book.needs_names() {
            self.load_names().await?;
        }
        Ok(())
    }

    pub async fn convert(&mut self, amount: f64, code: &str) -> Result<Option<String>, CurrencyError> {
        self.ensure_rates().await?;
        Ok(self.book.convert_to_usd(amount, code))
    }
}
