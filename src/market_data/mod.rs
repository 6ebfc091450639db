//! Market-data collaborators
//!
//! The projection engine never fetches prices itself. A surrounding layer
//! resolves holdings against a [`MarketDataProvider`] first; lookups can fail,
//! be retried, and be cached independently per ticker.

mod cache;
mod resolver;

pub use cache::CachedProvider;
pub use resolver::{resolve_portfolio, ResolveReport};

use crate::error::{LoadError, MarketDataError};
use csv::Reader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Resolved market data for one ticker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub trailing_annual_dividend_per_share: f64,
    pub estimated_growth_rate: f64,
}

impl Quote {
    /// Reject zero, negative or non-finite data
    pub fn validate(&self, ticker: &str) -> Result<(), MarketDataError> {
        let invalid = |reason: String| MarketDataError::InvalidQuote { ticker: ticker.to_string(), reason };

        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(invalid(format!("price must be positive, got {}", self.price)));
        }
        if !self.trailing_annual_dividend_per_share.is_finite() || self.trailing_annual_dividend_per_share < 0.0 {
            return Err(invalid(format!(
                "dividend must be non-negative, got {}",
                self.trailing_annual_dividend_per_share
            )));
        }
        if !self.estimated_growth_rate.is_finite() || self.estimated_growth_rate <= -1.0 {
            return Err(invalid(format!(
                "growth rate must be greater than -1, got {}",
                self.estimated_growth_rate
            )));
        }
        Ok(())
    }
}

/// Source of quotes for tickers
pub trait MarketDataProvider: Send + Sync {
    fn fetch(&self, ticker: &str) -> Result<Quote, MarketDataError>;
}

/// Fixed table of quotes, e.g. loaded from a CSV snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticQuotes {
    quotes: HashMap<String, Quote>,
}

impl StaticQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: impl Into<String>, quote: Quote) {
        self.quotes.insert(ticker.into(), quote);
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl MarketDataProvider for StaticQuotes {
    fn fetch(&self, ticker: &str) -> Result<Quote, MarketDataError> {
        self.quotes
            .get(ticker)
            .copied()
            .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))
    }
}

/// Raw CSV row matching quotes.csv columns
#[derive(Debug, Deserialize)]
struct QuoteRow {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "AnnualDividend")]
    annual_dividend: f64,
    #[serde(rename = "DividendGrowth", default)]
    dividend_growth: Option<f64>,
}

/// Load a quote snapshot from a CSV file
pub fn load_quotes<P: AsRef<Path>>(path: P) -> Result<StaticQuotes, LoadError> {
    let path = path.as_ref();
    log::info!("Loading quotes from {}", path.display());
    read_quotes(Reader::from_path(path)?)
}

/// Load a quote snapshot from any reader
pub fn load_quotes_from_reader<R: std::io::Read>(reader: R) -> Result<StaticQuotes, LoadError> {
    read_quotes(Reader::from_reader(reader))
}

fn read_quotes<R: std::io::Read>(mut reader: Reader<R>) -> Result<StaticQuotes, LoadError> {
    let mut quotes = StaticQuotes::new();
    for result in reader.deserialize() {
        let row: QuoteRow = result?;
        quotes.insert(
            row.ticker.trim(),
            Quote {
                price: row.price,
                trailing_annual_dividend_per_share: row.annual_dividend,
                estimated_growth_rate: row.dividend_growth.unwrap_or(0.0),
            },
        );
    }
    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_quotes() {
        let csv = "Ticker,Price,AnnualDividend,DividendGrowth\nSCHD,27.5,0.98,0.11\nO,55,3.1,\n";
        let quotes = load_quotes_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(quotes.len(), 2);

        let schd = quotes.fetch("SCHD").unwrap();
        assert_eq!(schd.price, 27.5);
        assert_eq!(schd.estimated_growth_rate, 0.11);
        assert_eq!(quotes.fetch("O").unwrap().estimated_growth_rate, 0.0);
        assert_eq!(quotes.fetch("JEPI"), Err(MarketDataError::NotFound("JEPI".into())));
    }

    #[test]
    fn test_quote_validation() {
        let good = Quote { price: 10.0, trailing_annual_dividend_per_share: 0.5, estimated_growth_rate: 0.0 };
        assert!(good.validate("A").is_ok());

        let zero = Quote { price: 0.0, ..good };
        assert!(matches!(zero.validate("A"), Err(MarketDataError::InvalidQuote { .. })));

        let stale = Quote { trailing_annual_dividend_per_share: f64::NAN, ..good };
        assert!(stale.validate("A").is_err());
    }

    #[test]
    fn test_load_sample_quotes() {
        let quotes = load_quotes("data/quotes.csv").expect("Failed to load sample quotes");
        assert_eq!(quotes.len(), 2);
    }
}
