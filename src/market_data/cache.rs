//! Caching and retrying wrapper around a market-data provider

use super::{MarketDataProvider, Quote};
use crate::error::MarketDataError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Default number of attempts for transient failures
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Caches successful quotes per ticker and retries transient failures.
///
/// Failures are never cached, so a later call gets a fresh attempt.
#[derive(Debug)]
pub struct CachedProvider<P> {
    inner: P,
    attempts: u32,
    cache: Mutex<HashMap<String, Quote>>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_attempts(inner, DEFAULT_ATTEMPTS)
    }

    pub fn with_attempts(inner: P, attempts: u32) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every cached quote
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn cached(&self, ticker: &str) -> Option<Quote> {
        self.cache.lock().ok().and_then(|c| c.get(ticker).copied())
    }

    fn store(&self, ticker: &str, quote: Quote) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(ticker.to_string(), quote);
        }
    }
}

impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    fn fetch(&self, ticker: &str) -> Result<Quote, MarketDataError> {
        if let Some(quote) = self.cached(ticker) {
            return Ok(quote);
        }

        let mut attempt = 1;
        loop {
            match self.inner.fetch(ticker) {
                Ok(quote) => {
                    quote.validate(ticker)?;
                    self.store(ticker, quote);
                    return Ok(quote);
                }
                Err(err) if err.is_transient() && attempt < self.attempts => {
                    log::debug!("Quote for {} failed (attempt {}/{}): {}", ticker, attempt, self.attempts, err);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
