//! Apply provider quotes to holdings before projection

use super::MarketDataProvider;
use crate::error::MarketDataError;
use crate::portfolio::{Holding, Portfolio};

/// Outcome of resolving a portfolio against a provider
#[derive(Debug, Clone)]
pub struct ResolveReport {
    /// Portfolio with every successful quote applied
    pub portfolio: Portfolio,

    /// Tickers whose quote was applied
    pub updated: Vec<String>,

    /// Tickers that kept their entered values, with the lookup error
    pub failed: Vec<(String, MarketDataError)>,
}

impl ResolveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Look up every holding and replace it with a quote-updated copy.
///
/// Each lookup fails independently: a failed ticker keeps its entered price,
/// dividend and growth rate. Portfolio order is preserved.
pub fn resolve_portfolio(portfolio: &Portfolio, provider: &dyn MarketDataProvider) -> ResolveReport {
    let mut resolved = Portfolio::new();
    let mut updated = Vec::new();
    let mut failed = Vec::new();

    for holding in portfolio {
        let ticker = holding.identifier.as_str();
        match provider.fetch(ticker).and_then(|q| q.validate(ticker).map(|_| q)) {
            Ok(quote) => {
                resolved.insert(Holding {
                    price_per_share: quote.price,
                    annual_dividend_per_share: quote.trailing_annual_dividend_per_share,
                    dividend_growth_rate: quote.estimated_growth_rate,
                    ..holding.clone()
                });
                updated.push(ticker.to_string());
            }
            Err(err) => {
                log::warn!("Keeping entered values for {}: {}", ticker, err);
                resolved.insert(holding.clone());
                failed.push((ticker.to_string(), err));
            }
        }
    }

    log::info!("Resolved {} of {} holdings", updated.len(), resolved.len());
    ResolveReport { portfolio: resolved, updated, failed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::{Quote, StaticQuotes};

    fn portfolio() -> Portfolio {
        Portfolio::from_holdings(vec![
            Holding::new("SCHD", 100.0, 25.0, 0.9).with_reinvestment(true),
            Holding::new("PRIVATE", 10.0, 1000.0, 40.0),
            Holding::new("O", 50.0, 60.0, 3.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_updates_and_keeps_failures() {
        let mut quotes = StaticQuotes::new();
        quotes.insert("SCHD", Quote { price: 27.5, trailing_annual_dividend_per_share: 0.98, estimated_growth_rate: 0.11 });
        quotes.insert("O", Quote { price: 0.0, trailing_annual_dividend_per_share: 3.1, estimated_growth_rate: 0.03 });

        let report = resolve_portfolio(&portfolio(), &quotes);

        assert_eq!(report.updated, vec!["SCHD".to_string()]);
        assert_eq!(report.failed.len(), 2);
        assert!(!report.is_complete());

        let schd = report.portfolio.get("SCHD").unwrap();
        assert_eq!(schd.price_per_share, 27.5);
        assert_eq!(schd.dividend_growth_rate, 0.11);
        assert_eq!(schd.shares, 100.0);
        assert!(schd.reinvest_dividends);

        // Zero price from the provider leaves the entered price alone
        assert_eq!(report.portfolio.get("O").unwrap().price_per_share, 60.0);
        assert_eq!(report.portfolio.get("PRIVATE").unwrap().price_per_share, 1000.0);
    }

    #[test]
    fn test_resolve_preserves_order() {
        let mut quotes = StaticQuotes::new();
        quotes.insert("SCHD", Quote { price: 27.5, trailing_annual_dividend_per_share: 0.98, estimated_growth_rate: 0.0 });
        let report = resolve_portfolio(&portfolio(), &quotes);
        assert_eq!(report.portfolio.identifiers(), vec!["SCHD", "PRIVATE", "O"]);
    }
}
