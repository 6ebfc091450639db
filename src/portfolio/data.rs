//! Holding and portfolio data structures

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// A single invested position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker or free-form name, unique within a portfolio
    pub identifier: String,

    /// Units held (fractional after reinvestment)
    pub shares: f64,

    /// Current market price per unit
    pub price_per_share: f64,

    /// Trailing or assumed annualized payout per unit
    pub annual_dividend_per_share: f64,

    /// Fractional annual growth of the payout (0.05 = 5%)
    #[serde(default)]
    pub dividend_growth_rate: f64,

    /// Whether after-tax dividends buy more shares
    #[serde(default)]
    pub reinvest_dividends: bool,

    /// External cash added each month
    #[serde(default)]
    pub monthly_contribution: f64,

    /// Holding that receives this holding's reinvested dividends (None = itself)
    #[serde(default)]
    pub reinvest_target: Option<String>,

    /// Per-holding price growth overriding the run's global rate
    #[serde(default)]
    pub price_growth_rate: Option<f64>,
}

impl Holding {
    /// Create a holding with no growth, no reinvestment and no contributions
    pub fn new(
        identifier: impl Into<String>,
        shares: f64,
        price_per_share: f64,
        annual_dividend_per_share: f64,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            shares,
            price_per_share,
            annual_dividend_per_share,
            dividend_growth_rate: 0.0,
            reinvest_dividends: false,
            monthly_contribution: 0.0,
            reinvest_target: None,
            price_growth_rate: None,
        }
    }

    /// Create a holding from a per-month payout (monthly distribution funds)
    pub fn from_monthly_dividend(
        identifier: impl Into<String>,
        shares: f64,
        price_per_share: f64,
        monthly_dividend_per_share: f64,
    ) -> Self {
        Self::new(identifier, shares, price_per_share, monthly_dividend_per_share * 12.0)
    }

    pub fn with_dividend_growth(mut self, rate: f64) -> Self {
        self.dividend_growth_rate = rate;
        self
    }

    pub fn with_reinvestment(mut self, reinvest: bool) -> Self {
        self.reinvest_dividends = reinvest;
        self
    }

    pub fn with_monthly_contribution(mut self, amount: f64) -> Self {
        self.monthly_contribution = amount;
        self
    }

    /// Redirect reinvested dividends into another holding
    pub fn redirect_dividends_to(mut self, target: impl Into<String>) -> Self {
        self.reinvest_dividends = true;
        self.reinvest_target = Some(target.into());
        self
    }

    pub fn with_price_growth(mut self, rate: f64) -> Self {
        self.price_growth_rate = Some(rate);
        self
    }

    /// Identifier of the holding whose purchase step receives reinvested dividends
    pub fn reinvestment_target(&self) -> &str {
        self.reinvest_target.as_deref().unwrap_or(&self.identifier)
    }

    /// Whether dividends are redirected to a different holding
    pub fn redirects_dividends(&self) -> bool {
        self.reinvest_dividends && self.reinvestment_target() != self.identifier
    }

    /// Current market value of the position
    pub fn market_value(&self) -> f64 {
        self.shares * self.price_per_share
    }

    /// Current pre-tax income per month
    pub fn monthly_income(&self) -> f64 {
        self.shares * self.annual_dividend_per_share / 12.0
    }

    /// Dividend yield on the current price
    pub fn dividend_yield(&self) -> f64 {
        if self.price_per_share > 0.0 {
            self.annual_dividend_per_share / self.price_per_share
        } else {
            0.0
        }
    }

    /// Check the holding's own fields (redirection targets are checked by the portfolio)
    pub fn validate(&self) -> Result<(), ProjectionError> {
        let id = self.identifier.as_str();
        if id.trim().is_empty() {
            return Err(ProjectionError::holding(id, "identifier must not be empty"));
        }
        if !self.shares.is_finite() || self.shares < 0.0 {
            return Err(ProjectionError::holding(id, format!("shares must be non-negative, got {}", self.shares)));
        }
        if !self.price_per_share.is_finite() || self.price_per_share <= 0.0 {
            return Err(ProjectionError::holding(id, format!("price must be positive, got {}", self.price_per_share)));
        }
        if !self.annual_dividend_per_share.is_finite() || self.annual_dividend_per_share < 0.0 {
            return Err(ProjectionError::holding(
                id,
                format!("annual dividend must be non-negative, got {}", self.annual_dividend_per_share),
            ));
        }
        if !self.dividend_growth_rate.is_finite() || self.dividend_growth_rate <= -1.0 {
            return Err(ProjectionError::holding(
                id,
                format!("dividend growth rate must be greater than -1, got {}", self.dividend_growth_rate),
            ));
        }
        if !self.monthly_contribution.is_finite() || self.monthly_contribution < 0.0 {
            return Err(ProjectionError::holding(
                id,
                format!("monthly contribution must be non-negative, got {}", self.monthly_contribution),
            ));
        }
        if let Some(rate) = self.price_growth_rate {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(ProjectionError::holding(id, format!("price growth rate must be greater than -1, got {}", rate)));
            }
        }
        Ok(())
    }
}

/// Ordered set of holdings keyed by identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Portfolio {
    holdings: Vec<Holding>,
}

impl Portfolio {
    /// Create an empty portfolio
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a portfolio, rejecting duplicate identifiers
    pub fn from_holdings(holdings: Vec<Holding>) -> Result<Self, ProjectionError> {
        let mut portfolio = Self::new();
        for holding in holdings {
            if portfolio.contains(&holding.identifier) {
                return Err(ProjectionError::holding(&holding.identifier, "duplicate identifier"));
            }
            portfolio.holdings.push(holding);
        }
        Ok(portfolio)
    }

    /// Insert a holding, replacing any existing one with the same identifier.
    ///
    /// Replacement is remove-then-insert: the new value goes to the end and the
    /// previous value is returned untouched.
    pub fn insert(&mut self, holding: Holding) -> Option<Holding> {
        let previous = self.remove(&holding.identifier);
        self.holdings.push(holding);
        previous
    }

    /// Remove a holding by identifier
    pub fn remove(&mut self, identifier: &str) -> Option<Holding> {
        let index = self.position(identifier)?;
        Some(self.holdings.remove(index))
    }

    pub fn get(&self, identifier: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.position(identifier).is_some()
    }

    /// Index of a holding in portfolio order
    pub fn position(&self, identifier: &str) -> Option<usize> {
        self.holdings.iter().position(|h| h.identifier == identifier)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Holding> {
        self.holdings.iter()
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.identifier.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Total current market value
    pub fn market_value(&self) -> f64 {
        self.holdings.iter().map(Holding::market_value).sum()
    }

    /// Total current pre-tax income per month
    pub fn monthly_income(&self) -> f64 {
        self.holdings.iter().map(Holding::monthly_income).sum()
    }

    /// Validate every holding, identifier uniqueness and redirection targets
    pub fn validate(&self) -> Result<(), ProjectionError> {
        for (i, holding) in self.holdings.iter().enumerate() {
            holding.validate()?;

            if self.holdings[..i].iter().any(|h| h.identifier == holding.identifier) {
                return Err(ProjectionError::holding(&holding.identifier, "duplicate identifier"));
            }

            if let Some(target) = &holding.reinvest_target {
                if !self.contains(target) {
                    return Err(ProjectionError::holding(
                        &holding.identifier,
                        format!("reinvestment target '{}' is not in the portfolio", target),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Portfolio {
    type Item = &'a Holding;
    type IntoIter = std::slice::Iter<'a, Holding>;

    fn into_iter(self) -> Self::IntoIter {
        self.holdings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered_call() -> Holding {
        Holding::from_monthly_dividend("JEPQ", 2000.0, 10_500.0, 105.0)
    }

    #[test]
    fn test_monthly_dividend_constructor() {
        let h = covered_call();
        assert_eq!(h.annual_dividend_per_share, 1260.0);
        assert_eq!(h.monthly_income(), 210_000.0);
        assert_eq!(h.reinvestment_target(), "JEPQ");
        assert!(!h.redirects_dividends());
    }

    #[test]
    fn test_insert_replaces_wholesale() {
        let mut portfolio = Portfolio::new();
        assert!(portfolio.insert(covered_call()).is_none());
        assert!(portfolio.insert(Holding::new("SCHD", 860.0, 27.0, 480.0)).is_none());

        let previous = portfolio.insert(covered_call().with_reinvestment(true));
        assert_eq!(previous, Some(covered_call()));
        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio.identifiers(), vec!["SCHD".to_string(), "JEPQ".to_string()]);
        assert!(portfolio.get("JEPQ").map(|h| h.reinvest_dividends).unwrap_or(false));
    }

    #[test]
    fn test_duplicates_rejected() {
        let result = Portfolio::from_holdings(vec![covered_call(), covered_call()]);
        assert!(matches!(result, Err(ProjectionError::InvalidHolding { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Holding::new("A", -1.0, 10.0, 1.0).validate().is_err());
        assert!(Holding::new("A", 1.0, 0.0, 1.0).validate().is_err());
        assert!(Holding::new("A", 1.0, 10.0, f64::NAN).validate().is_err());
        assert!(Holding::new("", 1.0, 10.0, 1.0).validate().is_err());
        assert!(Holding::new("A", 1.0, 10.0, 1.0).with_dividend_growth(-1.0).validate().is_err());
        assert!(Holding::new("A", 1.0, 10.0, 1.0).with_monthly_contribution(-5.0).validate().is_err());
        assert!(Holding::new("A", 0.0, 10.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_unknown_redirect_target() {
        let portfolio = Portfolio::from_holdings(vec![
            covered_call().redirect_dividends_to("QQQ"),
        ])
        .unwrap();
        let err = portfolio.validate().unwrap_err();
        assert!(err.to_string().contains("QQQ"));
    }
}
