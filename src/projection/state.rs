//! Per-holding state carried from one period to the next

use super::config::ProjectionConfig;
use super::numeric::{self, Saturated};
use crate::portfolio::Holding;

/// State of one holding at a point in time during projection
#[derive(Debug, Clone)]
pub struct HoldingState {
    /// Holding identifier
    pub identifier: String,

    /// Units held at the current point
    pub shares: f64,

    /// Current price per unit
    pub price: f64,

    /// Current annualized dividend per unit
    pub annual_dividend_per_share: f64,

    /// Annual dividend growth, applied once per period
    pub dividend_growth_rate: f64,

    /// Price multiplier applied at every purchase step
    pub price_step_factor: f64,

    /// Whether after-tax dividends are reinvested
    pub reinvest_dividends: bool,

    /// Portfolio index of the holding that receives reinvested dividends
    pub target_index: usize,

    /// External cash per month under per-holding contributions
    pub monthly_contribution: f64,

    /// Set when any saturation engaged since the flag was last taken
    pub clamped: bool,
}

impl HoldingState {
    /// Initialize state from a holding at projection start
    pub fn from_holding(holding: &Holding, target_index: usize, config: &ProjectionConfig) -> Self {
        let annual_price_growth = holding.price_growth_rate.unwrap_or(config.price_growth_rate);
        let shares = numeric::saturate(holding.shares);
        let price = numeric::saturate(holding.price_per_share);
        let dividend = numeric::saturate(holding.annual_dividend_per_share);
        Self {
            identifier: holding.identifier.clone(),
            shares: shares.value,
            price: price.value,
            annual_dividend_per_share: dividend.value,
            dividend_growth_rate: holding.dividend_growth_rate,
            price_step_factor: numeric::step_factor(
                annual_price_growth,
                config.compounding.steps_per_period(),
            ),
            reinvest_dividends: holding.reinvest_dividends,
            target_index,
            monthly_contribution: holding.monthly_contribution,
            clamped: shares.clamped || price.clamped || dividend.clamped,
        }
    }

    /// Pre-tax income per month at the current shares and dividend rate
    pub fn monthly_income(&mut self) -> f64 {
        let annual = numeric::mul(self.shares, self.annual_dividend_per_share);
        self.track(annual) / 12.0
    }

    /// Pre-tax dividends paid over one of `steps` equal sub-periods of a year
    pub fn dividends_for_step(&mut self, steps: u32) -> f64 {
        let annual = numeric::mul(self.shares, self.annual_dividend_per_share);
        self.track(annual) / steps as f64
    }

    /// Current market value
    pub fn market_value(&mut self) -> f64 {
        let value = numeric::mul(self.shares, self.price);
        self.track(value)
    }

    /// Grow the price by one step, floored and capped
    pub fn grow_price(&mut self) {
        let grown = numeric::grow_price(self.price, self.price_step_factor);
        self.price = self.track(grown);
        debug_assert!(self.price > 0.0, "price must stay positive after the floor");
    }

    /// Buy shares with `cash` at the current price; returns the units bought
    pub fn purchase(&mut self, cash: f64) -> f64 {
        if cash <= 0.0 {
            return 0.0;
        }
        let bought = cash / self.price;
        let shares = numeric::add(self.shares, bought);
        self.shares = self.track(shares);
        bought
    }

    /// Grow the dividend per share at period end
    pub fn grow_dividend(&mut self) {
        let grown = numeric::mul(self.annual_dividend_per_share, 1.0 + self.dividend_growth_rate);
        self.annual_dividend_per_share = self.track(grown);
    }

    /// Whether any saturation engaged since the last call; clears the flag
    pub fn take_clamped(&mut self) -> bool {
        std::mem::take(&mut self.clamped)
    }

    pub fn track(&mut self, saturated: Saturated) -> f64 {
        self.clamped |= saturated.clamped;
        saturated.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::config::Compounding;
    use crate::projection::numeric::{MAX_MAGNITUDE, MIN_PRICE};
    use approx::assert_relative_eq;

    #[test]
    fn test_from_holding_uses_override() {
        let config = ProjectionConfig { price_growth_rate: 0.02, ..Default::default() };
        let plain = Holding::new("A", 10.0, 100.0, 5.0);
        let fast = Holding::new("B", 10.0, 100.0, 5.0).with_price_growth(0.10);

        assert_relative_eq!(HoldingState::from_holding(&plain, 0, &config).price_step_factor, 1.02);
        assert_relative_eq!(HoldingState::from_holding(&fast, 1, &config).price_step_factor, 1.10);
    }

    #[test]
    fn test_monthly_step_factor() {
        let config = ProjectionConfig {
            price_growth_rate: 0.12,
            compounding: Compounding::Monthly,
            ..Default::default()
        };
        let state = HoldingState::from_holding(&Holding::new("A", 1.0, 100.0, 1.0), 0, &config);
        assert_relative_eq!(state.price_step_factor.powi(12), 1.12, epsilon = 1e-12);
    }

    #[test]
    fn test_purchase_and_clamp() {
        let config = ProjectionConfig::default();
        let mut state = HoldingState::from_holding(&Holding::new("A", 10.0, 4.0, 2.0), 0, &config);

        assert_eq!(state.purchase(20.0), 5.0);
        assert_eq!(state.shares, 15.0);
        assert_eq!(state.purchase(0.0), 0.0);
        assert!(!state.clamped);

        state.shares = MAX_MAGNITUDE;
        state.purchase(1e6);
        assert_eq!(state.shares, MAX_MAGNITUDE);
        assert!(state.clamped);
    }

    #[test]
    fn test_starting_values_are_capped() {
        let config = ProjectionConfig::default();
        let mut state = HoldingState::from_holding(&Holding::new("A", 1e18, 2e16, 3e15), 0, &config);

        assert_eq!(state.shares, MAX_MAGNITUDE);
        assert_eq!(state.price, MAX_MAGNITUDE);
        assert_eq!(state.annual_dividend_per_share, MAX_MAGNITUDE);
        assert!(state.take_clamped());
        assert!(!state.take_clamped());

        let plain = HoldingState::from_holding(&Holding::new("B", 10.0, 4.0, 2.0), 0, &config);
        assert!(!plain.clamped);
    }

    #[test]
    fn test_price_never_below_floor() {
        let config = ProjectionConfig { price_growth_rate: -0.9, ..Default::default() };
        let mut state = HoldingState::from_holding(&Holding::new("A", 1.0, 5.0, 0.0), 0, &config);
        for _ in 0..5 {
            state.grow_price();
        }
        assert_eq!(state.price, MIN_PRICE);
    }
}
