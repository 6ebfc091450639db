//! Projection output structures

use super::numeric;
use serde::{Deserialize, Serialize};

/// One holding's figures for one yearly period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingPeriodRow {
    // Timing
    pub period: u32,
    pub calendar_year: Option<i32>,
    pub identifier: String,

    // Start-of-period state
    pub starting_shares: f64,
    pub starting_price: f64,
    pub annual_dividend_per_share: f64,
    pub starting_value: f64,

    /// Pre-tax income per month from start-of-period shares and dividend rate
    pub monthly_income: f64,

    // Dividend flows over the period
    pub gross_dividends: f64,
    pub tax_withheld: f64,
    pub dividends_reinvested: f64,
    pub dividends_paid_out: f64,

    // Purchase cash received over the period
    pub contribution: f64,
    pub redirected_in: f64,
    pub shares_purchased: f64,

    // End-of-period state
    pub ending_shares: f64,
    pub ending_price: f64,
    pub ending_value: f64,
}

impl HoldingPeriodRow {
    /// Create a new row with zeroed flows
    pub fn new(period: u32, identifier: &str) -> Self {
        Self {
            period,
            calendar_year: None,
            identifier: identifier.to_string(),
            starting_shares: 0.0,
            starting_price: 0.0,
            annual_dividend_per_share: 0.0,
            starting_value: 0.0,
            monthly_income: 0.0,
            gross_dividends: 0.0,
            tax_withheld: 0.0,
            dividends_reinvested: 0.0,
            dividends_paid_out: 0.0,
            contribution: 0.0,
            redirected_in: 0.0,
            shares_purchased: 0.0,
            ending_shares: 0.0,
            ending_price: 0.0,
            ending_value: 0.0,
        }
    }

    /// Cap accumulated flows at the saturation ceiling; true if any was capped
    pub fn saturate(&mut self) -> bool {
        let mut clamped = false;
        for value in [
            &mut self.gross_dividends,
            &mut self.tax_withheld,
            &mut self.dividends_reinvested,
            &mut self.dividends_paid_out,
            &mut self.contribution,
            &mut self.redirected_in,
            &mut self.shares_purchased,
            &mut self.starting_value,
            &mut self.ending_value,
        ] {
            let capped = numeric::saturate(*value);
            *value = capped.value;
            clamped |= capped.clamped;
        }
        clamped
    }
}

/// Aggregate row across all holdings for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub period: u32,
    pub calendar_year: Option<i32>,
    pub monthly_income: f64,
    pub gross_dividends: f64,
    pub tax_withheld: f64,
    pub dividends_reinvested: f64,
    pub dividends_paid_out: f64,
    pub contribution: f64,
    pub starting_value: f64,
    pub ending_value: f64,
}

impl PeriodTotals {
    pub fn new(period: u32, calendar_year: Option<i32>) -> Self {
        Self {
            period,
            calendar_year,
            monthly_income: 0.0,
            gross_dividends: 0.0,
            tax_withheld: 0.0,
            dividends_reinvested: 0.0,
            dividends_paid_out: 0.0,
            contribution: 0.0,
            starting_value: 0.0,
            ending_value: 0.0,
        }
    }

    /// Add one holding's row into the aggregate
    pub fn accumulate(&mut self, row: &HoldingPeriodRow) {
        self.monthly_income += row.monthly_income;
        self.gross_dividends += row.gross_dividends;
        self.tax_withheld += row.tax_withheld;
        self.dividends_reinvested += row.dividends_reinvested;
        self.dividends_paid_out += row.dividends_paid_out;
        self.contribution += row.contribution;
        self.starting_value += row.starting_value;
        self.ending_value += row.ending_value;
    }

    /// Cap every amount at the saturation ceiling; true if any was capped
    pub fn saturate(&mut self) -> bool {
        let mut clamped = false;
        for value in [
            &mut self.monthly_income,
            &mut self.gross_dividends,
            &mut self.tax_withheld,
            &mut self.dividends_reinvested,
            &mut self.dividends_paid_out,
            &mut self.contribution,
            &mut self.starting_value,
            &mut self.ending_value,
        ] {
            let capped = numeric::saturate(*value);
            *value = capped.value;
            clamped |= capped.clamped;
        }
        clamped
    }
}

/// Conditions recorded during a run that did not stop it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionNotice {
    /// A value hit the saturation ceiling; `identifier` is None for the aggregate row
    NumericOverflowClamped {
        identifier: Option<String>,
        period: u32,
    },
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Holding identifiers in portfolio order
    pub holdings: Vec<String>,

    /// Number of yearly periods projected
    pub horizon_periods: u32,

    /// Per-holding rows, ordered by period then portfolio order
    pub rows: Vec<HoldingPeriodRow>,

    /// One aggregate row per period
    pub totals: Vec<PeriodTotals>,

    /// Clamp conditions recorded during the run
    pub notices: Vec<ProjectionNotice>,
}

impl ProjectionResult {
    pub fn new(holdings: Vec<String>, horizon_periods: u32) -> Self {
        let capacity = holdings.len() * horizon_periods as usize;
        Self {
            holdings,
            horizon_periods,
            rows: Vec::with_capacity(capacity),
            totals: Vec::with_capacity(horizon_periods as usize),
            notices: Vec::new(),
        }
    }

    /// Add one period's rows and their aggregate
    pub fn add_period(&mut self, rows: Vec<HoldingPeriodRow>, totals: PeriodTotals) {
        self.rows.extend(rows);
        self.totals.push(totals);
    }

    /// Rows of one holding in period order
    pub fn rows_for<'a>(&'a self, identifier: &'a str) -> impl Iterator<Item = &'a HoldingPeriodRow> + 'a {
        self.rows.iter().filter(move |r| r.identifier == identifier)
    }

    /// Monthly-equivalent income of one holding per period
    pub fn income_series(&self, identifier: &str) -> Vec<f64> {
        self.rows_for(identifier).map(|r| r.monthly_income).collect()
    }

    /// Monthly-equivalent income of the whole portfolio per period
    pub fn total_income_series(&self) -> Vec<f64> {
        self.totals.iter().map(|t| t.monthly_income).collect()
    }

    /// Whether any saturation engaged
    pub fn clamped(&self) -> bool {
        !self.notices.is_empty()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_dividends: f64 = self.totals.iter().map(|t| t.gross_dividends).sum();
        let total_tax: f64 = self.totals.iter().map(|t| t.tax_withheld).sum();
        let total_reinvested: f64 = self.totals.iter().map(|t| t.dividends_reinvested).sum();
        let total_paid_out: f64 = self.totals.iter().map(|t| t.dividends_paid_out).sum();
        let total_contributions: f64 = self.totals.iter().map(|t| t.contribution).sum();

        let starting_monthly_income = self.totals.first().map(|t| t.monthly_income).unwrap_or(0.0);
        let final_monthly_income = self.totals.last().map(|t| t.monthly_income).unwrap_or(0.0);
        let starting_value = self.totals.first().map(|t| t.starting_value).unwrap_or(0.0);
        let final_value = self.totals.last().map(|t| t.ending_value).unwrap_or(0.0);

        ProjectionSummary {
            total_periods: self.totals.len() as u32,
            holdings: self.holdings.len(),
            starting_monthly_income,
            final_monthly_income,
            total_dividends,
            total_tax,
            total_reinvested,
            total_paid_out,
            total_contributions,
            starting_value,
            final_value,
            clamped: self.clamped(),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_periods: u32,
    pub holdings: usize,
    pub starting_monthly_income: f64,
    pub final_monthly_income: f64,
    pub total_dividends: f64,
    pub total_tax: f64,
    pub total_reinvested: f64,
    pub total_paid_out: f64,
    pub total_contributions: f64,
    pub starting_value: f64,
    pub final_value: f64,
    pub clamped: bool,
}
