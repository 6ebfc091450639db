//! Core projection engine for yearly dividend-reinvestment projections

use crate::error::ProjectionError;
use crate::portfolio::Portfolio;
use super::allocation::allocate;
use super::cashflows::{HoldingPeriodRow, PeriodTotals, ProjectionNotice, ProjectionResult};
use super::config::{ContributionPolicy, ProjectionConfig};
use super::numeric;
use super::state::HoldingState;

/// Run a projection with the given config
pub fn project(portfolio: &Portfolio, config: &ProjectionConfig) -> Result<ProjectionResult, ProjectionError> {
    ProjectionEngine::new(config.clone()).project(portfolio)
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with the given config
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the projection for a portfolio.
    ///
    /// All validation happens before the first period; a returned error means
    /// nothing was computed.
    pub fn project(&self, portfolio: &Portfolio) -> Result<ProjectionResult, ProjectionError> {
        self.config.validate()?;
        portfolio.validate()?;

        let mut states = self.initial_states(portfolio)?;
        let mut result = ProjectionResult::new(portfolio.identifiers(), self.config.horizon_periods);
        let mut warned = vec![false; states.len()];

        log::debug!(
            "Projecting {} holdings over {} periods ({:?} compounding, tax {:.4})",
            states.len(),
            self.config.horizon_periods,
            self.config.compounding,
            self.config.effective_tax_rate(),
        );

        for period in 1..=self.config.horizon_periods {
            let mut rows = self.calculate_period(period, &mut states);
            let mut totals = PeriodTotals::new(period, self.config.calendar_year(period));

            for (i, (state, row)) in states.iter_mut().zip(rows.iter_mut()).enumerate() {
                let row_clamped = row.saturate();
                if state.take_clamped() || row_clamped {
                    if !warned[i] {
                        log::warn!(
                            "Values for '{}' reached the {:e} ceiling in period {}; results are clamped",
                            state.identifier,
                            numeric::MAX_MAGNITUDE,
                            period,
                        );
                        warned[i] = true;
                    }
                    result.notices.push(ProjectionNotice::NumericOverflowClamped {
                        identifier: Some(state.identifier.clone()),
                        period,
                    });
                }
                totals.accumulate(row);
            }

            if totals.saturate() {
                result.notices.push(ProjectionNotice::NumericOverflowClamped { identifier: None, period });
            }

            log::trace!(
                "Period {}: monthly income {:.2}, value {:.2}",
                period,
                totals.monthly_income,
                totals.ending_value,
            );
            result.add_period(rows, totals);
        }

        Ok(result)
    }

    fn initial_states(&self, portfolio: &Portfolio) -> Result<Vec<HoldingState>, ProjectionError> {
        portfolio
            .iter()
            .map(|holding| -> Result<HoldingState, ProjectionError> {
                let target = holding.reinvestment_target();
                let target_index = portfolio.position(target).ok_or_else(|| {
                    ProjectionError::holding(
                        &holding.identifier,
                        format!("reinvestment target '{}' is not in the portfolio", target),
                    )
                })?;
                Ok(HoldingState::from_holding(holding, target_index, &self.config))
            })
            .collect()
    }

    /// Calculate one yearly period for every holding
    fn calculate_period(&self, period: u32, states: &mut [HoldingState]) -> Vec<HoldingPeriodRow> {
        let steps = self.config.compounding.steps_per_period();

        // Income is read from start-of-period state, before anything grows
        let mut rows: Vec<HoldingPeriodRow> = states
            .iter_mut()
            .map(|state| self.open_row(period, state))
            .collect();

        let contributions = self.period_contributions(states, &rows);

        for _ in 0..steps {
            let cash = self.collect_cash(states, &mut rows, &contributions, steps);

            // Purchases see the grown price and cash from every source
            for ((state, row), amount) in states.iter_mut().zip(rows.iter_mut()).zip(cash) {
                state.grow_price();
                row.shares_purchased += state.purchase(amount);
            }
        }

        for (state, row) in states.iter_mut().zip(rows.iter_mut()) {
            state.grow_dividend();
            row.ending_shares = state.shares;
            row.ending_price = state.price;
            row.ending_value = state.market_value();
        }

        rows
    }

    /// Snapshot the start-of-period state into a new row
    fn open_row(&self, period: u32, state: &mut HoldingState) -> HoldingPeriodRow {
        let mut row = HoldingPeriodRow::new(period, &state.identifier);
        row.calendar_year = self.config.calendar_year(period);
        row.starting_shares = state.shares;
        row.starting_price = state.price;
        row.annual_dividend_per_share = state.annual_dividend_per_share;
        row.starting_value = state.market_value();
        row.monthly_income = state.monthly_income();
        row
    }

    /// External cash each holding receives over the whole period
    fn period_contributions(&self, states: &mut [HoldingState], rows: &[HoldingPeriodRow]) -> Vec<f64> {
        match &self.config.contribution {
            ContributionPolicy::PerHolding => states
                .iter_mut()
                .map(|s| {
                    let annual = numeric::mul(s.monthly_contribution, 12.0);
                    s.track(annual)
                })
                .collect(),
            ContributionPolicy::Pooled { monthly_amount, allocation } => {
                let total = numeric::mul(*monthly_amount, 12.0);
                if total.clamped {
                    // Every holding's share was cut by the capped total
                    for state in states.iter_mut() {
                        state.track(total);
                    }
                }
                let values: Vec<f64> = rows.iter().map(|r| r.starting_value).collect();
                allocate(total.value, &values, *allocation)
            }
        }
    }

    /// Dividends and contributions for one purchase step, keyed by receiving holding
    fn collect_cash(
        &self,
        states: &mut [HoldingState],
        rows: &mut [HoldingPeriodRow],
        contributions: &[f64],
        steps: u32,
    ) -> Vec<f64> {
        let tax_rate = self.config.effective_tax_rate();
        let mut cash = vec![0.0; states.len()];

        for i in 0..states.len() {
            let gross = states[i].dividends_for_step(steps);
            let withheld = gross * tax_rate;
            let net = gross - withheld;

            rows[i].gross_dividends += gross;
            rows[i].tax_withheld += withheld;

            if states[i].reinvest_dividends {
                let target = states[i].target_index;
                cash[target] += net;
                rows[i].dividends_reinvested += net;
                if target != i {
                    rows[target].redirected_in += net;
                }
            } else {
                rows[i].dividends_paid_out += net;
            }

            let contribution = contributions[i] / steps as f64;
            cash[i] += contribution;
            rows[i].contribution += contribution;
        }

        cash
    }
}
