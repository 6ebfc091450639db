//! Scenario runner for side-by-side projections
//!
//! Holds one portfolio and runs it under many configurations. Every run gets
//! its own copy of the holdings, so scenarios execute in parallel without any
//! coordination.

use crate::error::{LoadError, ProjectionError};
use crate::portfolio::Portfolio;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named projection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub config: ProjectionConfig,
}

impl Scenario {
    pub fn new(name: impl Into<String>, config: ProjectionConfig) -> Self {
        Self { name: name.into(), config }
    }
}

/// Result of one scenario; a misconfigured scenario does not stop the others
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: Result<ProjectionResult, ProjectionError>,
}

/// Load a list of scenarios from a JSON file
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<Scenario>, LoadError> {
    let path = path.as_ref();
    log::info!("Loading scenarios from {}", path.display());
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

/// Runs projections of one portfolio under different configurations
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(portfolio);
///
/// for rate in [0.0, 0.03, 0.06] {
///     let config = ProjectionConfig { price_growth_rate: rate, ..Default::default() };
///     let result = runner.run(config)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    portfolio: Portfolio,
}

impl ScenarioRunner {
    pub fn new(portfolio: Portfolio) -> Self {
        Self { portfolio }
    }

    /// Run a single projection with the given config
    pub fn run(&self, config: ProjectionConfig) -> Result<ProjectionResult, ProjectionError> {
        ProjectionEngine::new(config).project(&self.portfolio)
    }

    /// Run every scenario in parallel; output order matches input order
    pub fn run_scenarios(&self, scenarios: &[Scenario]) -> Vec<ScenarioOutcome> {
        scenarios
            .par_iter()
            .map(|scenario| {
                let portfolio = self.portfolio.clone();
                let result = ProjectionEngine::new(scenario.config.clone()).project(&portfolio);
                if let Err(err) = &result {
                    log::warn!("Scenario '{}' failed: {}", scenario.name, err);
                }
                ScenarioOutcome { name: scenario.name.clone(), result }
            })
            .collect()
    }

    /// Get reference to the portfolio for inspection
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Get mutable reference to the portfolio for edits between runs
    pub fn portfolio_mut(&mut self) -> &mut Portfolio {
        &mut self.portfolio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Holding;

    fn test_portfolio() -> Portfolio {
        Portfolio::from_holdings(vec![
            Holding::from_monthly_dividend("미배콜", 2000.0, 10_500.0, 100.0).with_reinvestment(true),
            Holding::from_monthly_dividend("미배당", 860.0, 11_200.0, 40.0)
                .with_reinvestment(true)
                .with_dividend_growth(0.05),
        ])
        .unwrap()
    }

    #[test]
    fn test_scenario_runner_batch() {
        let runner = ScenarioRunner::new(test_portfolio());

        let scenarios: Vec<_> = [0.0, 0.03, 0.06]
            .iter()
            .map(|&rate| {
                Scenario::new(
                    format!("growth-{}", rate),
                    ProjectionConfig { horizon_periods: 20, price_growth_rate: rate, ..Default::default() },
                )
            })
            .collect();

        let outcomes = runner.run_scenarios(&scenarios);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[1].name, "growth-0.03");

        let finals: Vec<f64> = outcomes
            .iter()
            .map(|o| o.result.as_ref().unwrap().summary().final_value)
            .collect();
        // Higher price growth should result in higher final value
        assert!(finals[2] > finals[0]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let runner = ScenarioRunner::new(test_portfolio());
        let scenarios = vec![
            Scenario::new("base", ProjectionConfig::with_horizon(15)),
            Scenario::new("untaxed", ProjectionConfig { apply_tax: false, ..ProjectionConfig::with_horizon(15) }),
        ];

        let outcomes = runner.run_scenarios(&scenarios);
        for (scenario, outcome) in scenarios.iter().zip(&outcomes) {
            let sequential = runner.run(scenario.config.clone()).unwrap();
            assert_eq!(outcome.result.as_ref().unwrap(), &sequential);
        }
    }

    #[test]
    fn test_bad_scenario_is_isolated() {
        let runner = ScenarioRunner::new(test_portfolio());
        let scenarios = vec![
            Scenario::new("broken", ProjectionConfig::with_horizon(0)),
            Scenario::new("fine", ProjectionConfig::with_horizon(3)),
        ];

        let outcomes = runner.run_scenarios(&scenarios);
        assert!(outcomes[0].result.is_err());
        assert_eq!(outcomes[1].result.as_ref().unwrap().totals.len(), 3);
    }

    #[test]
    fn test_load_sample_scenarios() {
        let scenarios = load_scenarios("data/scenarios.json").expect("Failed to load scenarios");
        assert_eq!(scenarios.len(), 5);
        assert!(scenarios.iter().all(|s| s.config.validate().is_ok()));
    }
}
