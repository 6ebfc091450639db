//! Run one portfolio under several projection configs and compare outcomes
//!
//! Usage: cargo run --bin compare_scenarios -- --scenarios data/scenarios.json

use anyhow::{Context, Result};
use clap::Parser;
use dividend_forecast::portfolio::{self, loader::DEFAULT_PORTFOLIO_PATH};
use dividend_forecast::scenario::{load_scenarios, ScenarioRunner};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "compare_scenarios", about = "Compare dividend projections across scenarios")]
struct Args {
    #[arg(long, default_value = DEFAULT_PORTFOLIO_PATH)]
    portfolio: PathBuf,

    #[arg(long, default_value = "data/scenarios.json")]
    scenarios: PathBuf,

    /// Emit a JSON array instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct ScenarioLine {
    name: String,
    years: u32,
    final_monthly_income: f64,
    total_dividends: f64,
    total_tax: f64,
    total_contributions: f64,
    final_value: f64,
    clamped: bool,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let holdings = portfolio::load_portfolio(&args.portfolio)
        .with_context(|| format!("failed to load portfolio {}", args.portfolio.display()))?;
    let scenarios = load_scenarios(&args.scenarios)
        .with_context(|| format!("failed to load scenarios {}", args.scenarios.display()))?;

    let runner = ScenarioRunner::new(holdings);
    let outcomes = runner.run_scenarios(&scenarios);

    let lines: Vec<ScenarioLine> = outcomes
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(result) => {
                let summary = result.summary();
                ScenarioLine {
                    name: outcome.name,
                    years: summary.total_periods,
                    final_monthly_income: summary.final_monthly_income,
                    total_dividends: summary.total_dividends,
                    total_tax: summary.total_tax,
                    total_contributions: summary.total_contributions,
                    final_value: summary.final_value,
                    clamped: summary.clamped,
                    error: None,
                }
            }
            Err(err) => ScenarioLine {
                name: outcome.name,
                years: 0,
                final_monthly_income: 0.0,
                total_dividends: 0.0,
                total_tax: 0.0,
                total_contributions: 0.0,
                final_value: 0.0,
                clamped: false,
                error: Some(err.to_string()),
            },
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    println!("{:<16} {:>5} {:>16} {:>18} {:>16} {:>18} {:>18}",
        "Scenario", "Years", "Final Monthly", "Total Dividends", "Total Tax", "Contributions", "Final Value");
    println!("{}", "-".repeat(113));
    for line in &lines {
        match &line.error {
            None => println!("{:<16} {:>5} {:>16.0} {:>18.0} {:>16.0} {:>18.0} {:>18.0}{}",
                line.name,
                line.years,
                line.final_monthly_income,
                line.total_dividends,
                line.total_tax,
                line.total_contributions,
                line.final_value,
                if line.clamped { "  (clamped)" } else { "" },
            ),
            Some(err) => println!("{:<16} error: {}", line.name, err),
        }
    }

    println!("\n{} scenarios in {:?}", lines.len(), start.elapsed());
    Ok(())
}
