//! Dividend Forecast CLI
//!
//! Projects dividend income for a portfolio CSV and prints the yearly table

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, ValueEnum};
use dividend_forecast::market_data::{self, CachedProvider};
use dividend_forecast::portfolio::{self, loader::DEFAULT_PORTFOLIO_PATH};
use dividend_forecast::projection::{
    AllocationPolicy, Compounding, ContributionPolicy, ProjectionConfig, ProjectionEngine, ProjectionResult,
};
use std::path::{Path, PathBuf};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliAllocation {
    Even,
    Proportional,
}

impl From<CliAllocation> for AllocationPolicy {
    fn from(value: CliAllocation) -> Self {
        match value {
            CliAllocation::Even => AllocationPolicy::Even,
            CliAllocation::Proportional => AllocationPolicy::Proportional,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCompounding {
    Annual,
    Monthly,
}

impl From<CliCompounding> for Compounding {
    fn from(value: CliCompounding) -> Self {
        match value {
            CliCompounding::Annual => Compounding::Annual,
            CliCompounding::Monthly => Compounding::Monthly,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dividend-forecast", version, about = "Project dividend income with reinvestment")]
struct Args {
    /// Portfolio CSV (Ticker,Shares,Price,AnnualDividend,...)
    #[arg(long, default_value = DEFAULT_PORTFOLIO_PATH)]
    portfolio: PathBuf,

    /// JSON projection config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of years to project
    #[arg(long)]
    years: Option<u32>,

    /// Annual price growth as a fraction, e.g. 0.03
    #[arg(long, allow_hyphen_values = true)]
    price_growth: Option<f64>,

    /// Flat dividend tax rate as a fraction
    #[arg(long)]
    tax_rate: Option<f64>,

    /// Do not withhold tax on dividends
    #[arg(long, default_value_t = false)]
    no_tax: bool,

    /// Single monthly amount split across all holdings
    #[arg(long)]
    pooled_contribution: Option<f64>,

    /// How a pooled contribution is split
    #[arg(long, value_enum, default_value_t = CliAllocation::Even)]
    allocation: CliAllocation,

    #[arg(long, value_enum)]
    compounding: Option<CliCompounding>,

    /// Calendar year of the first period (defaults to the current year)
    #[arg(long)]
    start_year: Option<i32>,

    /// Quote snapshot CSV applied to holdings before projecting
    #[arg(long)]
    quotes: Option<PathBuf>,

    /// Write per-holding rows to this CSV file
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Print the whole result as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Args {
    fn projection_config(&self) -> Result<ProjectionConfig> {
        let mut config = match &self.config {
            Some(path) => ProjectionConfig::from_json_path(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => ProjectionConfig::default(),
        };

        if let Some(years) = self.years {
            config.horizon_periods = years;
        }
        if let Some(rate) = self.price_growth {
            config.price_growth_rate = rate;
        }
        if let Some(rate) = self.tax_rate {
            config.tax_rate = rate;
        }
        if self.no_tax {
            config.apply_tax = false;
        }
        if let Some(amount) = self.pooled_contribution {
            config.contribution = ContributionPolicy::Pooled {
                monthly_amount: amount,
                allocation: self.allocation.into(),
            };
        }
        if let Some(compounding) = self.compounding {
            config.compounding = compounding.into();
        }
        config.start_year = self
            .start_year
            .or(config.start_year)
            .or_else(|| Some(chrono::Local::now().year()));

        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut holdings = portfolio::load_portfolio(&args.portfolio)
        .with_context(|| format!("failed to load portfolio {}", args.portfolio.display()))?;

    if let Some(path) = &args.quotes {
        let quotes = market_data::load_quotes(path)
            .with_context(|| format!("failed to load quotes {}", path.display()))?;
        let report = market_data::resolve_portfolio(&holdings, &CachedProvider::new(quotes));
        for (ticker, err) in &report.failed {
            eprintln!("warning: {} keeps entered values ({})", ticker, err);
        }
        holdings = report.portfolio;
    }

    let config = args.projection_config()?;
    let engine = ProjectionEngine::new(config);
    let result = engine.project(&holdings).context("projection failed")?;

    if let Some(path) = &args.csv_out {
        write_rows_csv(path, &result).with_context(|| format!("failed to write {}", path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_current_income(&holdings);
    print_table(&result);
    print_summary(&result);

    if let Some(path) = &args.csv_out {
        println!("\nFull results written to: {}", path.display());
    }
    Ok(())
}

/// This month's expected payout per holding, before any projection
fn print_current_income(holdings: &dividend_forecast::Portfolio) {
    println!("Expected income this month:");
    for holding in holdings {
        println!("  {:<16} {:>16.0}", holding.identifier, holding.monthly_income());
    }
    println!("  {:<16} {:>16.0}", "Total", holdings.monthly_income());
    println!();
}

fn print_table(result: &ProjectionResult) {
    println!("Projection Results ({} years):", result.totals.len());
    println!(
        "{:>6} {:>6} {:>16} {:>16} {:>14} {:>16} {:>18}",
        "Period", "Year", "Monthly Income", "Annual Gross", "Tax", "Reinvested", "Value"
    );
    println!("{}", "-".repeat(98));

    for totals in &result.totals {
        println!(
            "{:>6} {:>6} {:>16.0} {:>16.0} {:>14.0} {:>16.0} {:>18.0}",
            totals.period,
            totals.calendar_year.map(|y| y.to_string()).unwrap_or_default(),
            totals.monthly_income,
            totals.gross_dividends,
            totals.tax_withheld,
            totals.dividends_reinvested,
            totals.ending_value,
        );
    }
}

fn print_summary(result: &ProjectionResult) {
    let summary = result.summary();
    println!("\nSummary:");
    println!("  Holdings: {}", summary.holdings);
    println!("  Monthly income: {:.0} -> {:.0}", summary.starting_monthly_income, summary.final_monthly_income);
    println!("  Total dividends: {:.0}", summary.total_dividends);
    println!("  Total tax: {:.0}", summary.total_tax);
    println!("  Total contributions: {:.0}", summary.total_contributions);
    println!("  Final value: {:.0}", summary.final_value);
    if summary.clamped {
        println!("  Note: some values reached the {:e} ceiling and were clamped", dividend_forecast::projection::MAX_MAGNITUDE);
    }
}

fn write_rows_csv(path: &Path, result: &ProjectionResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in &result.rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
