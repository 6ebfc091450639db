//! Dividend Forecast - compounding dividend-reinvestment projections
//!
//! This library provides:
//! - Strongly typed holdings and portfolios with CSV loading
//! - A pure yearly projection engine (tax, reinvestment, redirection, contributions)
//! - Saturating arithmetic for long horizons
//! - Market-data provider interface with caching and retry
//! - Parallel multi-scenario runs

pub mod error;
pub mod portfolio;
pub mod projection;
pub mod market_data;
pub mod scenario;

// Re-export commonly used types
pub use error::{LoadError, MarketDataError, ProjectionError};
pub use portfolio::{Holding, Portfolio};
pub use projection::{project, ProjectionConfig, ProjectionEngine, ProjectionResult, HoldingPeriodRow, PeriodTotals};
pub use market_data::{MarketDataProvider, Quote};
pub use scenario::{Scenario, ScenarioRunner};
