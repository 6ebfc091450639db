//! Projection engine for dividend-reinvestment forecasts

mod state;
mod engine;
mod cashflows;
mod config;
mod allocation;
pub mod numeric;

pub use state::HoldingState;
pub use engine::{project, ProjectionEngine};
pub use config::{
    AllocationPolicy, Compounding, ContributionPolicy, ProjectionConfig,
    DEFAULT_HORIZON_PERIODS, DEFAULT_TAX_RATE,
};
pub use cashflows::{HoldingPeriodRow, PeriodTotals, ProjectionNotice, ProjectionResult, ProjectionSummary};
pub use allocation::allocate;
pub use numeric::{MAX_MAGNITUDE, MIN_PRICE};
