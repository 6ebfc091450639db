//! Holding and portfolio data structures and CSV loading

mod data;
pub mod loader;

pub use data::{Holding, Portfolio};
pub use loader::{load_portfolio, load_portfolio_from_reader, load_default_portfolio};
