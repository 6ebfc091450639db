//! Projection run configuration

use crate::error::{LoadError, ProjectionError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Flat withholding rate on dividends (15.4%)
pub const DEFAULT_TAX_RATE: f64 = 0.154;

/// Number of yearly periods projected when nothing else is configured
pub const DEFAULT_HORIZON_PERIODS: u32 = 10;

fn default_horizon_periods() -> u32 { DEFAULT_HORIZON_PERIODS }
fn default_tax_rate() -> f64 { DEFAULT_TAX_RATE }
fn default_true() -> bool { true }

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Number of yearly periods to project
    #[serde(default = "default_horizon_periods")]
    pub horizon_periods: u32,

    /// Annual price growth applied to every holding without its own override
    #[serde(default)]
    pub price_growth_rate: f64,

    /// Flat withholding on dividend income
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,

    /// Whether `tax_rate` is applied at all
    #[serde(default = "default_true")]
    pub apply_tax: bool,

    /// Where new cash comes from each month
    #[serde(default)]
    pub contribution: ContributionPolicy,

    /// Reinvestment frequency within a year
    #[serde(default)]
    pub compounding: Compounding,

    /// Calendar year of period 1, used only for labelling rows
    #[serde(default)]
    pub start_year: Option<i32>,
}

/// Source of external cash added to holdings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContributionPolicy {
    /// Each holding receives its own `monthly_contribution`
    #[default]
    PerHolding,
    /// One global monthly amount split across all holdings
    Pooled {
        monthly_amount: f64,
        #[serde(default)]
        allocation: AllocationPolicy,
    },
}

/// How a pooled contribution is divided across holdings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Equal share for every holding in the portfolio
    #[default]
    Even,
    /// Share weighted by start-of-period market value
    Proportional,
}

/// Reinvestment frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    /// One purchase step per year
    #[default]
    Annual,
    /// Twelve purchase steps per year, aggregated to yearly rows
    Monthly,
}

impl Compounding {
    /// Number of purchase steps per yearly period
    pub fn steps_per_period(&self) -> u32 {
        match self {
            Compounding::Annual => 1,
            Compounding::Monthly => 12,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_periods: DEFAULT_HORIZON_PERIODS,
            price_growth_rate: 0.0,
            tax_rate: DEFAULT_TAX_RATE,
            apply_tax: true,
            contribution: ContributionPolicy::PerHolding,
            compounding: Compounding::Annual,
            start_year: None,
        }
    }
}

impl ProjectionConfig {
    /// Create a config with the given horizon and defaults elsewhere
    pub fn with_horizon(horizon_periods: u32) -> Self {
        Self {
            horizon_periods,
            ..Default::default()
        }
    }

    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        log::info!("Loading projection config from {}", path.display());
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Tax fraction actually withheld from dividends
    pub fn effective_tax_rate(&self) -> f64 {
        if self.apply_tax { self.tax_rate } else { 0.0 }
    }

    /// Calendar label for a 1-indexed period
    pub fn calendar_year(&self, period: u32) -> Option<i32> {
        let offset = i32::try_from(period).ok()?.checked_sub(1)?;
        self.start_year?.checked_add(offset)
    }

    /// Check the config before a run
    pub fn validate(&self) -> Result<(), ProjectionError> {
        if self.horizon_periods == 0 {
            return Err(ProjectionError::InvalidConfiguration(
                "horizon_periods must be at least 1".to_string(),
            ));
        }
        if !self.price_growth_rate.is_finite() || self.price_growth_rate <= -1.0 {
            return Err(ProjectionError::InvalidConfiguration(format!(
                "price_growth_rate must be greater than -1, got {}",
                self.price_growth_rate
            )));
        }
        if !(0.0..1.0).contains(&self.tax_rate) {
            return Err(ProjectionError::InvalidConfiguration(format!(
                "tax_rate must be in [0, 1), got {}",
                self.tax_rate
            )));
        }
        if let Some(year) = self.start_year {
            if self.calendar_year(self.horizon_periods).is_none() {
                return Err(ProjectionError::InvalidConfiguration(format!(
                    "start_year {} leaves no room for {} periods",
                    year, self.horizon_periods
                )));
            }
        }
        if let ContributionPolicy::Pooled { monthly_amount, .. } = self.contribution {
            if !monthly_amount.is_finite() || monthly_amount < 0.0 {
                return Err(ProjectionError::InvalidConfiguration(format!(
                    "pooled monthly_amount must be non-negative, got {}",
                    monthly_amount
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_defaults() {
        let config: ProjectionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ProjectionConfig::default());
        assert_eq!(config.tax_rate, 0.154);
        assert!(config.apply_tax);
    }

    #[test]
    fn test_json_pooled_contribution() {
        let json = r#"{
            "horizon_periods": 30,
            "contribution": { "type": "pooled", "monthly_amount": 500000, "allocation": "proportional" },
            "compounding": "monthly"
        }"#;
        let config: ProjectionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.horizon_periods, 30);
        assert_eq!(config.compounding, Compounding::Monthly);
        assert_eq!(
            config.contribution,
            ContributionPolicy::Pooled { monthly_amount: 500_000.0, allocation: AllocationPolicy::Proportional }
        );
    }

    #[test]
    fn test_validate() {
        assert!(ProjectionConfig::with_horizon(0).validate().is_err());
        assert!(ProjectionConfig::with_horizon(40).validate().is_ok());
        assert!(ProjectionConfig { tax_rate: 1.0, ..Default::default() }.validate().is_err());
        assert!(ProjectionConfig { price_growth_rate: -1.5, ..Default::default() }.validate().is_err());
        assert!(ProjectionConfig {
            contribution: ContributionPolicy::Pooled { monthly_amount: -1.0, allocation: AllocationPolicy::Even },
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_effective_tax_and_calendar() {
        let mut config = ProjectionConfig { start_year: Some(2026), ..Default::default() };
        assert_eq!(config.effective_tax_rate(), 0.154);
        assert_eq!(config.calendar_year(1), Some(2026));
        assert_eq!(config.calendar_year(10), Some(2035));
        config.apply_tax = false;
        assert_eq!(config.effective_tax_rate(), 0.0);
    }

    #[test]
    fn test_start_year_near_limit() {
        let config = ProjectionConfig { start_year: Some(i32::MAX - 1), ..ProjectionConfig::with_horizon(2) };
        assert_eq!(config.calendar_year(2), Some(i32::MAX));
        assert_eq!(config.calendar_year(3), None);
        assert!(config.validate().is_ok());

        let config = ProjectionConfig { start_year: Some(i32::MAX), ..ProjectionConfig::with_horizon(10) };
        assert!(config.validate().is_err());
    }
}
