//! Load holdings from a portfolio CSV
//!
//! Expected header (the last two columns are optional):
//! `Ticker,Shares,Price,AnnualDividend,DividendGrowth,Reinvest,MonthlyContribution,ReinvestTarget,PriceGrowth`

use super::{Holding, Portfolio};
use crate::error::LoadError;
use csv::{Reader, StringRecord};
use std::path::Path;

/// Default path of the sample portfolio
pub const DEFAULT_PORTFOLIO_PATH: &str = "data/portfolio.csv";

/// Raw CSV row matching portfolio.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "Shares")]
    shares: f64,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "AnnualDividend")]
    annual_dividend: f64,
    #[serde(rename = "DividendGrowth", default)]
    dividend_growth: Option<f64>,
    #[serde(rename = "Reinvest", default)]
    reinvest: Option<String>,
    #[serde(rename = "MonthlyContribution", default)]
    monthly_contribution: Option<f64>,
    #[serde(rename = "ReinvestTarget", default)]
    reinvest_target: Option<String>,
    #[serde(rename = "PriceGrowth", default)]
    price_growth: Option<f64>,
}

impl CsvRow {
    fn to_holding(self) -> Result<Holding, String> {
        let reinvest_dividends = match self.reinvest.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(flag) => parse_flag(flag)?,
        };

        let reinvest_target = self
            .reinvest_target
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let holding = Holding {
            identifier: self.ticker.trim().to_string(),
            shares: self.shares,
            price_per_share: self.price,
            annual_dividend_per_share: self.annual_dividend,
            dividend_growth_rate: self.dividend_growth.unwrap_or(0.0),
            reinvest_dividends,
            monthly_contribution: self.monthly_contribution.unwrap_or(0.0),
            reinvest_target,
            price_growth_rate: self.price_growth,
        };
        holding.validate().map_err(|e| e.to_string())?;
        Ok(holding)
    }
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        other => Err(format!("Unknown Reinvest flag: {}", other)),
    }
}

/// Load a portfolio from a CSV file
pub fn load_portfolio<P: AsRef<Path>>(path: P) -> Result<Portfolio, LoadError> {
    let path = path.as_ref();
    log::info!("Loading portfolio from {}", path.display());
    let reader = Reader::from_path(path)?;
    read_rows(reader)
}

/// Load a portfolio from any reader (e.g., string buffer, uploaded file)
pub fn load_portfolio_from_reader<R: std::io::Read>(reader: R) -> Result<Portfolio, LoadError> {
    read_rows(Reader::from_reader(reader))
}

/// Load the sample portfolio from the default location
pub fn load_default_portfolio() -> Result<Portfolio, LoadError> {
    load_portfolio(DEFAULT_PORTFOLIO_PATH)
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Portfolio, LoadError> {
    let headers = reader.headers()?.clone();
    let mut holdings = Vec::new();

    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: CsvRow = record.deserialize(Some(&headers))?;
        let holding = row
            .to_holding()
            .map_err(|reason| LoadError::InvalidRow { line, reason })?;
        holdings.push(holding);
    }

    let portfolio = Portfolio::from_holdings(holdings)?;
    portfolio.validate()?;
    log::debug!("Loaded {} holdings", portfolio.len());
    Ok(portfolio)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Ticker,Shares,Price,AnnualDividend,DividendGrowth,Reinvest,MonthlyContribution,ReinvestTarget,PriceGrowth
JEPQ,2000,10500,1260,0,Y,0,,
SCHD,860,11000,480,0.05,no,100000,,0.03
QYLD,300,9000,1200,0,yes,0,SCHD,
";

    #[test]
    fn test_load_from_reader() {
        let portfolio = load_portfolio_from_reader(SAMPLE.as_bytes()).expect("Failed to load portfolio");
        assert_eq!(portfolio.len(), 3);

        let jepq = portfolio.get("JEPQ").unwrap();
        assert!(jepq.reinvest_dividends);
        assert_eq!(jepq.reinvest_target, None);
        assert_eq!(jepq.price_growth_rate, None);

        let schd = portfolio.get("SCHD").unwrap();
        assert!(!schd.reinvest_dividends);
        assert_eq!(schd.monthly_contribution, 100_000.0);
        assert_eq!(schd.price_growth_rate, Some(0.03));

        let qyld = portfolio.get("QYLD").unwrap();
        assert!(qyld.redirects_dividends());
        assert_eq!(qyld.reinvestment_target(), "SCHD");
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let csv = "Ticker,Shares,Price,AnnualDividend\nO,10,55,3.1\n";
        let portfolio = load_portfolio_from_reader(csv.as_bytes()).unwrap();
        let o = portfolio.get("O").unwrap();
        assert_eq!(o.dividend_growth_rate, 0.0);
        assert!(!o.reinvest_dividends);
    }

    #[test]
    fn test_bad_row_reports_line() {
        let csv = "Ticker,Shares,Price,AnnualDividend\nO,10,55,3.1\nBAD,10,0,1\n";
        match load_portfolio_from_reader(csv.as_bytes()) {
            Err(LoadError::InvalidRow { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("price"));
            }
            other => panic!("expected InvalidRow, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let csv = "Ticker,Shares,Price,AnnualDividend,DividendGrowth,Reinvest\nO,10,55,3.1,0,maybe\n";
        assert!(matches!(
            load_portfolio_from_reader(csv.as_bytes()),
            Err(LoadError::InvalidRow { .. })
        ));
    }

    #[test]
    fn test_load_default_portfolio() {
        let portfolio = load_default_portfolio().expect("Failed to load sample portfolio");
        assert_eq!(portfolio.len(), 2);
        assert!(portfolio.monthly_income() > 0.0);
    }
}
