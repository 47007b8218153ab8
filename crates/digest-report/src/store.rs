//! The last submitted portfolio, kept as a small CSV file
//!
//! Columns are `Ticker` and `Units`; an empty `Units` cell marks a
//! watch-only ticker. Extra columns are ignored on load.

use crate::error::Result;
use crate::model::{Portfolio, PortfolioInput, WatchList};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "Units")]
    units: Option<String>,
}

/// CSV-backed record of the previous run's inputs
#[derive(Debug, Clone)]
pub struct PortfolioStore {
    path: PathBuf,
}

impl PortfolioStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored rows; a missing file is an empty record
    ///
    /// Invalid rows are dropped the same way interactive input drops them.
    pub fn load(&self) -> Result<PortfolioInput> {
        if !self.path.exists() {
            debug!("No stored portfolio at {}", self.path.display());
            return Ok(PortfolioInput::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for row in reader.deserialize::<Row>() {
            let row = row?;
            rows.push((row.ticker, row.units));
        }

        let input = PortfolioInput::from_rows(rows);
        debug!(
            rejected = input.rejected().len(),
            "Loaded stored portfolio from {}",
            self.path.display()
        );
        Ok(input)
    }

    /// Replace the stored record
    pub fn save(&self, portfolio: &Portfolio, watchlist: &WatchList) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        for (ticker, quantity) in portfolio.iter() {
            writer.serialize(Row {
                ticker: ticker.to_string(),
                units: Some(quantity.to_string()),
            })?;
        }
        for ticker in watchlist.iter() {
            writer.serialize(Row {
                ticker: ticker.to_string(),
                units: None,
            })?;
        }
        writer.flush()?;

        info!(
            held = portfolio.len(),
            watched = watchlist.len(),
            "Saved portfolio to {}",
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ticker;

    fn t(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PortfolioStore::new(dir.path().join("portfolio.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = PortfolioStore::new(dir.path().join("portfolio.csv"));

        let portfolio: Portfolio = [(t("AAPL"), 10), (t("MSFT"), 5)].into_iter().collect();
        let watchlist: WatchList = [t("TSLA")].into_iter().collect();
        store.save(&portfolio, &watchlist).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "Ticker,Units\nAAPL,10\nMSFT,5\nTSLA,\n");

        let (loaded_portfolio, loaded_watchlist) = store.load().unwrap().into_parts();
        assert_eq!(loaded_portfolio, portfolio);
        assert_eq!(loaded_watchlist, watchlist);
    }

    #[test]
    fn test_load_tolerates_float_units_index_column_and_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.csv");
        std::fs::write(&path, ",Ticker,Units\n0,AAPL,10.0\n1,TSLA,\n2,MSFT,abc\n").unwrap();

        let input = PortfolioStore::new(&path).load().unwrap();
        assert_eq!(input.rejected().len(), 1);

        let (portfolio, watchlist) = input.into_parts();
        assert_eq!(portfolio.quantity(&t("AAPL")), Some(10));
        assert!(watchlist.contains(&t("TSLA")));
        assert!(!portfolio.contains(&t("MSFT")));
    }
}
