//! Held positions, watch-only tickers and their deduplicated union

use super::Ticker;
use crate::error::ReportError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Ticker → held quantity, iterated in ticker order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    holdings: BTreeMap<Ticker, u64>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a holding, returning the previous quantity
    pub fn insert(&mut self, ticker: Ticker, quantity: u64) -> Option<u64> {
        self.holdings.insert(ticker, quantity)
    }

    pub fn quantity(&self, ticker: &Ticker) -> Option<u64> {
        self.holdings.get(ticker).copied()
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.holdings.contains_key(ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, u64)> {
        self.holdings.iter().map(|(t, q)| (t, *q))
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

impl FromIterator<(Ticker, u64)> for Portfolio {
    fn from_iter<I: IntoIterator<Item = (Ticker, u64)>>(iter: I) -> Self {
        Self {
            holdings: iter.into_iter().collect(),
        }
    }
}

/// Tickers requested for news analysis only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchList {
    tickers: BTreeSet<Ticker>,
}

impl WatchList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the ticker was already present
    pub fn insert(&mut self, ticker: Ticker) -> bool {
        self.tickers.insert(ticker)
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.tickers.contains(ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticker> {
        self.tickers.iter()
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl FromIterator<Ticker> for WatchList {
    fn from_iter<I: IntoIterator<Item = Ticker>>(iter: I) -> Self {
        Self {
            tickers: iter.into_iter().collect(),
        }
    }
}

/// Parse a held quantity
///
/// Whole numbers are accepted, including float spellings such as `"10.0"`
/// that spreadsheet tools write for integer columns containing blanks.
pub fn parse_quantity(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(quantity) = raw.parse::<u64>() {
        return Some(quantity);
    }

    let value: Decimal = raw.parse().ok()?;
    if value.is_sign_negative() || !value.fract().is_zero() {
        return None;
    }
    value.to_u64()
}

/// Collects raw (ticker, units) rows into a [`Portfolio`] and [`WatchList`]
///
/// Rows with a blank ticker are ignored. Rows with an invalid ticker or an
/// unparseable quantity are dropped and logged; they never fail collection.
#[derive(Debug, Default)]
pub struct PortfolioInput {
    portfolio: Portfolio,
    watchlist: WatchList,
    rejected: Vec<ReportError>,
}

impl PortfolioInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an iterator of `(ticker, units)` rows
    pub fn from_rows<I, T, U>(rows: I) -> Self
    where
        I: IntoIterator<Item = (T, Option<U>)>,
        T: AsRef<str>,
        U: AsRef<str>,
    {
        let mut input = Self::new();
        for (ticker, units) in rows {
            input.add_row(ticker.as_ref(), units.as_ref().map(AsRef::as_ref));
        }
        input
    }

    /// Add one row; returns whether it was accepted
    pub fn add_row(&mut self, ticker: &str, units: Option<&str>) -> bool {
        if ticker.trim().is_empty() {
            return false;
        }

        let ticker = match Ticker::parse(ticker) {
            Ok(t) => t,
            Err(e) => {
                warn!("Dropping row: {e}");
                self.rejected.push(e);
                return false;
            }
        };

        match units.map(str::trim).filter(|u| !u.is_empty()) {
            None => {
                self.watchlist.insert(ticker);
            }
            Some(raw) => match parse_quantity(raw) {
                Some(quantity) => {
                    if let Some(previous) = self.portfolio.insert(ticker.clone(), quantity) {
                        warn!("{ticker} entered twice; using {quantity} units instead of {previous}");
                    }
                }
                None => {
                    let err = ReportError::InvalidQuantity {
                        ticker: ticker.to_string(),
                        value: raw.to_string(),
                    };
                    warn!("Dropping row: {err}");
                    self.rejected.push(err);
                    return false;
                }
            },
        }
        true
    }

    /// Rows dropped so far
    pub fn rejected(&self) -> &[ReportError] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.portfolio.is_empty() && self.watchlist.is_empty()
    }

    pub fn into_parts(self) -> (Portfolio, WatchList) {
        (self.portfolio, self.watchlist)
    }
}

/// One ticker to analyze, with its quantity when held
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerEntry {
    pub ticker: Ticker,
    pub quantity: Option<u64>,
}

impl TickerEntry {
    pub fn is_held(&self) -> bool {
        self.quantity.is_some()
    }
}

/// The ordered, deduplicated union of portfolio and watch-list tickers
///
/// Built once per run. A ticker present in both inputs appears once, as held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerUniverse {
    entries: Vec<TickerEntry>,
}

impl TickerUniverse {
    pub fn new(portfolio: &Portfolio, watchlist: &WatchList) -> Self {
        let mut merged: BTreeMap<&Ticker, Option<u64>> =
            watchlist.iter().map(|t| (t, None)).collect();
        for (ticker, quantity) in portfolio.iter() {
            merged.insert(ticker, Some(quantity));
        }

        Self {
            entries: merged
                .into_iter()
                .map(|(ticker, quantity)| TickerEntry {
                    ticker: ticker.clone(),
                    quantity,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TickerEntry> {
        self.entries.iter()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.entries.iter().map(|e| &e.ticker)
    }
}

impl IntoIterator for TickerUniverse {
    type Item = TickerEntry;
    type IntoIter = std::vec::IntoIter<TickerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
