//! Per-ticker market facts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Price and fundamentals for one ticker at lookup time
///
/// Every numeric field is optional: an unknown ticker yields a fact with no
/// prices, and fundamentals are frequently missing for funds and indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationFact {
    pub company_name: String,
    pub current_price: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    pub market_cap: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
    pub eps: Option<Decimal>,
    /// Annual dividend yield, as a percentage (1.5 means 1.5%)
    pub dividend_yield: Option<Decimal>,
}

impl ValuationFact {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..Self::default()
        }
    }

    pub fn with_prices(mut self, current: Decimal, previous_close: Decimal) -> Self {
        self.current_price = Some(current);
        self.previous_close = Some(previous_close);
        self
    }

    pub fn with_market_cap(mut self, market_cap: Decimal) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    pub fn with_pe_ratio(mut self, pe_ratio: Decimal) -> Self {
        self.pe_ratio = Some(pe_ratio);
        self
    }

    pub fn with_eps(mut self, eps: Decimal) -> Self {
        self.eps = Some(eps);
        self
    }

    pub fn with_dividend_yield(mut self, dividend_yield: Decimal) -> Self {
        self.dividend_yield = Some(dividend_yield);
        self
    }

    pub fn has_price(&self) -> bool {
        self.current_price.is_some()
    }

    /// Change since the previous close, in currency units
    pub fn dollar_gain(&self) -> Option<Decimal> {
        self.current_price?.checked_sub(self.previous_close?)
    }

    /// Change since the previous close, as a percentage
    ///
    /// `None` when the previous close is missing or zero, or the ratio does
    /// not fit in a `Decimal`.
    pub fn percent_gain(&self) -> Option<Decimal> {
        let previous = self.previous_close?;
        if previous.is_zero() {
            return None;
        }
        self.dollar_gain()?
            .checked_div(previous)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// Value of `quantity` units at the current price
    ///
    /// `None` without a price; `Some(Err)` when the product overflows.
    pub fn stock_value(&self, quantity: u64) -> Option<Result<Decimal, ValueOverflow>> {
        self.current_price
            .map(|price| price.checked_mul(Decimal::from(quantity)).ok_or(ValueOverflow))
    }
}

/// A position value too large to represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value overflow")]
pub struct ValueOverflow;
