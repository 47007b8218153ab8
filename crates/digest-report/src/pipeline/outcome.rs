//! Typed per-ticker valuation results

use crate::format::{escape_html, format_decimal};
use crate::model::{Ticker, ValuationFact};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What the valuation step produced for one held ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValuationOutcome {
    Priced {
        company_name: String,
        price: Decimal,
        value: Decimal,
    },
    /// The lookup worked but no current price exists
    Unpriced,
    /// The lookup itself failed
    Failed { reason: String },
}

/// One line of the portfolio summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationLine {
    pub ticker: Ticker,
    pub quantity: u64,
    pub outcome: ValuationOutcome,
}

impl ValuationLine {
    /// Classify a successful lookup
    pub fn from_fact(ticker: Ticker, quantity: u64, fact: &ValuationFact) -> Self {
        let outcome = match (fact.current_price, fact.stock_value(quantity)) {
            (Some(price), Some(Ok(value))) => ValuationOutcome::Priced {
                company_name: fact.company_name.clone(),
                price,
                value,
            },
            (_, Some(Err(overflow))) => ValuationOutcome::Failed {
                reason: overflow.to_string(),
            },
            _ => ValuationOutcome::Unpriced,
        };
        Self {
            ticker,
            quantity,
            outcome,
        }
    }

    pub fn failed(ticker: Ticker, quantity: u64, reason: impl Into<String>) -> Self {
        Self {
            ticker,
            quantity,
            outcome: ValuationOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Contribution to the portfolio total
    pub fn value(&self) -> Option<Decimal> {
        match &self.outcome {
            ValuationOutcome::Priced { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn to_html(&self, currency: &str) -> String {
        match &self.outcome {
            ValuationOutcome::Priced {
                company_name,
                price,
                value,
            } => format!(
                "<p><b>{}</b> ({}): {} units @ {} {currency}/unit = {} {currency}</p>",
                escape_html(company_name),
                self.ticker,
                self.quantity,
                format_decimal(*price, 2),
                format_decimal(*value, 2),
            ),
            ValuationOutcome::Unpriced => format!(
                "<p><b>{}</b> - Price information not available</p>",
                self.ticker
            ),
            ValuationOutcome::Failed { reason } => format!(
                "<p>An error occurred with {}: {}</p>",
                self.ticker,
                escape_html(reason)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_priced_line() {
        let fact = ValuationFact::new("Apple Inc.").with_prices(dec!(150), dec!(145));
        let line = ValuationLine::from_fact(ticker("AAPL"), 10, &fact);

        assert_eq!(line.value(), Some(dec!(1500)));
        assert_eq!(
            line.to_html("USD"),
            "<p><b>Apple Inc.</b> (AAPL): 10 units @ 150.00 USD/unit = 1,500.00 USD</p>"
        );
    }

    #[test]
    fn test_unpriced_line() {
        let line = ValuationLine::from_fact(ticker("ZZZZ"), 1, &ValuationFact::new("ZZZZ"));
        assert_eq!(line.outcome, ValuationOutcome::Unpriced);
        assert_eq!(line.value(), None);
        assert_eq!(
            line.to_html("USD"),
            "<p><b>ZZZZ</b> - Price information not available</p>"
        );
    }

    #[test]
    fn test_failed_line_escapes_reason() {
        let line = ValuationLine::failed(ticker("AAPL"), 3, "HTTP 503: <html>");
        assert_eq!(line.value(), None);
        assert_eq!(
            line.to_html("USD"),
            "<p>An error occurred with AAPL: HTTP 503: &lt;html&gt;</p>"
        );
    }

    #[test]
    fn test_overflowing_value_is_failed() {
        let fact = ValuationFact::new("Big").with_prices(dec!(10000000000), dec!(1));
        let line = ValuationLine::from_fact(ticker("BIG"), u64::MAX, &fact);
        assert_eq!(
            line.outcome,
            ValuationOutcome::Failed {
                reason: "value overflow".to_string()
            }
        );
        assert_eq!(line.value(), None);
    }
}
