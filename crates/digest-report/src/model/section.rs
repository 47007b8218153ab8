//! Per-ticker analysis sections

use super::{Ticker, ValuationFact};
use crate::format::{format_money, format_percent, format_signed};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the narrative step for one ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Narrative {
    /// Text returned by the generator
    Generated(String),
    /// No articles or the news lookup failed; generation was not attempted
    Unavailable { reason: String },
    /// Generation was attempted and failed
    GenerationFailed { reason: String },
}

impl Narrative {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn generation_failed(reason: impl Into<String>) -> Self {
        Self::GenerationFailed {
            reason: reason.into(),
        }
    }

    /// Whether the generator was called for this ticker
    pub fn reached_generation(&self) -> bool {
        !matches!(self, Self::Unavailable { .. })
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }

    /// Plain text shown under the section header
    pub fn text(&self) -> String {
        match self {
            Self::Generated(text) => text.clone(),
            Self::Unavailable { reason } => format!("No analysis available: {reason}"),
            Self::GenerationFailed { reason } => {
                format!("Analysis could not be generated: {reason}")
            }
        }
    }
}

/// Section heading, with pricing when the ticker is held and priced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionHeader {
    Priced {
        company_name: String,
        current_price: Decimal,
        dollar_gain: Decimal,
        percent_gain: Decimal,
        currency: String,
    },
    NewsOnly {
        company_name: String,
        ticker: Ticker,
    },
}

impl SectionHeader {
    /// Priced heading, or `None` unless price and both gains are known
    pub fn priced(company_name: impl Into<String>, fact: &ValuationFact, currency: impl Into<String>) -> Option<Self> {
        Some(Self::Priced {
            current_price: fact.current_price?,
            dollar_gain: fact.dollar_gain()?,
            percent_gain: fact.percent_gain()?,
            company_name: company_name.into(),
            currency: currency.into(),
        })
    }

    pub fn news_only(company_name: impl Into<String>, ticker: Ticker) -> Self {
        Self::NewsOnly {
            company_name: company_name.into(),
            ticker,
        }
    }

    pub fn company_name(&self) -> &str {
        match self {
            Self::Priced { company_name, .. } | Self::NewsOnly { company_name, .. } => {
                company_name
            }
        }
    }

    pub fn is_priced(&self) -> bool {
        matches!(self, Self::Priced { .. })
    }
}

impl fmt::Display for SectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Priced {
                company_name,
                current_price,
                dollar_gain,
                percent_gain,
                currency,
            } => write!(
                f,
                "{company_name} {} {} {currency} ({})",
                format_money(*current_price, currency),
                format_signed(*dollar_gain, 2),
                format_percent(*percent_gain)
            ),
            Self::NewsOnly {
                company_name,
                ticker,
            } => {
                if company_name == ticker.as_str() {
                    write!(f, "{ticker} - News Analysis")
                } else {
                    write!(f, "{company_name} ({ticker}) - News Analysis")
                }
            }
        }
    }
}

/// One ticker's block in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub ticker: Ticker,
    pub header: SectionHeader,
    pub narrative: Narrative,
}

impl AnalysisSection {
    pub fn new(ticker: Ticker, header: SectionHeader, narrative: Narrative) -> Self {
        Self {
            ticker,
            header,
            narrative,
        }
    }

    pub fn header_text(&self) -> String {
        self.header.to_string()
    }

    pub fn narrative_text(&self) -> String {
        self.narrative.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_priced_header() {
        let header = SectionHeader::Priced {
            company_name: "Apple Inc.".to_string(),
            current_price: dec!(150),
            dollar_gain: dec!(5),
            percent_gain: dec!(3.448275),
            currency: "USD".to_string(),
        };
        assert_eq!(header.to_string(), "Apple Inc. 150.00 USD +5.00 USD (+3.45%)");
    }

    #[test]
    fn test_priced_header_with_large_loss() {
        let fact = ValuationFact::new("Big Co").with_prices(dec!(12345.6), dec!(13549.7));
        let header = SectionHeader::priced("Big Co", &fact, "USD").unwrap();
        assert_eq!(header.to_string(), "Big Co 12,345.60 USD -1,204.10 USD (-8.89%)");
    }

    #[test]
    fn test_priced_header_needs_both_gains() {
        let mut no_close = ValuationFact::new("Apple Inc.");
        no_close.current_price = Some(dec!(150));
        assert_eq!(SectionHeader::priced("Apple Inc.", &no_close, "USD"), None);

        let zero_close = ValuationFact::new("Apple Inc.").with_prices(dec!(150), Decimal::ZERO);
        assert_eq!(SectionHeader::priced("Apple Inc.", &zero_close, "USD"), None);

        assert_eq!(SectionHeader::priced("Apple Inc.", &ValuationFact::new("Apple Inc."), "USD"), None);
    }

    #[test]
    fn test_news_only_header_has_no_figures() {
        let ticker = Ticker::parse("TSLA").unwrap();
        let header = SectionHeader::NewsOnly {
            company_name: "Tesla, Inc.".to_string(),
            ticker: ticker.clone(),
        };
        let text = header.to_string();
        assert_eq!(text, "Tesla, Inc. (TSLA) - News Analysis");
        assert!(!text.contains("USD"));

        let bare = SectionHeader::NewsOnly {
            company_name: "TSLA".to_string(),
            ticker,
        };
        assert_eq!(bare.to_string(), "TSLA - News Analysis");
    }

    #[test]
    fn test_narrative_text_and_generation_flag() {
        let unavailable = Narrative::unavailable("no articles found");
        assert_eq!(unavailable.text(), "No analysis available: no articles found");
        assert!(!unavailable.reached_generation());

        let failed = Narrative::generation_failed("quota exceeded");
        assert!(failed.text().contains("quota exceeded"));
        assert!(failed.reached_generation());
        assert!(!failed.is_generated());

        assert!(Narrative::Generated("ok".into()).is_generated());
    }
}
