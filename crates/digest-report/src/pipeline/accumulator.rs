//! Per-run aggregation

use super::outcome::{ValuationLine, ValuationOutcome};
use crate::format::format_money;
use crate::model::{AnalysisSection, Ticker, ValuationFact, ValueOverflow};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::warn;
use uuid::Uuid;

/// Result of valuing every held position
///
/// `total_value` only changes through [`PortfolioValuation::record`], so
/// it always equals the sum of the priced lines. A line whose value would
/// overflow the total is recorded as failed instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioValuation {
    lines: Vec<ValuationLine>,
    total_value: Decimal,
    facts: BTreeMap<Ticker, ValuationFact>,
}

impl PortfolioValuation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line, and retain the fact for header reuse when one exists
    pub fn record(&mut self, mut line: ValuationLine, fact: Option<ValuationFact>) {
        if let Some(value) = line.value() {
            match self.total_value.checked_add(value) {
                Some(total) => self.total_value = total,
                None => {
                    warn!(ticker = %line.ticker, "Portfolio total overflowed, excluding position");
                    line.outcome = ValuationOutcome::Failed {
                        reason: ValueOverflow.to_string(),
                    };
                }
            }
        }
        if let Some(fact) = fact {
            self.facts.insert(line.ticker.clone(), fact);
        }
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[ValuationLine] {
        &self.lines
    }

    pub fn total_value(&self) -> Decimal {
        self.total_value
    }

    pub fn fact(&self, ticker: &Ticker) -> Option<&ValuationFact> {
        self.facts.get(ticker)
    }

    /// Company name → position value, for priced holdings
    ///
    /// Tickers sharing a company name are summed.
    pub fn chart_values(&self) -> BTreeMap<String, Decimal> {
        let mut values = BTreeMap::new();
        for line in &self.lines {
            if let ValuationOutcome::Priced {
                company_name, value, ..
            } = &line.outcome
            {
                let entry = values.entry(company_name.clone()).or_insert(Decimal::ZERO);
                *entry = entry.checked_add(*value).unwrap_or(Decimal::MAX);
            }
        }
        values
    }

    /// The summary block: heading, one paragraph per line, then the total
    pub fn summary_html(&self, currency: &str) -> String {
        let mut html = String::from("<h2>Portfolio Summary</h2>\n");
        for line in &self.lines {
            html.push_str(&line.to_html(currency));
            html.push('\n');
        }
        html.push_str(&format!(
            "<p><b>Total Portfolio Value: {}</b></p>",
            format_money(self.total_value, currency)
        ));
        html
    }
}

/// Everything a run collects before assembly
#[derive(Debug, Clone)]
pub struct ReportAccumulator {
    run_id: Uuid,
    valuation: PortfolioValuation,
    sections: Vec<AnalysisSection>,
}

impl ReportAccumulator {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            valuation: PortfolioValuation::new(),
            sections: Vec::new(),
        }
    }

    pub fn set_valuation(&mut self, valuation: PortfolioValuation) {
        self.valuation = valuation;
    }

    pub fn extend_sections(&mut self, sections: impl IntoIterator<Item = AnalysisSection>) {
        self.sections.extend(sections);
    }

    pub fn valuation(&self) -> &PortfolioValuation {
        &self.valuation
    }

    pub fn into_parts(self) -> (Uuid, PortfolioValuation, Vec<AnalysisSection>) {
        (self.run_id, self.valuation, self.sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    fn priced(symbol: &str, name: &str, qty: u64, price: Decimal) -> (ValuationLine, ValuationFact) {
        let fact = ValuationFact::new(name).with_prices(price, price);
        (ValuationLine::from_fact(ticker(symbol), qty, &fact), fact)
    }

    #[test]
    fn test_total_excludes_unpriced_and_failed() {
        let mut valuation = PortfolioValuation::new();
        let (line, fact) = priced("AAPL", "Apple Inc.", 10, dec!(150));
        valuation.record(line, Some(fact));

        let unknown = ValuationFact::new("ZZZZ");
        valuation.record(ValuationLine::from_fact(ticker("ZZZZ"), 4, &unknown), Some(unknown));
        valuation.record(ValuationLine::failed(ticker("MSFT"), 5, "timeout"), None);

        assert_eq!(valuation.total_value(), dec!(1500));
        assert_eq!(valuation.lines().len(), 3);
        assert!(valuation.fact(&ticker("AAPL")).is_some());
        assert!(valuation.fact(&ticker("ZZZZ")).is_some());
        assert!(valuation.fact(&ticker("MSFT")).is_none());
    }

    #[test]
    fn test_total_overflow_marks_line_failed() {
        let mut valuation = PortfolioValuation::new();
        let (line, fact) = priced("AAPL", "Apple Inc.", 10, dec!(150));
        valuation.record(line, Some(fact));

        let huge = ValuationLine {
            ticker: ticker("BIG"),
            quantity: 1,
            outcome: ValuationOutcome::Priced {
                company_name: "Big".to_string(),
                price: Decimal::MAX,
                value: Decimal::MAX,
            },
        };
        valuation.record(huge, None);

        assert_eq!(valuation.total_value(), dec!(1500));
        assert!(matches!(
            valuation.lines()[1].outcome,
            ValuationOutcome::Failed { .. }
        ));
        assert_eq!(valuation.chart_values().len(), 1);
    }

    #[test]
    fn test_summary_html() {
        let mut valuation = PortfolioValuation::new();
        let (line, fact) = priced("AAPL", "Apple Inc.", 10, dec!(150));
        valuation.record(line, Some(fact));

        let html = valuation.summary_html("USD");
        assert!(html.starts_with("<h2>Portfolio Summary</h2>"));
        assert!(html.contains("(AAPL): 10 units @ 150.00 USD/unit = 1,500.00 USD"));
        assert!(html.ends_with("<p><b>Total Portfolio Value: 1,500.00 USD</b></p>"));
    }

    #[test]
    fn test_empty_summary_has_zero_total() {
        let html = PortfolioValuation::new().summary_html("USD");
        assert!(html.contains("Total Portfolio Value: 0.00 USD"));
    }

    #[test]
    fn test_chart_values_merge_shared_company_names() {
        let mut valuation = PortfolioValuation::new();
        for (symbol, qty) in [("GOOG", 2), ("GOOGL", 3)] {
            let (line, fact) = priced(symbol, "Alphabet Inc.", qty, dec!(100));
            valuation.record(line, Some(fact));
        }
        let unknown = ValuationFact::new("ZZZZ");
        valuation.record(ValuationLine::from_fact(ticker("ZZZZ"), 1, &unknown), Some(unknown));

        let values = valuation.chart_values();
        assert_eq!(values.len(), 1);
        assert_eq!(values["Alphabet Inc."], dec!(500));
    }

    #[test]
    fn test_accumulator_keeps_section_order() {
        use crate::model::{Narrative, SectionHeader};

        let run_id = Uuid::new_v4();
        let mut acc = ReportAccumulator::new(run_id);
        for batch in [["AAPL", "MSFT"], ["NVDA", "TSLA"]] {
            acc.extend_sections(batch.map(|symbol| {
                AnalysisSection::new(
                    ticker(symbol),
                    SectionHeader::news_only(symbol, ticker(symbol)),
                    Narrative::unavailable("no articles"),
                )
            }));
        }

        let (id, _, sections) = acc.into_parts();
        assert_eq!(id, run_id);
        let order: Vec<&str> = sections.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT", "NVDA", "TSLA"]);
    }
}
