//! Turns a run's accumulated results into a [`Report`]

use super::{ChartRenderer, Report};
use crate::pipeline::ReportAccumulator;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

/// Builds the report document from a [`ReportAccumulator`]
pub struct ReportAssembler {
    currency: String,
    chart: Option<Arc<dyn ChartRenderer>>,
}

impl ReportAssembler {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            chart: None,
        }
    }

    pub fn with_chart(mut self, chart: Arc<dyn ChartRenderer>) -> Self {
        self.chart = Some(chart);
        self
    }

    /// `None` when no sections were produced
    pub fn assemble(&self, acc: ReportAccumulator) -> Option<Report> {
        let (run_id, valuation, sections) = acc.into_parts();
        if sections.is_empty() {
            return None;
        }

        let visualization = self.chart.as_ref().and_then(|chart| {
            let values = valuation.chart_values();
            if values.is_empty() {
                return None;
            }
            chart
                .render(&values)
                .inspect_err(|e| warn!("Chart omitted: {e}"))
                .ok()
        });

        Some(Report {
            run_id,
            generated_at: Utc::now(),
            valuation_summary_html: valuation.summary_html(&self.currency),
            total_value: valuation.total_value(),
            valuation_lines: valuation.lines().to_vec(),
            sections,
            visualization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReportError, Result};
    use crate::model::{AnalysisSection, Narrative, SectionHeader, Ticker, ValuationFact};
    use crate::pipeline::{PortfolioValuation, ValuationLine};
    use crate::report::SvgBarChart;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    struct FailingChart;

    impl ChartRenderer for FailingChart {
        fn render(&self, _values: &BTreeMap<String, Decimal>) -> Result<String> {
            Err(ReportError::ChartError("no backend".to_string()))
        }
    }

    fn accumulator(priced: bool) -> ReportAccumulator {
        let ticker = Ticker::parse("AAPL").unwrap();
        let fact = if priced {
            ValuationFact::new("Apple Inc.").with_prices(dec!(150), dec!(145))
        } else {
            ValuationFact::new("AAPL")
        };

        let mut valuation = PortfolioValuation::new();
        valuation.record(ValuationLine::from_fact(ticker.clone(), 10, &fact), Some(fact));

        let mut acc = ReportAccumulator::new(Uuid::new_v4());
        acc.set_valuation(valuation);
        acc.extend_sections([AnalysisSection::new(
            ticker.clone(),
            SectionHeader::news_only("Apple Inc.", ticker),
            Narrative::Generated("ok".to_string()),
        )]);
        acc
    }

    #[test]
    fn test_empty_sections_produce_nothing() {
        let assembler = ReportAssembler::new("USD");
        assert!(assembler.assemble(ReportAccumulator::new(Uuid::new_v4())).is_none());
    }

    #[test]
    fn test_assembles_summary_and_chart() {
        let assembler = ReportAssembler::new("USD").with_chart(Arc::new(SvgBarChart::new("USD")));
        let report = assembler.assemble(accumulator(true)).unwrap();

        assert_eq!(report.total_value, dec!(1500));
        assert!(report.valuation_summary_html.contains("Total Portfolio Value: 1,500.00 USD"));
        assert!(report.visualization.as_deref().is_some_and(|svg| svg.contains("Apple Inc.")));
    }

    #[test]
    fn test_chart_omitted_without_priced_holdings() {
        let assembler = ReportAssembler::new("USD").with_chart(Arc::new(SvgBarChart::new("USD")));
        let report = assembler.assemble(accumulator(false)).unwrap();
        assert!(report.visualization.is_none());
    }

    #[test]
    fn test_chart_failure_is_not_fatal() {
        let assembler = ReportAssembler::new("USD").with_chart(Arc::new(FailingChart));
        let report = assembler.assemble(accumulator(true)).unwrap();
        assert!(report.visualization.is_none());
        assert_eq!(report.sections.len(), 1);
    }
}
