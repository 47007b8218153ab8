//! The assembled report document

mod assembler;
mod chart;

pub use assembler::ReportAssembler;
pub use chart::{ChartRenderer, SvgBarChart};

use crate::format::escape_html;
use crate::model::AnalysisSection;
use crate::pipeline::ValuationLine;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A finished report, ready for delivery
#[derive(Debug, Clone)]
pub struct Report {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub valuation_summary_html: String,
    pub total_value: Decimal,
    pub valuation_lines: Vec<ValuationLine>,
    /// In ticker order
    pub sections: Vec<AnalysisSection>,
    /// Embeddable chart markup, absent when nothing was priced
    pub visualization: Option<String>,
}

impl Report {
    /// Whether at least one ticker got as far as narrative generation
    ///
    /// A report where every ticker lacked news carries nothing worth sending.
    pub fn is_deliverable(&self) -> bool {
        self.sections.iter().any(|s| s.narrative.reached_generation())
    }

    /// Sections with generated text
    pub fn generated_count(&self) -> usize {
        self.sections.iter().filter(|s| s.narrative.is_generated()).count()
    }

    /// Full HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::from("<html>\n<body>\n");
        html.push_str(&self.valuation_summary_html);
        html.push_str("\n<hr>\n");

        if let Some(chart) = &self.visualization {
            html.push_str("<div class=\"portfolio-chart\">\n");
            html.push_str(chart);
            html.push_str("\n</div>\n<hr>\n");
        }

        for section in &self.sections {
            html.push_str(&section_html(section));
            html.push_str("\n<hr>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn section_html(section: &AnalysisSection) -> String {
    let paragraphs = escape_html(section.narrative_text().trim()).replace("\r\n", "\n").replace('\n', "<br>\n");
    format!(
        "<p><b>{}</b></p>\n<p>{paragraphs}</p>",
        escape_html(&section.header_text())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Narrative, SectionHeader, Ticker};

    fn section(symbol: &str, narrative: Narrative) -> AnalysisSection {
        let ticker = Ticker::parse(symbol).unwrap();
        AnalysisSection::new(
            ticker.clone(),
            SectionHeader::NewsOnly {
                company_name: symbol.to_string(),
                ticker,
            },
            narrative,
        )
    }

    fn report(sections: Vec<AnalysisSection>) -> Report {
        Report {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            valuation_summary_html: "<h2>Portfolio Summary</h2>".to_string(),
            total_value: Decimal::ZERO,
            valuation_lines: Vec::new(),
            sections,
            visualization: None,
        }
    }

    #[test]
    fn test_deliverable_needs_a_generation_attempt() {
        let unavailable = report(vec![section("AAPL", Narrative::unavailable("no news"))]);
        assert!(!unavailable.is_deliverable());

        let failed = report(vec![
            section("AAPL", Narrative::unavailable("no news")),
            section("MSFT", Narrative::generation_failed("quota")),
        ]);
        assert!(failed.is_deliverable());
        assert_eq!(failed.generated_count(), 0);
    }

    #[test]
    fn test_html_escapes_and_keeps_line_breaks() {
        let r = report(vec![section(
            "AAPL",
            Narrative::Generated("Revenue <up>\nMargins & costs".to_string()),
        )]);
        let html = r.to_html();

        assert!(html.contains("<p><b>AAPL - News Analysis</b></p>"));
        assert!(html.contains("Revenue &lt;up&gt;<br>\nMargins &amp; costs"));
        assert!(!html.contains("portfolio-chart"));
    }

    #[test]
    fn test_sections_follow_summary_in_order() {
        let mut r = report(vec![
            section("AAPL", Narrative::Generated("a".into())),
            section("MSFT", Narrative::Generated("m".into())),
        ]);
        r.visualization = Some("<svg></svg>".to_string());
        let html = r.to_html();

        let summary = html.find("Portfolio Summary").unwrap();
        let chart = html.find("<svg>").unwrap();
        let aapl = html.find("AAPL - News").unwrap();
        let msft = html.find("MSFT - News").unwrap();
        assert!(summary < chart && chart < aapl && aapl < msft);
        assert_eq!(html.matches("<hr>").count(), 4);
    }
}
