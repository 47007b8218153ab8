//! Terminal summary of a finished run

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use digest_report::format::format_money;
use digest_report::{Narrative, Report, ValuationOutcome};

/// One row per analyzed ticker plus a total row
pub fn render(report: &Report, currency: &str) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Ticker", "Position", "Value", "Analysis"]);

    for section in &report.sections {
        let line = report
            .valuation_lines
            .iter()
            .find(|line| line.ticker == section.ticker);

        let (position, value) = match line.map(|l| (l.quantity, &l.outcome)) {
            Some((quantity, ValuationOutcome::Priced { price, value, .. })) => (
                format!("{quantity} @ {}", format_money(*price, currency)),
                format_money(*value, currency),
            ),
            Some((quantity, ValuationOutcome::Unpriced)) => {
                (format!("{quantity} units"), "price unavailable".to_string())
            }
            Some((quantity, ValuationOutcome::Failed { .. })) => {
                (format!("{quantity} units"), "lookup failed".to_string())
            }
            None => ("watch only".to_string(), "-".to_string()),
        };

        let analysis = match &section.narrative {
            Narrative::Generated(_) => "generated",
            Narrative::Unavailable { .. } => "no news",
            Narrative::GenerationFailed { .. } => "generation failed",
        };

        table.add_row(vec![
            Cell::new(section.ticker.as_str()),
            Cell::new(position),
            Cell::new(value),
            Cell::new(analysis),
        ]);
    }

    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(""),
        Cell::new(format_money(report.total_value, currency)),
        Cell::new(""),
    ]);

    table.to_string()
}
