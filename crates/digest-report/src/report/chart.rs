//! Portfolio allocation chart

use crate::error::{ReportError, Result};
use crate::format::{escape_html, format_money};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Renders company name → position value as embeddable markup
pub trait ChartRenderer: Send + Sync {
    fn render(&self, values: &BTreeMap<String, Decimal>) -> Result<String>;
}

/// Horizontal bar chart as inline SVG
///
/// Bars are scaled against the largest position and listed in name order.
#[derive(Debug, Clone)]
pub struct SvgBarChart {
    currency: String,
    width: u32,
    bar_height: u32,
    label_width: u32,
}

impl SvgBarChart {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            width: 640,
            bar_height: 24,
            label_width: 200,
        }
    }
}

impl ChartRenderer for SvgBarChart {
    fn render(&self, values: &BTreeMap<String, Decimal>) -> Result<String> {
        if values.is_empty() {
            return Err(ReportError::ChartError("nothing to plot".to_string()));
        }
        if values.values().any(Decimal::is_sign_negative) {
            return Err(ReportError::ChartError("negative position value".to_string()));
        }

        let max = values.values().copied().max().unwrap_or(Decimal::ZERO);
        let max = max.to_f64().unwrap_or(0.0);
        let plot_width = f64::from(self.width.saturating_sub(self.label_width + 140));
        let row = self.bar_height + 8;
        let height = row * values.len() as u32 + 40;

        let mut svg = String::new();
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{height}\" viewBox=\"0 0 {w} {height}\" font-family=\"sans-serif\" font-size=\"12\">",
            w = self.width
        );
        let _ = write!(
            svg,
            "<text x=\"0\" y=\"16\" font-size=\"14\" font-weight=\"bold\">Portfolio Allocation</text>"
        );

        for (i, (name, value)) in values.iter().enumerate() {
            let y = 28 + row * i as u32;
            let ratio = if max > 0.0 {
                value.to_f64().unwrap_or(0.0) / max
            } else {
                0.0
            };
            let bar = (plot_width * ratio).round();
            let text_y = y + self.bar_height / 2 + 4;

            let _ = write!(
                svg,
                "<text x=\"0\" y=\"{text_y}\">{}</text>",
                escape_html(name)
            );
            let _ = write!(
                svg,
                "<rect x=\"{x}\" y=\"{y}\" width=\"{bar}\" height=\"{h}\" fill=\"#4a7ab5\"/>",
                x = self.label_width,
                h = self.bar_height
            );
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{text_y}\">{}</text>",
                f64::from(self.label_width) + bar + 6.0,
                format_money(*value, &self.currency)
            );
        }

        svg.push_str("</svg>");
        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_renders_one_bar_per_company() {
        let values = BTreeMap::from([
            ("Apple Inc.".to_string(), dec!(1500)),
            ("Microsoft Corporation".to_string(), dec!(750)),
        ]);
        let svg = SvgBarChart::new("USD").render(&values).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains("1,500.00 USD"));
        assert!(svg.contains("width=\"300\""));
        assert!(svg.contains("width=\"150\""));
    }

    #[test]
    fn test_escapes_names() {
        let values = BTreeMap::from([("AT&T Inc.".to_string(), dec!(10))]);
        let svg = SvgBarChart::new("USD").render(&values).unwrap();
        assert!(svg.contains("AT&amp;T Inc."));
    }

    #[test]
    fn test_zero_values_do_not_divide_by_zero() {
        let values = BTreeMap::from([("Idle".to_string(), Decimal::ZERO)]);
        let svg = SvgBarChart::new("USD").render(&values).unwrap();
        assert!(svg.contains("width=\"0\""));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(SvgBarChart::new("USD").render(&BTreeMap::new()).is_err());
    }
}
