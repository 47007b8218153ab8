//! Number and text formatting shared by the prompt, headers and HTML report

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to `dp` places and render with thousands separators ("1,500.00")
pub fn format_decimal(value: Decimal, dp: u32) -> String {
    let rounded = rounded(value, dp);
    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if is_negative(rounded) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Like [`format_decimal`] but always carries a sign ("+5.00", "-1,204.10")
pub fn format_signed(value: Decimal, dp: u32) -> String {
    let body = format_decimal(value, dp);
    if body.starts_with('-') { body } else { format!("+{body}") }
}

/// Two-decimal amount followed by a currency label ("1,500.00 USD")
pub fn format_money(value: Decimal, currency: &str) -> String {
    format!("{} {currency}", format_decimal(value, 2))
}

/// Signed two-decimal percentage ("+3.45%")
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", format_signed(value, 2))
}

/// Short form for large figures such as market capitalisation ("2.45T")
pub fn format_compact(value: Decimal) -> String {
    const UNITS: [(i64, &str); 3] = [
        (1_000_000_000_000, "T"),
        (1_000_000_000, "B"),
        (1_000_000, "M"),
    ];

    for (scale, suffix) in UNITS {
        let scale = Decimal::from(scale);
        if value.abs() >= scale {
            return format!("{}{suffix}", format_decimal(value / scale, 2));
        }
    }
    format_decimal(value, 2)
}

/// Escape text for safe insertion into HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn rounded(value: Decimal, dp: u32) -> Decimal {
    let mut r = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    r.rescale(dp);
    r
}

fn is_negative(value: Decimal) -> bool {
    value.is_sign_negative() && !value.is_zero()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
