//! Collecting tickers and quantities from flags, stdin or the saved record

use digest_report::{Portfolio, PortfolioInput, WatchList};
use std::io::{self, BufRead, Write};

/// Rows offered by interactive entry
pub const MAX_ROWS: usize = 10;

/// Parse a `TICKER=UNITS` flag value
pub fn parse_holding(raw: &str) -> Result<(String, String), String> {
    let (ticker, units) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TICKER=UNITS, got '{raw}'"))?;
    let (ticker, units) = (ticker.trim(), units.trim());
    if ticker.is_empty() || units.is_empty() {
        return Err(format!("expected TICKER=UNITS, got '{raw}'"));
    }
    Ok((ticker.to_string(), units.to_string()))
}

/// Rows from `--holding` and `--watch`
pub fn from_flags(holdings: &[(String, String)], watch: &[String]) -> PortfolioInput {
    let held = holdings
        .iter()
        .map(|(ticker, units)| (ticker.as_str(), Some(units.as_str())));
    let watched = watch.iter().map(|ticker| (ticker.as_str(), None));
    PortfolioInput::from_rows(held.chain(watched))
}

/// Re-submit a saved portfolio unchanged
pub fn from_saved(portfolio: &Portfolio, watchlist: &WatchList) -> PortfolioInput {
    let held = portfolio
        .iter()
        .map(|(ticker, quantity)| (ticker.to_string(), Some(quantity.to_string())));
    let watched = watchlist.iter().map(|ticker| (ticker.to_string(), None));
    PortfolioInput::from_rows(held.chain(watched))
}

/// Prompt for up to [`MAX_ROWS`] `TICKER [UNITS]` lines
///
/// An empty first line reuses the saved portfolio; any later empty line, or
/// end of input, finishes entry.
pub fn read_interactive<R: BufRead, W: Write>(
    mut reader: R,
    out: &mut W,
    saved: (&Portfolio, &WatchList),
) -> io::Result<PortfolioInput> {
    let (saved_portfolio, saved_watchlist) = saved;
    let has_saved = !saved_portfolio.is_empty() || !saved_watchlist.is_empty();

    writeln!(out, "Enter stock tickers and units (optional), one per line: TICKER [UNITS]")?;
    if has_saved {
        writeln!(out, "Saved portfolio:")?;
        for (ticker, quantity) in saved_portfolio.iter() {
            writeln!(out, "  {ticker} {quantity}")?;
        }
        for ticker in saved_watchlist.iter() {
            writeln!(out, "  {ticker}")?;
        }
        writeln!(out, "Press Enter on an empty first line to reuse it.")?;
    }

    let mut input = PortfolioInput::new();
    let mut rows = 0;
    let mut line = String::new();

    while rows < MAX_ROWS {
        write!(out, "{}> ", rows + 1)?;
        out.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        let mut fields = line.split_whitespace();
        let Some(ticker) = fields.next() else {
            if rows == 0 && has_saved {
                return Ok(from_saved(saved_portfolio, saved_watchlist));
            }
            break;
        };
        let units = fields.next();
        if fields.next().is_some() {
            writeln!(out, "Ignoring extra text after units")?;
        }

        if !input.add_row(ticker, units) {
            writeln!(out, "Skipped '{}'", line.trim())?;
        }
        rows += 1;
    }

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use digest_report::Ticker;
    use std::io::Cursor;

    fn t(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_parse_holding() {
        assert_eq!(
            parse_holding("aapl=10").unwrap(),
            ("aapl".to_string(), "10".to_string())
        );
        assert!(parse_holding("AAPL").is_err());
        assert!(parse_holding("=10").is_err());
        assert!(parse_holding("AAPL=").is_err());
    }

    #[test]
    fn test_from_flags() {
        let input = from_flags(
            &[("AAPL".to_string(), "10".to_string())],
            &["tsla".to_string()],
        );
        let (portfolio, watchlist) = input.into_parts();
        assert_eq!(portfolio.quantity(&t("AAPL")), Some(10));
        assert!(watchlist.contains(&t("TSLA")));
    }

    #[test]
    fn test_interactive_rows() {
        let stdin = Cursor::new("aapl 10\ntsla\nmsft lots\n\nnvda 3\n");
        let mut out = Vec::new();
        let input = read_interactive(stdin, &mut out, (&Portfolio::new(), &WatchList::new())).unwrap();

        assert_eq!(input.rejected().len(), 1);
        let (portfolio, watchlist) = input.into_parts();
        assert_eq!(portfolio.quantity(&t("AAPL")), Some(10));
        assert!(watchlist.contains(&t("TSLA")));
        assert!(!portfolio.contains(&t("NVDA")));

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Skipped 'msft lots'"));
    }

    #[test]
    fn test_interactive_empty_first_line_reuses_saved() {
        let saved_portfolio: Portfolio = [(t("AAPL"), 10)].into_iter().collect();
        let saved_watchlist: WatchList = [t("TSLA")].into_iter().collect();
        let mut out = Vec::new();

        let input = read_interactive(
            Cursor::new("\n"),
            &mut out,
            (&saved_portfolio, &saved_watchlist),
        )
        .unwrap();

        let (portfolio, watchlist) = input.into_parts();
        assert_eq!(portfolio, saved_portfolio);
        assert_eq!(watchlist, saved_watchlist);
        assert!(String::from_utf8(out).unwrap().contains("  AAPL 10"));
    }

    #[test]
    fn test_interactive_stops_after_max_rows() {
        let lines: String = (0..12).map(|i| format!("T{i} 1\n")).collect();
        let mut out = Vec::new();
        let input = read_interactive(
            Cursor::new(lines),
            &mut out,
            (&Portfolio::new(), &WatchList::new()),
        )
        .unwrap();

        let (portfolio, _) = input.into_parts();
        assert_eq!(portfolio.len(), MAX_ROWS);
        assert!(!portfolio.contains(&t("T10")));
    }
}
