//! Prompt construction for narrative generation
//!
//! Templates live in two places:
//! - `system`: the fixed analyst persona
//! - `user`: the per-ticker request rendered by [`PromptComposer`]

mod system;
mod user;

pub use system::NEWS_ANALYST;
pub use user::{NEWS_ANALYSIS, NEWS_ANALYSIS_NAME};

use crate::config::{DigestConfig, MAX_PROMPT_ARTICLES};
use crate::error::Result;
use crate::format::{format_compact, format_decimal, format_money, format_percent, format_signed};
use crate::model::{Article, ArticleText, Ticker, ValuationFact};
use minijinja::{Environment, context};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Metric {
    label: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct PromptArticle<'a> {
    title: &'a str,
    body: Option<&'a str>,
    summary: Option<&'a str>,
}

impl<'a> From<&'a Article> for PromptArticle<'a> {
    fn from(article: &'a Article) -> Self {
        let (body, summary) = match article.text() {
            ArticleText::Body(body) => (Some(body), None),
            ArticleText::Summary(summary) => (None, Some(summary)),
            ArticleText::Missing => (None, None),
        };
        Self {
            title: article.title.trim(),
            body,
            summary,
        }
    }
}

/// Builds the narrative request for one ticker
///
/// Rendering is deterministic: the same inputs always produce the same
/// prompt. Fundamentals that are absent are left out entirely.
pub struct PromptComposer {
    env: Environment<'static>,
    currency: String,
    target_words: u32,
    max_articles: usize,
}

impl std::fmt::Debug for PromptComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptComposer")
            .field("currency", &self.currency)
            .field("target_words", &self.target_words)
            .field("max_articles", &self.max_articles)
            .finish_non_exhaustive()
    }
}

impl PromptComposer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template(NEWS_ANALYSIS_NAME, NEWS_ANALYSIS)?;

        Ok(Self {
            env,
            currency: "USD".to_string(),
            target_words: 200,
            max_articles: MAX_PROMPT_ARTICLES,
        })
    }

    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        Ok(Self::new()?
            .with_currency(&config.currency)
            .with_target_words(config.target_words)
            .with_max_articles(config.max_articles))
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_target_words(mut self, words: u32) -> Self {
        self.target_words = words;
        self
    }

    /// Clamped to 1..=5
    pub fn with_max_articles(mut self, n: usize) -> Self {
        self.max_articles = n.clamp(1, MAX_PROMPT_ARTICLES);
        self
    }

    /// Render the request for `ticker`
    ///
    /// Only the first `max_articles` articles are used, whatever the length
    /// of `articles`.
    pub fn compose(
        &self,
        ticker: &Ticker,
        company_name: &str,
        fact: Option<&ValuationFact>,
        articles: &[Article],
    ) -> Result<String> {
        let articles: Vec<PromptArticle<'_>> = articles
            .iter()
            .take(self.max_articles)
            .map(PromptArticle::from)
            .collect();
        let metrics = fact.map(|f| self.metrics(f)).unwrap_or_default();

        let template = self.env.get_template(NEWS_ANALYSIS_NAME)?;
        let prompt = template.render(context! {
            ticker => ticker.as_str(),
            company_name => company_name,
            metrics => metrics,
            articles => articles,
            target_words => self.target_words,
        })?;
        Ok(prompt)
    }

    fn metrics(&self, fact: &ValuationFact) -> Vec<Metric> {
        let currency = self.currency.as_str();
        let mut metrics = Vec::new();

        if let Some(price) = fact.current_price {
            metrics.push(Metric {
                label: "Current price",
                value: format_money(price, currency),
            });
        }
        if let Some(gain) = fact.dollar_gain() {
            metrics.push(Metric {
                label: "Change since previous close",
                value: format!("{} {currency}", format_signed(gain, 2)),
            });
        }
        if let Some(pct) = fact.percent_gain() {
            metrics.push(Metric {
                label: "Percent change",
                value: format_percent(pct),
            });
        }
        if let Some(cap) = fact.market_cap {
            metrics.push(Metric {
                label: "Market capitalization",
                value: format!("{} {currency}", format_compact(cap)),
            });
        }
        if let Some(pe) = fact.pe_ratio {
            metrics.push(Metric {
                label: "P/E ratio",
                value: format_decimal(pe, 2),
            });
        }
        if let Some(eps) = fact.eps {
            metrics.push(Metric {
                label: "EPS",
                value: format_money(eps, currency),
            });
        }
        if let Some(yield_pct) = fact.dividend_yield {
            metrics.push(Metric {
                label: "Dividend yield",
                value: format!("{}%", format_decimal(yield_pct, 2)),
            });
        }

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    fn articles(n: usize) -> Vec<Article> {
        (1..=n)
            .map(|i| Article::new(format!("Headline {i}")).with_body(format!("Body {i}")))
            .collect()
    }

    #[test]
    fn test_includes_available_metrics() {
        let fact = ValuationFact::new("Apple Inc.")
            .with_prices(dec!(150), dec!(145))
            .with_market_cap(dec!(2450000000000))
            .with_pe_ratio(dec!(28.5))
            .with_eps(dec!(6.25))
            .with_dividend_yield(dec!(0.5));

        let composer = PromptComposer::new().unwrap();
        let prompt = composer
            .compose(&ticker("AAPL"), "Apple Inc.", Some(&fact), &articles(1))
            .unwrap();

        assert!(prompt.contains("Apple Inc. (stock ticker AAPL)"));
        assert!(prompt.contains("- Current price: 150.00 USD"));
        assert!(prompt.contains("- Change since previous close: +5.00 USD"));
        assert!(prompt.contains("- Percent change: +3.45%"));
        assert!(prompt.contains("- Market capitalization: 2.45T USD"));
        assert!(prompt.contains("- P/E ratio: 28.50"));
        assert!(prompt.contains("- EPS: 6.25 USD"));
        assert!(prompt.contains("- Dividend yield: 0.50%"));
        assert!(prompt.contains("Aim for roughly 200 words."));
    }

    #[test]
    fn test_absent_fundamentals_are_omitted() {
        let fact = ValuationFact::new("Apple Inc.").with_prices(dec!(150), dec!(145));
        let composer = PromptComposer::new().unwrap();
        let prompt = composer
            .compose(&ticker("AAPL"), "Apple Inc.", Some(&fact), &articles(1))
            .unwrap();

        assert!(prompt.contains("Current price"));
        assert!(!prompt.contains("P/E"));
        assert!(!prompt.contains("Market capitalization"));
        assert!(!prompt.contains("N/A"));
    }

    #[test]
    fn test_watch_only_prompt_has_no_market_data() {
        let composer = PromptComposer::new().unwrap();
        let prompt = composer
            .compose(&ticker("TSLA"), "Tesla, Inc.", None, &articles(2))
            .unwrap();

        assert!(!prompt.contains("Market data"));
        assert!(prompt.contains("Title: Headline 2"));
    }

    #[test]
    fn test_article_text_fallbacks() {
        let articles = vec![
            Article::new("With body").with_body("Full text").with_summary("Teaser"),
            Article::new("With summary").with_body("  ").with_summary("Teaser only"),
            Article::new("Bare"),
        ];
        let composer = PromptComposer::new().unwrap();
        let prompt = composer.compose(&ticker("AAPL"), "Apple", None, &articles).unwrap();

        assert!(prompt.contains("Title: With body\nContent: Full text"));
        assert!(!prompt.contains("Description: Teaser\n"));
        assert!(prompt.contains("Title: With summary\nDescription: Teaser only"));
        assert!(prompt.contains("Title: Bare\nNo content or description available."));
    }

    #[test]
    fn test_only_first_five_articles_used() {
        let composer = PromptComposer::new().unwrap().with_max_articles(50);
        let prompt = composer
            .compose(&ticker("AAPL"), "Apple", None, &articles(8))
            .unwrap();

        assert_eq!(prompt.matches("Title:").count(), 5);
        assert!(prompt.contains("Headline 5"));
        assert!(!prompt.contains("Headline 6"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let composer = PromptComposer::new().unwrap().with_target_words(150);
        let a = composer.compose(&ticker("MSFT"), "Microsoft", None, &articles(3)).unwrap();
        let b = composer.compose(&ticker("MSFT"), "Microsoft", None, &articles(3)).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("roughly 150 words"));
    }
}
