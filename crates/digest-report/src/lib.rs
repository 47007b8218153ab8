//! Portfolio valuation and news-analysis report pipeline
//!
//! For a set of held positions and watch-only tickers this crate:
//!
//! - values each holding and totals the portfolio
//! - searches recent news for every ticker
//! - asks a language model for a short narrative analysis per ticker
//! - assembles the results into one HTML report and hands it to a delivery
//!   adapter (email or file)
//!
//! Failures are isolated per ticker: a lookup, news or generation error shows
//! up as a line in the report and never aborts the run.
//!
//! # Example
//!
//! ```rust,ignore
//! use digest_report::api::{LlmNarrator, NewsApiClient, NewsApiConfig, YahooMarketData};
//! use digest_report::{DigestConfig, ReportPipeline, SvgBarChart};
//! use digest_llm::providers::OpenAIProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DigestConfig::from_env()?;
//!     let pipeline = ReportPipeline::builder()
//!         .market(Arc::new(YahooMarketData::new(config.request_timeout)?))
//!         .news(Arc::new(NewsApiClient::new(NewsApiConfig::from_env()?)?))
//!         .narrator(Arc::new(LlmNarrator::new(Arc::new(OpenAIProvider::from_env()?), &config.model)))
//!         .chart(Arc::new(SvgBarChart::new(&config.currency)))
//!         .config(config)
//!         .build()?;
//!
//!     if let Some(report) = pipeline.run(&portfolio, &watchlist).await {
//!         println!("{}", report.to_html());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod delivery;
pub mod error;
pub mod format;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod store;

pub use config::DigestConfig;
pub use delivery::{FileDelivery, ReportDelivery, SmtpConfig, SmtpDelivery};
pub use error::{AdapterError, DeliveryError, ReportError, Result};
pub use model::{
    AnalysisSection, Article, Narrative, Portfolio, PortfolioInput, SectionHeader, Ticker,
    TickerUniverse, ValuationFact, WatchList,
};
pub use pipeline::{PortfolioValuation, ReportPipeline, RunOutcome, ValuationLine, ValuationOutcome};
pub use prompts::PromptComposer;
pub use report::{ChartRenderer, Report, ReportAssembler, SvgBarChart};
pub use store::PortfolioStore;
