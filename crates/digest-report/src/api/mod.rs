//! Adapters for the external services a report run depends on
//!
//! Each service sits behind a small trait so the pipeline can be driven by
//! real HTTP clients in production and by fakes in tests.

pub mod narrator;
pub mod newsapi;
pub mod yahoo;

pub use narrator::LlmNarrator;
pub use newsapi::{NewsApiClient, NewsApiConfig};
pub use yahoo::YahooMarketData;

use crate::error::AdapterError;
use crate::model::{Article, Ticker, ValuationFact};
use async_trait::async_trait;

/// Price and fundamentals lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Look up a ticker
    ///
    /// An unknown ticker is not an error: it yields a fact whose prices are
    /// `None`. Errors are reserved for transport and provider outages.
    async fn lookup(&self, ticker: &Ticker) -> Result<ValuationFact, AdapterError>;

    /// Display name for a ticker, used as the news query
    async fn company_name(&self, ticker: &Ticker) -> Result<String, AdapterError> {
        Ok(self.lookup(ticker).await?.company_name)
    }
}

/// News search by company name
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Most relevant articles first
    async fn search(&self, company_name: &str) -> Result<Vec<Article>, AdapterError>;
}

/// Free-text analysis from a composed prompt
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_output_tokens: usize) -> Result<String, AdapterError>;
}
