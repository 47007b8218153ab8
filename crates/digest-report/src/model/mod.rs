//! Data model for a report run
//!
//! Everything here is plain data: created once per run, never mutated after
//! construction, and never persisted except for the ticker/quantity record
//! handled by [`crate::store`].

mod article;
mod portfolio;
mod section;
mod ticker;
mod valuation;

pub use article::{Article, ArticleText};
pub use portfolio::{Portfolio, PortfolioInput, TickerEntry, TickerUniverse, WatchList, parse_quantity};
pub use section::{AnalysisSection, Narrative, SectionHeader};
pub use ticker::Ticker;
pub use valuation::{ValuationFact, ValueOverflow};
