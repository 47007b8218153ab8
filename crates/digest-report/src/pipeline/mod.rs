//! Report pipeline
//!
//! Drives the market, news and narrative adapters for every ticker and
//! collects the results. No adapter error escapes this module: each one is
//! caught for its ticker and turned into a visible line or section.

mod accumulator;
mod outcome;

pub use accumulator::{PortfolioValuation, ReportAccumulator};
pub use outcome::{ValuationLine, ValuationOutcome};

use crate::api::{MarketDataSource, NarrativeGenerator, NewsSource};
use crate::config::DigestConfig;
use crate::delivery::ReportDelivery;
use crate::error::{AdapterError, ReportError, Result};
use crate::model::{
    AnalysisSection, Narrative, Portfolio, SectionHeader, Ticker, TickerEntry, TickerUniverse,
    ValuationFact, WatchList,
};
use crate::prompts::PromptComposer;
use crate::report::{ChartRenderer, Report, ReportAssembler};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// How a [`ReportPipeline::run_and_deliver`] call ended
#[derive(Debug)]
pub enum RunOutcome {
    /// No tickers were supplied
    Empty,
    /// A report was built but no ticker reached narrative generation
    Undeliverable(Report),
    /// The report was handed to the delivery adapter
    Delivered(Report),
}

impl RunOutcome {
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Empty => None,
            Self::Undeliverable(report) | Self::Delivered(report) => Some(report),
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Per-ticker valuation and analysis over a set of adapters
pub struct ReportPipeline {
    market: Arc<dyn MarketDataSource>,
    news: Arc<dyn NewsSource>,
    narrator: Arc<dyn NarrativeGenerator>,
    composer: PromptComposer,
    assembler: ReportAssembler,
    config: DigestConfig,
}

impl ReportPipeline {
    pub fn builder() -> ReportPipelineBuilder {
        ReportPipelineBuilder::default()
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Value every held position, in ticker order
    pub async fn value_portfolio(&self, portfolio: &Portfolio) -> PortfolioValuation {
        let mut valuation = PortfolioValuation::new();

        for (ticker, quantity) in portfolio.iter() {
            let span = info_span!("valuation", ticker = %ticker);
            let (line, fact) = self
                .value_position(ticker, quantity)
                .instrument(span)
                .await;
            valuation.record(line, fact);
        }

        info!(
            positions = portfolio.len(),
            total = %valuation.total_value(),
            "Portfolio valued"
        );
        valuation
    }

    async fn value_position(&self, ticker: &Ticker, quantity: u64) -> (ValuationLine, Option<ValuationFact>) {
        match self.with_timeout("market lookup", self.market.lookup(ticker)).await {
            Ok(fact) => {
                if !fact.has_price() {
                    warn!("No current price for {ticker}");
                }
                (ValuationLine::from_fact(ticker.clone(), quantity, &fact), Some(fact))
            }
            Err(e) => {
                warn!("Valuation failed for {ticker}: {e}");
                (ValuationLine::failed(ticker.clone(), quantity, e.to_string()), None)
            }
        }
    }

    /// One section per ticker, in ticker order
    ///
    /// Up to `max_concurrency` tickers are in flight at once; results are
    /// still emitted in ticker order.
    pub async fn analyze(
        &self,
        universe: &TickerUniverse,
        valuation: &PortfolioValuation,
    ) -> Vec<AnalysisSection> {
        stream::iter(universe.iter())
            .map(|entry| {
                let span = info_span!("analysis", ticker = %entry.ticker);
                self.analyze_ticker(entry, valuation).instrument(span)
            })
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await
    }

    async fn analyze_ticker(&self, entry: &TickerEntry, valuation: &PortfolioValuation) -> AnalysisSection {
        let ticker = &entry.ticker;
        let fact = valuation.fact(ticker);
        let company_name = match fact {
            Some(fact) => fact.company_name.clone(),
            None => self.resolve_company_name(ticker).await,
        };

        let held_fact = fact.filter(|_| entry.is_held());
        let header = held_fact
            .and_then(|fact| SectionHeader::priced(company_name.as_str(), fact, self.config.currency.as_str()))
            .unwrap_or_else(|| SectionHeader::news_only(company_name.as_str(), ticker.clone()));

        let narrative = self.narrate(ticker, &company_name, held_fact).await;
        AnalysisSection::new(ticker.clone(), header, narrative)
    }

    async fn resolve_company_name(&self, ticker: &Ticker) -> String {
        match self.with_timeout("company name lookup", self.market.company_name(ticker)).await {
            Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
            Ok(_) => ticker.to_string(),
            Err(e) => {
                warn!("Could not resolve company name for {ticker}, searching by symbol: {e}");
                ticker.to_string()
            }
        }
    }

    async fn narrate(&self, ticker: &Ticker, company_name: &str, fact: Option<&ValuationFact>) -> Narrative {
        let articles = match self.with_timeout("news search", self.news.search(company_name)).await {
            Ok(articles) if articles.is_empty() => {
                info!("No news articles found for {ticker}");
                return Narrative::unavailable(format!("no news articles found for {ticker}"));
            }
            Ok(articles) => articles,
            Err(e) => {
                warn!("News lookup failed for {ticker}: {e}");
                return Narrative::unavailable(format!("news lookup failed: {e}"));
            }
        };

        let prompt = match self.composer.compose(ticker, company_name, fact, &articles) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("Prompt construction failed for {ticker}: {e}");
                return Narrative::generation_failed(e.to_string());
            }
        };
        debug!(articles = articles.len(), chars = prompt.len(), "Prompt composed");

        let generation = self.narrator.generate(&prompt, self.config.max_output_tokens);
        match self.with_timeout("narrative generation", generation).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("Empty narrative for {ticker}");
                Narrative::generation_failed("the generator returned no text")
            }
            Ok(text) => Narrative::Generated(text.trim().to_string()),
            Err(e) => {
                warn!("Narrative generation failed for {ticker}: {e}");
                Narrative::generation_failed(e.to_string())
            }
        }
    }

    async fn with_timeout<T, F>(&self, operation: &str, call: F) -> std::result::Result<T, AdapterError>
    where
        F: Future<Output = std::result::Result<T, AdapterError>>,
    {
        let after = self.config.request_timeout;
        tokio::time::timeout(after, call)
            .await
            .unwrap_or_else(|_| {
                Err(AdapterError::Timeout {
                    operation: operation.to_string(),
                    after,
                })
            })
    }

    /// Value, analyze and assemble
    ///
    /// Returns `None` only when both inputs are empty.
    pub async fn run(&self, portfolio: &Portfolio, watchlist: &WatchList) -> Option<Report> {
        let universe = TickerUniverse::new(portfolio, watchlist);
        if universe.is_empty() {
            info!("No tickers supplied; nothing to report");
            return None;
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("report_run", run_id = %run_id);
        async move {
            info!(
                held = portfolio.len(),
                watched = watchlist.len(),
                tickers = universe.len(),
                "Report run started"
            );

            let mut acc = ReportAccumulator::new(run_id);
            acc.set_valuation(self.value_portfolio(portfolio).await);
            let sections = self.analyze(&universe, acc.valuation()).await;
            acc.extend_sections(sections);

            let report = self.assembler.assemble(acc);
            if let Some(report) = &report {
                info!(
                    sections = report.sections.len(),
                    generated = report.generated_count(),
                    "Report assembled"
                );
            }
            report
        }
        .instrument(span)
        .await
    }

    /// Run, then send the report if it is deliverable
    pub async fn run_and_deliver(
        &self,
        portfolio: &Portfolio,
        watchlist: &WatchList,
        delivery: &dyn ReportDelivery,
    ) -> Result<RunOutcome> {
        let Some(report) = self.run(portfolio, watchlist).await else {
            return Ok(RunOutcome::Empty);
        };

        if !report.is_deliverable() {
            info!("No analysis reached generation; skipping delivery");
            return Ok(RunOutcome::Undeliverable(report));
        }

        delivery
            .send(&self.config.subject, &report.to_html())
            .await
            .map_err(ReportError::from)?;
        info!(run_id = %report.run_id, "Report delivered");
        Ok(RunOutcome::Delivered(report))
    }
}

/// Builder for [`ReportPipeline`]
#[derive(Default)]
pub struct ReportPipelineBuilder {
    market: Option<Arc<dyn MarketDataSource>>,
    news: Option<Arc<dyn NewsSource>>,
    narrator: Option<Arc<dyn NarrativeGenerator>>,
    chart: Option<Arc<dyn ChartRenderer>>,
    config: Option<DigestConfig>,
}

impl ReportPipelineBuilder {
    pub fn market(mut self, market: Arc<dyn MarketDataSource>) -> Self {
        self.market = Some(market);
        self
    }

    pub fn news(mut self, news: Arc<dyn NewsSource>) -> Self {
        self.news = Some(news);
        self
    }

    pub fn narrator(mut self, narrator: Arc<dyn NarrativeGenerator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn chart(mut self, chart: Arc<dyn ChartRenderer>) -> Self {
        self.chart = Some(chart);
        self
    }

    pub fn config(mut self, config: DigestConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<ReportPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let missing = |what: &str| ReportError::ConfigError(format!("pipeline requires a {what} adapter"));
        let mut assembler = ReportAssembler::new(&config.currency);
        if let Some(chart) = self.chart {
            assembler = assembler.with_chart(chart);
        }

        Ok(ReportPipeline {
            market: self.market.ok_or_else(|| missing("market data"))?,
            news: self.news.ok_or_else(|| missing("news"))?,
            narrator: self.narrator.ok_or_else(|| missing("narrative"))?,
            composer: PromptComposer::from_config(&config)?,
            assembler,
            config,
        })
    }
}
