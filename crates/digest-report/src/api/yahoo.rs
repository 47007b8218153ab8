//! Yahoo Finance market data over the public chart and quote endpoints
//!
//! The chart endpoint is open. The quote endpoint needs a session: a cookie
//! from `fc.yahoo.com` plus a crumb from `/v1/test/getcrumb`, sent as the
//! `crumb` query parameter. The crumb is fetched once and reused until Yahoo
//! rejects it.

use super::MarketDataSource;
use crate::error::AdapterError;
use crate::model::{Ticker, ValuationFact};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "yahoo";
const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_SESSION_URL: &str = "https://fc.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; portfolio-digest/0.1)";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    short_name: Option<String>,
    long_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteBody,
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    #[serde(default)]
    result: Vec<QuoteFields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteFields {
    market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    eps_trailing_twelve_months: Option<f64>,
    dividend_yield: Option<f64>,
    trailing_annual_dividend_yield: Option<f64>,
}

/// Parse a chart response; `None` means Yahoo does not know the symbol
fn parse_chart(body: &str) -> Result<Option<ChartMeta>, AdapterError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| AdapterError::parse(PROVIDER, e.to_string()))?;

    if let Some(err) = envelope.chart.error {
        if err.code.eq_ignore_ascii_case("Not Found") {
            return Ok(None);
        }
        return Err(AdapterError::parse(
            PROVIDER,
            format!("{}: {}", err.code, err.description.unwrap_or_default()),
        ));
    }

    Ok(envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .map(|r| r.meta))
}

fn parse_quote(body: &str) -> Result<Option<QuoteFields>, AdapterError> {
    let envelope: QuoteEnvelope =
        serde_json::from_str(body).map_err(|e| AdapterError::parse(PROVIDER, e.to_string()))?;
    Ok(envelope.quote_response.result.into_iter().next())
}

fn decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64).map(|d| d.normalize())
}

fn company_name(ticker: &Ticker, meta: Option<&ChartMeta>) -> String {
    meta.and_then(|m| m.short_name.as_deref().or(m.long_name.as_deref()))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| ticker.to_string(), str::to_string)
}

fn build_fact(ticker: &Ticker, meta: Option<&ChartMeta>, quote: Option<&QuoteFields>) -> ValuationFact {
    let mut fact = ValuationFact::new(company_name(ticker, meta));

    if let Some(meta) = meta {
        fact.current_price = decimal(meta.regular_market_price);
        fact.previous_close = decimal(meta.previous_close.or(meta.chart_previous_close));
    }

    if let Some(quote) = quote {
        fact.market_cap = decimal(quote.market_cap);
        fact.pe_ratio = decimal(quote.trailing_pe);
        fact.eps = decimal(quote.eps_trailing_twelve_months);
        fact.dividend_yield = decimal(quote.dividend_yield)
            .or_else(|| decimal(quote.trailing_annual_dividend_yield).map(|y| y * Decimal::ONE_HUNDRED));
    }

    fact
}

/// Market data from Yahoo Finance
///
/// No API key is required. Fundamentals come from a second request whose
/// failure only leaves those fields empty.
pub struct YahooMarketData {
    client: Client,
    base_url: String,
    session_url: String,
    crumb: Mutex<Option<String>>,
}

impl YahooMarketData {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| AdapterError::Config(format!("failed to build Yahoo client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            session_url: DEFAULT_SESSION_URL.to_string(),
            crumb: Mutex::new(None),
        })
    }

    /// Point the client at another host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Page visited to obtain the session cookie
    pub fn with_session_url(mut self, session_url: impl Into<String>) -> Self {
        self.session_url = session_url.into();
        self
    }

    /// The cached crumb, performing the cookie and crumb handshake if needed
    async fn crumb(&self) -> Result<String, AdapterError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the Set-Cookie header matters; the page itself is usually a 404
        if let Err(e) = self.client.get(&self.session_url).send().await {
            debug!("Yahoo session page unreachable: {e}");
        }

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AdapterError::request(PROVIDER, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AdapterError::request(PROVIDER, &e))?;

        if !status.is_success() {
            return Err(AdapterError::status(PROVIDER, status.as_u16(), &body));
        }

        let crumb = body.trim();
        if crumb.is_empty() || crumb.contains(char::is_whitespace) {
            return Err(AdapterError::parse(PROVIDER, "crumb endpoint returned no crumb"));
        }

        debug!("Obtained Yahoo crumb");
        *cached = Some(crumb.to_string());
        Ok(crumb.to_string())
    }

    async fn fetch_chart(&self, ticker: &Ticker) -> Result<Option<ChartMeta>, AdapterError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let response = self
            .client
            .get(&url)
            .query(&[("range", "5d"), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| AdapterError::request(PROVIDER, &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Yahoo has no chart for {ticker}");
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AdapterError::request(PROVIDER, &e))?;

        if !status.is_success() {
            return Err(AdapterError::status(PROVIDER, status.as_u16(), &body));
        }

        parse_chart(&body)
    }

    async fn fetch_fundamentals(&self, ticker: &Ticker) -> Result<Option<QuoteFields>, AdapterError> {
        let crumb = self.crumb().await?;
        let url = format!("{}/v7/finance/quote", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbols", ticker.as_str()), ("crumb", crumb.as_str())])
            .send()
            .await
            .map_err(|e| AdapterError::request(PROVIDER, &e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // Expired session: the next lookup repeats the handshake
            self.crumb.lock().await.take();
        }
        let body = response
            .text()
            .await
            .map_err(|e| AdapterError::request(PROVIDER, &e))?;

        if !status.is_success() {
            return Err(AdapterError::status(PROVIDER, status.as_u16(), &body));
        }

        parse_quote(&body)
    }
}

#[async_trait]
impl MarketDataSource for YahooMarketData {
    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn lookup(&self, ticker: &Ticker) -> Result<ValuationFact, AdapterError> {
        let meta = self.fetch_chart(ticker).await?;

        let quote = if meta.is_some() {
            match self.fetch_fundamentals(ticker).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!("Fundamentals unavailable for {ticker}: {e}");
                    None
                }
            }
        } else {
            None
        };

        Ok(build_fact(ticker, meta.as_ref(), quote.as_ref()))
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn company_name(&self, ticker: &Ticker) -> Result<String, AdapterError> {
        let meta = self.fetch_chart(ticker).await?;
        Ok(company_name(ticker, meta.as_ref()))
    }
}
