//! NewsAPI.org client for company news

use super::NewsSource;
use crate::error::AdapterError;
use crate::model::Article;
use async_trait::async_trait;
use digest_utils::{EnvError, env_or, env_required};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const PROVIDER: &str = "newsapi";
const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
const REMOVED_TITLE: &str = "[Removed]";

/// Settings for [`NewsApiClient`]
#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Articles requested per search (NewsAPI allows up to 100)
    pub page_size: u32,
    /// Requests per minute
    pub rate_limit: u32,
    pub timeout: Duration,
}

impl NewsApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 20,
            rate_limit: 60,
            timeout: Duration::from_secs(30),
        }
    }

    /// Read `NEWS_API_KEY` and optional `NEWS_API_BASE`
    pub fn from_env() -> Result<Self, EnvError> {
        let mut config = Self::new(env_required("NEWS_API_KEY")?);
        config.base_url = env_or("NEWS_API_BASE", DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit = per_minute;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    source: Option<RawSource>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl RawArticle {
    fn into_article(self) -> Option<Article> {
        let title = self.title.map(|t| t.trim().to_string())?;
        if title.is_empty() || title == REMOVED_TITLE {
            return None;
        }

        Some(Article {
            title,
            body: self.content,
            summary: self.description,
            url: self.url,
            source: self.source.and_then(|s| s.name),
        })
    }
}

fn parse_articles(body: &str) -> Result<Vec<Article>, AdapterError> {
    let response: EverythingResponse =
        serde_json::from_str(body).map_err(|e| AdapterError::parse(PROVIDER, e.to_string()))?;

    Ok(response
        .articles
        .into_iter()
        .filter_map(RawArticle::into_article)
        .collect())
}

/// NewsAPI `everything` search, rate limited per client
pub struct NewsApiClient {
    client: Client,
    config: NewsApiConfig,
    rate_limiter: SharedRateLimiter,
}

impl NewsApiClient {
    pub fn new(config: NewsApiConfig) -> Result<Self, AdapterError> {
        let quota = Quota::per_minute(NonZeroU32::new(config.rate_limit).unwrap_or(NonZeroU32::MIN));
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdapterError::Config(format!("failed to build NewsAPI client: {e}")))?;

        Ok(Self {
            client,
            config,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    pub fn config(&self) -> &NewsApiConfig {
        &self.config
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[instrument(skip(self))]
    async fn search(&self, company_name: &str) -> Result<Vec<Article>, AdapterError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/everything", self.config.base_url);
        let page_size = self.config.page_size.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", company_name),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.config.api_key.as_str()),
            ])
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

        let articles = parse_articles(&body)?;
        debug!("NewsAPI returned {} articles", articles.len());
        Ok(articles)
    }
}
