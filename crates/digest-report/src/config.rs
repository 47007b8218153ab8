//! Configuration for report runs

use crate::error::{ReportError, Result};
use digest_utils::{env_or, env_parse};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Most articles a prompt may include
pub const MAX_PROMPT_ARTICLES: usize = 5;

/// Tunables for one report run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Email subject line
    pub subject: String,

    /// Currency label printed next to every amount
    pub currency: String,

    /// Articles included per prompt (1..=5)
    pub max_articles: usize,

    /// Output token cap passed to the narrative generator
    pub max_output_tokens: usize,

    /// Chat model used for narratives
    pub model: String,

    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,

    /// Deadline applied to every adapter call
    pub request_timeout: Duration,

    /// Tickers analyzed in parallel
    pub max_concurrency: usize,

    /// Articles requested from the news service per search
    pub news_page_size: u32,

    /// News requests allowed per minute
    pub news_rate_limit: u32,

    /// Approximate narrative length requested in the prompt
    pub target_words: u32,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            subject: "Weekly Portfolio Update".to_string(),
            currency: "USD".to_string(),
            max_articles: MAX_PROMPT_ARTICLES,
            max_output_tokens: 2000,
            model: "gpt-4".to_string(),
            temperature: None,
            request_timeout: Duration::from_secs(30),
            max_concurrency: 1,
            news_page_size: 20,
            news_rate_limit: 60,
            target_words: 200,
        }
    }
}

impl DigestConfig {
    /// Create a new configuration builder
    pub fn builder() -> DigestConfigBuilder {
        DigestConfigBuilder::default()
    }

    /// Defaults overridden by `OPENAI_MODEL`, `DIGEST_REQUEST_TIMEOUT_SECS`
    /// and `DIGEST_MAX_CONCURRENCY`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let timeout_secs = env_parse("DIGEST_REQUEST_TIMEOUT_SECS", defaults.request_timeout.as_secs())?;

        let config = Self {
            model: env_or("OPENAI_MODEL", &defaults.model),
            request_timeout: Duration::from_secs(timeout_secs),
            max_concurrency: env_parse("DIGEST_MAX_CONCURRENCY", defaults.max_concurrency)?,
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PROMPT_ARTICLES).contains(&self.max_articles) {
            return Err(ReportError::ConfigError(format!(
                "max_articles must be between 1 and {MAX_PROMPT_ARTICLES}"
            )));
        }

        if self.max_output_tokens == 0 {
            return Err(ReportError::ConfigError(
                "max_output_tokens must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ReportError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrency == 0 {
            return Err(ReportError::ConfigError(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.news_page_size == 0 || self.news_page_size > 100 {
            return Err(ReportError::ConfigError(
                "news_page_size must be between 1 and 100".to_string(),
            ));
        }

        if self.news_rate_limit == 0 {
            return Err(ReportError::ConfigError(
                "news_rate_limit must be greater than 0".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ReportError::ConfigError("model must not be empty".to_string()));
        }

        if self.temperature.is_some_and(|t| !(0.0..=2.0).contains(&t)) {
            return Err(ReportError::ConfigError(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for DigestConfig
#[derive(Debug, Default)]
pub struct DigestConfigBuilder {
    subject: Option<String>,
    currency: Option<String>,
    max_articles: Option<usize>,
    max_output_tokens: Option<usize>,
    model: Option<String>,
    temperature: Option<f32>,
    request_timeout: Option<Duration>,
    max_concurrency: Option<usize>,
    news_page_size: Option<u32>,
    news_rate_limit: Option<u32>,
    target_words: Option<u32>,
}

impl DigestConfigBuilder {
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn max_articles(mut self, n: usize) -> Self {
        self.max_articles = Some(n);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.max_output_tokens = Some(n);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    pub fn news_page_size(mut self, n: u32) -> Self {
        self.news_page_size = Some(n);
        self
    }

    pub fn news_rate_limit(mut self, per_minute: u32) -> Self {
        self.news_rate_limit = Some(per_minute);
        self
    }

    pub fn target_words(mut self, words: u32) -> Self {
        self.target_words = Some(words);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DigestConfig> {
        let defaults = DigestConfig::default();

        let config = DigestConfig {
            subject: self.subject.unwrap_or(defaults.subject),
            currency: self.currency.unwrap_or(defaults.currency),
            max_articles: self.max_articles.unwrap_or(defaults.max_articles),
            max_output_tokens: self.max_output_tokens.unwrap_or(defaults.max_output_tokens),
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature.or(defaults.temperature),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
            news_page_size: self.news_page_size.unwrap_or(defaults.news_page_size),
            news_rate_limit: self.news_rate_limit.unwrap_or(defaults.news_rate_limit),
            target_words: self.target_words.unwrap_or(defaults.target_words),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DigestConfig::default();
        assert_eq!(config.subject, "Weekly Portfolio Update");
        assert_eq!(config.max_articles, 5);
        assert_eq!(config.max_output_tokens, 2000);
        assert_eq!(config.max_concurrency, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = DigestConfig::builder()
            .subject("Daily")
            .max_articles(3)
            .max_concurrency(4)
            .request_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.subject, "Daily");
        assert_eq!(config.max_articles, 3);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.model, "gpt-4");
    }

    #[test]
    fn test_validation_rejects_article_count_out_of_range() {
        assert!(DigestConfig::builder().max_articles(0).build().is_err());
        assert!(DigestConfig::builder().max_articles(6).build().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        assert!(DigestConfig::builder().max_concurrency(0).build().is_err());
        assert!(DigestConfig::builder().request_timeout(Duration::ZERO).build().is_err());
        assert!(DigestConfig::builder().max_output_tokens(0).build().is_err());
        assert!(DigestConfig::builder().news_rate_limit(0).build().is_err());
    }

    #[test]
    fn test_validation_temperature() {
        assert!(DigestConfig::builder().temperature(0.7).build().is_ok());
        assert!(DigestConfig::builder().temperature(3.0).build().is_err());
    }
}
