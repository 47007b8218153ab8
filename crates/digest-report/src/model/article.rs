//! News articles returned by the news adapter

use serde::{Deserialize, Serialize};

/// A single news item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Full (often truncated) article text
    pub body: Option<String>,
    /// Short description or teaser
    pub summary: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
}

/// What the prompt should show for an article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleText<'a> {
    Body(&'a str),
    Summary(&'a str),
    Missing,
}

impl Article {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Body if present, else summary; blank text counts as absent
    pub fn text(&self) -> ArticleText<'_> {
        if let Some(body) = non_blank(self.body.as_deref()) {
            ArticleText::Body(body)
        } else if let Some(summary) = non_blank(self.summary.as_deref()) {
            ArticleText::Summary(summary)
        } else {
            ArticleText::Missing
        }
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}
