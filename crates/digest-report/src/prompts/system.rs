//! System prompts

/// Sent with every narrative request
pub const NEWS_ANALYST: &str =
    "You are a financial analyst providing detailed and cohesive analyses of stock news.";
