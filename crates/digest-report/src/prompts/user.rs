//! User message templates

/// Template name registered in the composer's environment
pub const NEWS_ANALYSIS_NAME: &str = "news_analysis";

/// Per-ticker news analysis request
///
/// Expects `ticker`, `company_name`, `metrics` (label/value pairs),
/// `articles` (title plus optional body or summary) and `target_words`.
pub const NEWS_ANALYSIS: &str = r"Provide a cohesive financial analysis of the recent news for {{ company_name }} (stock ticker {{ ticker }}).
{% if metrics %}

Market data:
{% for metric in metrics %}
- {{ metric.label }}: {{ metric.value }}
{% endfor %}
{% endif %}

Recent news:
{% for article in articles %}

Title: {{ article.title }}
{% if article.body %}
Content: {{ article.body }}
{% elif article.summary %}
Description: {{ article.summary }}
{% else %}
No content or description available.
{% endif %}
{% endfor %}

Aim for roughly {{ target_words }} words.";
