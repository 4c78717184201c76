//! Content scoring for main-content extraction.
//!
//! Paragraph-level elements earn a content score from their prose. The score
//! flows to the enclosing containers, which also carry a base score from
//! their tag and a weight from their class and id.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Element;

/// Class/id patterns of containers that usually hold the article.
static POSITIVE_PATTERNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story|tutorial|docs?)")
        .expect("positive pattern is valid")
});

/// Class/id patterns of page chrome. Unlike generic readability scoring,
/// `code`, `highlight` and `example` are not negative here.
static NEGATIVE_PATTERNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|masthead|nav|related|remark|rss|share|shoutbox|sidebar|skyscraper|social|sponsor|ad-break|agegate|pagination|pager|popup|promo|toc|widget)",
    )
    .expect("negative pattern is valid")
});

/// Weights for content scoring
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Weight for positive class/ID patterns
    pub positive_weight: f64,
    /// Weight for negative class/ID patterns
    pub negative_weight: f64,
    /// Maximum content score from character count
    pub max_char_score: f64,
    /// Maximum content score from comma count
    pub max_comma_score: f64,
    /// Characters per point of character score
    pub chars_per_point: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_score: 3.0,
            max_comma_score: 3.0,
            chars_per_point: 100,
        }
    }
}

/// Base score of a container by tag name.
///
/// - ARTICLE, MAIN: +10
/// - SECTION: +8
/// - DIV: +5
/// - TD, BLOCKQUOTE: +3
/// - FORM, lists and definition items: -3
/// - headings, TH, HEADER, FOOTER, NAV, ASIDE: -5
pub fn base_tag_score(element: &Element<'_>) -> f64 {
    match element.tag_name() {
        "article" | "main" => 10.0,
        "section" => 8.0,
        "div" => 5.0,
        "td" | "blockquote" => 3.0,
        "form" | "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" | "aside" => -5.0,
        _ => 0.0,
    }
}

/// Weight from the element's id, then its class tokens. Positive patterns
/// win over negative ones on the same value.
pub fn class_id_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let values = element
        .attr("id")
        .into_iter()
        .chain(element.attr("class").into_iter().flat_map(str::split_whitespace));

    for value in values {
        if POSITIVE_PATTERNS.is_match(value) {
            return config.positive_weight;
        }
        if NEGATIVE_PATTERNS.is_match(value) {
            return config.negative_weight;
        }
    }

    0.0
}

/// Whether the element's class or id marks it as page chrome.
pub fn is_unlikely(element: &Element<'_>) -> bool {
    if matches!(element.tag_name(), "nav" | "aside" | "footer" | "form") {
        return true;
    }
    let label = [element.attr("id"), element.attr("class")].into_iter().flatten().collect::<Vec<_>>().join(" ");
    !label.is_empty() && NEGATIVE_PATTERNS.is_match(&label) && !POSITIVE_PATTERNS.is_match(&label)
}

/// Content score of a paragraph-level element: one point, plus one per
/// comma and one per `chars_per_point` characters, each capped.
pub fn content_score(text: &str, config: &ScoreConfig) -> f64 {
    let chars = text.chars().count();
    let char_score = ((chars / config.chars_per_point) as f64).min(config.max_char_score);
    let comma_score = (text.matches(',').count() as f64).min(config.max_comma_score);

    1.0 + char_score + comma_score
}

/// Ratio of link text to all text, from 0.0 to 1.0.
pub fn link_density(element: &Element<'_>) -> f64 {
    let text_length = element.text().chars().count();
    if text_length == 0 {
        return 0.0;
    }

    let link_length: usize = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|link| link.text().chars().count())
        .sum();

    link_length as f64 / text_length as f64
}
