//! Article output type with Markdown, metadata and per-block attribution.
//!
//! This module defines the [`Article`] struct which represents the complete
//! result of a conversion: the assembled Markdown document, the metadata it
//! was built from, and a report of how every code block got its language.

use std::str::FromStr;

use serde::Serialize;

use crate::metadata::Metadata;
use crate::reattach::{Attribution, AttributionSource, BlockAttribution, Strategy};
use crate::{FencetagError, Result};

/// Output format options for Article content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown document.
    Markdown,
    /// JSON report including the Markdown.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: markdown, json", s)),
        }
    }
}

/// The complete result of converting a document.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    /// Final Markdown document.
    pub markdown: String,

    /// Extracted metadata (title, author, date, site name).
    pub metadata: Metadata,

    /// Languages declared in the HTML, one per code-bearing element.
    pub declared_languages: Vec<String>,

    /// How the declared list was applied.
    pub strategy: Strategy,

    /// Attribution of every fenced block, in document order.
    pub code_blocks: Vec<BlockAttribution>,

    /// Source URL if known.
    pub source_url: Option<String>,
}

impl Article {
    /// Creates a new Article from an attribution result and the assembled
    /// document.
    pub fn new(
        markdown: String, attribution: Attribution, metadata: Metadata, declared_languages: Vec<String>,
        source_url: Option<String>,
    ) -> Self {
        Self {
            markdown,
            metadata,
            declared_languages,
            strategy: attribution.strategy,
            code_blocks: attribution.blocks,
            source_url,
        }
    }

    /// Converts content to the specified format.
    pub fn to_format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Markdown => Ok(self.markdown.clone()),
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| FencetagError::Serialization(e.to_string()))
            }
        }
    }

    /// Gets content as structured JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| FencetagError::Serialization(e.to_string()))
    }

    /// Languages of the fenced blocks, `""` for untagged ones.
    pub fn languages(&self) -> Vec<&str> {
        self.code_blocks.iter().map(|b| b.language.as_str()).collect()
    }

    /// Number of fenced blocks that ended up untagged.
    pub fn untagged_count(&self) -> usize {
        self.code_blocks
            .iter()
            .filter(|b| b.source == AttributionSource::Untagged)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Article {
        let attribution = Attribution {
            markdown: "```go\npackage main\n```\n\n```\nA\n```\n".to_string(),
            strategy: Strategy::Positional,
            blocks: vec![
                BlockAttribution {
                    index: 0,
                    language: "go".to_string(),
                    source: AttributionSource::Positional,
                    confidence: 1.0,
                },
                BlockAttribution {
                    index: 1,
                    language: String::new(),
                    source: AttributionSource::Untagged,
                    confidence: 0.0,
                },
            ],
        };
        let metadata = Metadata { title: Some("Test Article".to_string()), ..Default::default() };
        Article::new(
            attribution.markdown.clone(),
            attribution,
            metadata,
            vec!["go".to_string(), String::new()],
            Some("https://example.com".to_string()),
        )
    }

    #[test]
    fn test_article_creation() {
        let article = sample();
        assert_eq!(article.languages(), vec!["go", ""]);
        assert_eq!(article.untagged_count(), 1);
        assert_eq!(article.strategy, Strategy::Positional);
    }

    #[test]
    fn test_to_format_markdown() {
        let article = sample();
        assert_eq!(article.to_format(OutputFormat::Markdown).unwrap(), article.markdown);
    }

    #[test]
    fn test_to_json() {
        let json = sample().to_json().unwrap();
        assert_eq!(json["metadata"]["title"], "Test Article");
        assert_eq!(json["strategy"], "positional");
        assert_eq!(json["code_blocks"][0]["language"], "go");
        assert_eq!(json["code_blocks"][1]["source"], "untagged");
        assert_eq!(json["source_url"], "https://example.com");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_to_format_json_is_pretty() {
        let text = sample().to_format(OutputFormat::Json).unwrap();
        assert!(text.contains("\n  \"markdown\""));
    }
}
