//! Main conversion API.
//!
//! This module provides the primary entry point, the [`Converter`] struct:
//! HTML in, Markdown with a language on every recoverable code fence out.
//!
//! # Example
//!
//! ```rust
//! use fencetag_core::Converter;
//!
//! let html = r#"<h1>Intro</h1><pre><code class="lang-py">print("hi")</code></pre>"#;
//! let article = Converter::default().convert(html, None).unwrap();
//! assert!(article.markdown.contains("```python"));
//! ```

use tracing::debug;

use crate::annotate::{annotate_code_languages, sanitize_code_classes};
use crate::article::Article;
use crate::classifier::LanguageClassifier;
use crate::config::EngineConfig;
use crate::extract::{ExtractConfig, extract_content};
use crate::formatters::markdown::{MarkdownConfig, MarkdownFormatter};
use crate::normalize::LanguageNormalizer;
use crate::parse::Document;
use crate::reattach::{Attribution, attribute_languages};
use crate::scanner::scan_spans;
use crate::{FencetagError, Result};

/// Configuration for the Converter.
///
/// # Example
///
/// ```rust
/// use fencetag_core::ConverterConfig;
///
/// let config = ConverterConfig::builder()
///     .min_confidence(0.5)
///     .context_lines(2)
///     .frontmatter(true)
///     .build();
/// assert!(config.markdown.include_frontmatter);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConverterConfig {
    /// Engine settings (weights, threshold, aliases, annotation).
    pub engine: EngineConfig,

    /// Document assembly settings (frontmatter, title, header).
    pub markdown: MarkdownConfig,
}

impl ConverterConfig {
    /// Creates a new builder for ConverterConfig.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder::new()
    }
}

/// Builder for ConverterConfig.
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ConverterConfig::default() }
    }

    /// Replaces the engine settings wholesale.
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.config.engine = engine;
        self
    }

    /// Sets the minimum confidence for classified tags.
    pub fn min_confidence(mut self, value: f64) -> Self {
        self.config.engine.min_confidence = value;
        self
    }

    /// Sets the context window size in lines.
    pub fn context_lines(mut self, value: usize) -> Self {
        self.config.engine.context_lines = value;
        self
    }

    /// Sets whether code classes are annotated before conversion.
    pub fn annotate(mut self, value: bool) -> Self {
        self.config.engine.annotate = value;
        self
    }

    /// Sets whether the page is narrowed to its main content first.
    pub fn extract_content(mut self, value: bool) -> Self {
        self.config.engine.extract_content = value;
        self
    }

    /// Sets whether to emit TOML frontmatter.
    pub fn frontmatter(mut self, value: bool) -> Self {
        self.config.markdown.include_frontmatter = value;
        self
    }

    /// Sets whether to emit the title heading.
    pub fn title_heading(mut self, value: bool) -> Self {
        self.config.markdown.include_title_heading = value;
        self
    }

    /// Sets whether to emit the source/author/date header.
    pub fn header(mut self, value: bool) -> Self {
        self.config.markdown.include_header = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ConverterConfig {
        self.config
    }
}

impl Default for ConverterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTML → Markdown converter with language attribution.
#[derive(Debug)]
pub struct Converter {
    config: ConverterConfig,
    normalizer: LanguageNormalizer,
    classifier: LanguageClassifier,
    formatter: MarkdownFormatter,
}

impl Default for Converter {
    fn default() -> Self {
        Self::from_parts(ConverterConfig::default())
    }
}

impl Converter {
    /// Creates a converter, validating the engine settings.
    ///
    /// # Errors
    ///
    /// [`FencetagError::ConfigError`] for invalid weights or threshold.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.engine.validate()?;
        Ok(Self::from_parts(config))
    }

    /// Creates a converter with an explicit classifier, e.g. one without a
    /// detector or with a custom one.
    pub fn with_classifier(config: ConverterConfig, classifier: LanguageClassifier) -> Result<Self> {
        config.engine.validate()?;
        let normalizer = config.engine.normalizer();
        let formatter = MarkdownFormatter::new(config.markdown.clone());
        Ok(Self { config, normalizer, classifier, formatter })
    }

    fn from_parts(config: ConverterConfig) -> Self {
        let normalizer = config.engine.normalizer();
        let classifier = config.engine.classifier();
        let formatter = MarkdownFormatter::new(config.markdown.clone());
        Self { config, normalizer, classifier, formatter }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert an HTML document.
    ///
    /// Metadata comes from the whole page; code scanning and conversion see
    /// only the main content when it can be found. A page the Markdown
    /// converter rejects degrades to its plain text.
    pub fn convert(&self, html: &str, source_url: Option<&str>) -> Result<Article> {
        let doc = Document::parse(html);
        let metadata = doc.extract_metadata();

        let extracted = if self.config.engine.extract_content {
            extract_content(&doc, &ExtractConfig::default()).map(|content| content.content)
        } else {
            None
        };
        let html = extracted.as_deref().unwrap_or(html);

        let declared: Vec<String> = scan_spans(html, &self.normalizer)
            .into_iter()
            .map(|span| span.language)
            .collect();
        debug!(
            code_elements = declared.len(),
            declared = declared.iter().filter(|l| !l.is_empty()).count(),
            "scanned code elements"
        );

        let prepared = if self.config.engine.annotate {
            annotate_code_languages(html, &self.normalizer)
        } else {
            sanitize_code_classes(html)
        };

        let body = self.formatter.body(&prepared);
        let attribution = self.attribute(&body, Some(&declared));
        let markdown = self.formatter.assemble(&attribution.markdown, &metadata, source_url);

        Ok(Article::new(markdown, attribution, metadata, declared, source_url.map(str::to_string)))
    }

    /// Attribute languages in Markdown that did not come from HTML.
    pub fn tag_markdown(&self, markdown: &str) -> Attribution {
        self.attribute(markdown, None)
    }

    fn attribute(&self, markdown: &str, declared: Option<&[String]>) -> Attribution {
        attribute_languages(markdown, declared, &self.classifier, &self.config.engine.attribution_options())
    }
}

/// Convert HTML with the default configuration.
pub fn convert(html: &str) -> Result<Article> {
    Converter::default().convert(html, None)
}

/// Convert HTML with a source URL, which is validated.
///
/// # Errors
///
/// [`FencetagError::ConfigError`] when the URL does not parse.
pub fn convert_with_url(html: &str, source_url: &str) -> Result<Article> {
    url::Url::parse(source_url).map_err(|e| FencetagError::ConfigError(format!("invalid source URL: {e}")))?;
    Converter::default().convert(html, Some(source_url))
}
