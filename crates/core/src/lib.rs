//! Convert articles to Markdown while recovering the programming language of
//! every code block.
//!
//! The engine has five parts:
//!
//! - [`normalize`]: maps declared language names onto canonical identifiers
//! - [`scanner`]: reads declared languages from HTML code elements
//! - [`classifier`]: infers a language from weighted signals
//! - [`reattach`]: writes languages back onto Markdown fences
//! - [`formatters::table`]: rewrites HTML tables as pipe tables
//!
//! [`Converter`] wires them into an HTML → Markdown pipeline, after
//! [`extract`] has narrowed the page to its main content.

pub mod annotate;
pub mod article;
pub mod classifier;
pub mod config;
pub mod converter;
pub mod error;
pub mod extract;
pub mod fences;
pub mod formatters;
pub mod metadata;
pub mod normalize;
pub mod parse;
pub mod reattach;
pub mod scanner;
pub mod scoring;

pub use annotate::{annotate_code_languages, sanitize_code_classes};
pub use article::{Article, OutputFormat};
#[cfg(feature = "detector")]
pub use classifier::SyntectDetector;
pub use classifier::{
    CodeBlock, ContentDetector, DetectorChain, LanguageClassifier, LanguageScore, ScoreBoard, StatisticalDetector,
    WeightConfig,
};
pub use config::EngineConfig;
pub use converter::{Converter, ConverterConfig, ConverterConfigBuilder, convert, convert_with_url};
pub use error::{FencetagError, Result};
pub use extract::{ExtractConfig, ExtractedContent, extract_content};
pub use fences::{ContextWindow, FencedBlock, find_fenced_blocks};
pub use formatters::{MarkdownConfig, MarkdownFormatter, rewrite_table};
pub use metadata::Metadata;
pub use normalize::{LanguageNormalizer, normalize};
pub use parse::Document;
pub use reattach::{
    Attribution, AttributionOptions, AttributionSource, BlockAttribution, Strategy, attribute_languages, reattach,
};
pub use scanner::{CodeSpan, scan, scan_spans};
