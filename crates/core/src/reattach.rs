//! Language reattachment for converted Markdown.
//!
//! HTML→Markdown conversion tends to lose the language of code blocks. The
//! languages recovered by the scanner are written back onto the fences
//! positionally when the counts line up; whatever is still untagged is then
//! classified from its own content and surrounding prose.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, trace};

use crate::classifier::{CodeBlock, LanguageClassifier, LanguageScore};
use crate::fences::{context_window, find_fenced_blocks, rewrite_tokens};

/// Knobs for [`attribute_languages`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributionOptions {
    /// Lines of prose collected on each side of a block.
    pub context_lines: usize,
    /// A classified language is only written when its confidence exceeds this.
    pub min_confidence: f64,
}

impl Default for AttributionOptions {
    fn default() -> Self {
        Self { context_lines: 3, min_confidence: 0.3 }
    }
}

/// How declared languages were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Declared languages were aligned with fences by position.
    Positional,
    /// Every untagged block was classified on its own.
    Independent,
}

/// Where the final language of a block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionSource {
    /// The fence already carried a language.
    Declared,
    /// Taken from the declared list by position.
    Positional,
    /// Inferred by the classifier.
    Classified,
    /// No language could be attributed.
    Untagged,
}

/// Per-block attribution report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockAttribution {
    pub index: usize,
    pub language: String,
    pub source: AttributionSource,
    pub confidence: f64,
}

/// Rewritten Markdown plus what happened to every block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    pub markdown: String,
    pub strategy: Strategy,
    pub blocks: Vec<BlockAttribution>,
}

impl Attribution {
    /// Number of blocks that ended with a language.
    pub fn tagged_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.source != AttributionSource::Untagged).count()
    }
}

/// Write `languages[n]` onto the nth fenced block.
///
/// Empty entries leave their block untouched, and the position still
/// advances. Entries beyond the last fence are ignored. Only fence header
/// tokens change.
///
/// # Example
///
/// ```rust
/// use fencetag_core::reattach::reattach;
///
/// let md = "```\nA\n```\n\n```\nB\n```";
/// assert_eq!(reattach(md, &["python", ""]), "```python\nA\n```\n\n```\nB\n```");
/// ```
pub fn reattach<S: AsRef<str>>(markdown: &str, languages: &[S]) -> String {
    let blocks = find_fenced_blocks(markdown);
    if blocks.is_empty() {
        return markdown.to_string();
    }

    let replacements: Vec<(usize, String)> = blocks
        .iter()
        .zip(languages)
        .filter(|(_, language)| !language.as_ref().is_empty())
        .map(|(block, language)| (block.index, language.as_ref().to_string()))
        .collect();

    rewrite_tokens(markdown, &blocks, &replacements)
}

/// Attribute a language to every fenced block of `markdown`.
///
/// With a `declared` list whose length matches the fence count, the list is
/// applied positionally. Any block still untagged is then classified from
/// its content and a context window; the tag is written only above
/// `options.min_confidence`.
pub fn attribute_languages(
    markdown: &str, declared: Option<&[String]>, classifier: &LanguageClassifier, options: &AttributionOptions,
) -> Attribution {
    let blocks = find_fenced_blocks(markdown);

    let mut report: Vec<BlockAttribution> = blocks
        .iter()
        .map(|block| BlockAttribution {
            index: block.index,
            language: block.language.clone(),
            source: if block.is_tagged() { AttributionSource::Declared } else { AttributionSource::Untagged },
            confidence: if block.is_tagged() { 1.0 } else { 0.0 },
        })
        .collect();

    let mut strategy = Strategy::Independent;
    match declared {
        Some(list) if list.len() == blocks.len() => {
            strategy = Strategy::Positional;
            for (entry, language) in report.iter_mut().zip(list) {
                if !language.is_empty() {
                    entry.language = language.clone();
                    entry.source = AttributionSource::Positional;
                    entry.confidence = 1.0;
                }
            }
        }
        Some(list) => {
            debug!(declared = list.len(), fences = blocks.len(), "declared language count mismatch, skipping positional");
        }
        None => {}
    }

    let pending: Vec<usize> = report
        .iter()
        .filter(|entry| entry.language.is_empty())
        .map(|entry| entry.index)
        .collect();

    let scores: Vec<(usize, LanguageScore)> = pending
        .par_iter()
        .map(|&index| {
            let block = &blocks[index];
            let context = context_window(markdown, block, options.context_lines);
            let score = classifier.classify(&CodeBlock::new(block.content.as_str()).with_context(context));
            (index, score)
        })
        .collect();

    for (index, score) in scores {
        trace!(index, language = score.language.as_str(), confidence = score.confidence, "block score");
        let entry = &mut report[index];
        entry.confidence = score.confidence;
        if !score.is_empty() && score.confidence > options.min_confidence {
            entry.language = score.language;
            entry.source = AttributionSource::Classified;
        }
    }

    let replacements: Vec<(usize, String)> = report
        .iter()
        .filter(|entry| matches!(entry.source, AttributionSource::Positional | AttributionSource::Classified))
        .map(|entry| (entry.index, entry.language.clone()))
        .collect();

    debug!(
        ?strategy,
        fences = blocks.len(),
        rewritten = replacements.len(),
        "attributed code block languages"
    );

    Attribution { markdown: rewrite_tokens(markdown, &blocks, &replacements), strategy, blocks: report }
}
