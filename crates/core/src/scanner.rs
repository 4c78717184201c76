//! Code-span scanning.
//!
//! Walks an HTML document and resolves one declared language per
//! code-bearing element. The traversal order is fixed, because positional
//! reattachment later aligns this list with the fences of the converted
//! Markdown:
//!
//! 1. every `pre` that contains a `code` element, in document order, read
//!    from its first `code` descendant;
//! 2. every `code` element not nested in a `pre`, in document order.
//!
//! Elements without a usable class still produce an entry (the empty
//! string), so the positions of later elements stay stable.

use crate::normalize::{LanguageNormalizer, default_normalizer};
use crate::parse::Document;
use tracing::trace;

/// Class tokens that describe styling, never a language.
pub const EXCLUDED_CLASSES: &[&str] = &[
    "highlight",
    "code",
    "source",
    "source-code",
    "prettyprint",
    "linenums",
    "hljs",
    "language",
    "lang",
];

/// Class prefixes that declare a language explicitly.
const LANGUAGE_PREFIXES: &[&str] = &["language-", "lang-"];

/// One code-bearing element met during the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSpan {
    /// Raw `class` attribute text (empty when absent).
    pub class: String,
    /// Resolved canonical language, or `""` when the class declares none.
    pub language: String,
    /// Position in traversal order, starting at 0.
    pub index: usize,
}

/// Scan with the default normalizer and return only the languages.
///
/// # Example
///
/// ```rust
/// use fencetag_core::scanner::scan;
///
/// let html = r#"<pre><code class="language-python">print(1)</code></pre>"#;
/// assert_eq!(scan(html), vec!["python".to_string()]);
/// ```
pub fn scan(html: &str) -> Vec<String> {
    scan_spans(html, default_normalizer())
        .into_iter()
        .map(|span| span.language)
        .collect()
}

/// Scan a document and return every code span in traversal order.
pub fn scan_spans(html: &str, normalizer: &LanguageNormalizer) -> Vec<CodeSpan> {
    let doc = Document::parse(html);
    let mut spans = Vec::new();

    if let Ok(blocks) = doc.select("pre") {
        for pre in blocks {
            let Ok(codes) = pre.select("code") else { continue };
            let Some(code) = codes.first() else { continue };
            let class = code.attr("class").unwrap_or_default();
            push_span(&mut spans, class, normalizer);
        }
    }

    if let Ok(inline) = doc.select("code") {
        for code in inline.iter().filter(|code| !code.has_ancestor("pre")) {
            let class = code.attr("class").unwrap_or_default();
            push_span(&mut spans, class, normalizer);
        }
    }

    spans
}

fn push_span(spans: &mut Vec<CodeSpan>, class: &str, normalizer: &LanguageNormalizer) {
    let language = resolve_class(class, normalizer);
    let index = spans.len();
    trace!(index, class, language = language.as_str(), "code span");
    spans.push(CodeSpan { class: class.to_string(), language, index });
}

/// Resolve the language declared by a `class` attribute.
///
/// Prefixed tokens (`language-x`, `lang-x`) win and go through the
/// permissive normalizer. Otherwise the first bare token that is not a
/// styling class and is a known alias wins. Returns `""` when nothing
/// resolves.
pub fn resolve_class(class: &str, normalizer: &LanguageNormalizer) -> String {
    let tokens: Vec<&str> = class.split_whitespace().collect();

    for token in &tokens {
        for prefix in LANGUAGE_PREFIXES {
            if let Some(rest) = strip_prefix_ignore_case(token, prefix) {
                let language = normalizer.normalize(rest);
                if !language.is_empty() {
                    return language;
                }
            }
        }
    }

    tokens
        .iter()
        .filter(|token| !is_excluded(token))
        .find_map(|token| normalizer.lookup(token))
        .map(str::to_string)
        .unwrap_or_default()
}

fn is_excluded(token: &str) -> bool {
    EXCLUDED_CLASSES.iter().any(|excluded| excluded.eq_ignore_ascii_case(token))
}

fn strip_prefix_ignore_case<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    let head = token.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) { token.get(prefix.len()..) } else { None }
}
