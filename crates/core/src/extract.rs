//! Main-content extraction.
//!
//! Finds the container holding the article body so that navigation,
//! sidebars and footers, and the code snippets they carry, stay out of the
//! converted document. Paragraph-level elements are scored by
//! [`crate::scoring`], their scores flow to parent (full) and grandparent
//! (half), and the best container wins together with qualifying siblings.
//!
//! A page where no container clears [`ExtractConfig::min_score_threshold`]
//! is not narrowed: the caller converts the whole document.

use tracing::debug;

use crate::parse::{Document, Element};
use crate::scoring::{ScoreConfig, base_tag_score, class_id_weight, content_score, is_unlikely, link_density};

/// Tags scored as paragraphs
const PARAGRAPH_TAGS: &str = "p, pre, td, blockquote";

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum score of the top candidate
    pub min_score_threshold: f64,
    /// Minimum characters for a paragraph to be scored
    pub min_paragraph_chars: usize,
    /// Sibling score threshold (multiplier of top score)
    pub sibling_threshold: f64,
    /// Maximum paragraphs to score
    pub max_elements: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { min_score_threshold: 20.0, min_paragraph_chars: 25, sibling_threshold: 0.2, max_elements: 1000 }
    }
}

/// The result of content extraction
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Outer HTML of the top candidate and its siblings, in document order
    pub content: String,
    /// The top candidate score
    pub top_score: f64,
    /// Number of elements extracted
    pub element_count: usize,
}

struct Candidate<'a> {
    element: Element<'a>,
    score: f64,
}

/// Extract the main content of a document.
///
/// Returns `None` when no container is confidently the article body.
pub fn extract_content(doc: &Document, config: &ExtractConfig) -> Option<ExtractedContent> {
    let score_config = ScoreConfig::default();
    let mut candidates: Vec<Candidate<'_>> = Vec::new();

    for paragraph in doc.select(PARAGRAPH_TAGS).ok()?.into_iter().take(config.max_elements) {
        if in_unlikely_container(&paragraph) {
            continue;
        }
        let text = paragraph.text();
        let text = text.trim();
        if text.chars().count() < config.min_paragraph_chars {
            continue;
        }

        let score = content_score(text, &score_config);
        let Some(parent) = paragraph.parent() else { continue };
        add_score(&mut candidates, &parent, score, &score_config);
        if let Some(grandparent) = parent.parent() {
            add_score(&mut candidates, &grandparent, score / 2.0, &score_config);
        }
    }

    for candidate in &mut candidates {
        candidate.score *= 1.0 - link_density(&candidate.element);
    }

    let mut top: Option<&Candidate<'_>> = None;
    for candidate in &candidates {
        if top.is_none_or(|best| candidate.score > best.score) {
            top = Some(candidate);
        }
    }
    let top = top?;

    if top.score < config.min_score_threshold {
        debug!(top_score = top.score, threshold = config.min_score_threshold, "no main content container");
        return None;
    }

    let parts = with_siblings(top, &candidates, config);
    debug!(
        container = top.element.tag_name(),
        top_score = top.score,
        elements = parts.len(),
        "extracted main content"
    );

    Some(ExtractedContent {
        content: parts.iter().map(Element::outer_html).collect::<Vec<_>>().join("\n"),
        top_score: top.score,
        element_count: parts.len(),
    })
}

fn add_score<'a>(candidates: &mut Vec<Candidate<'a>>, element: &Element<'a>, score: f64, config: &ScoreConfig) {
    if matches!(element.tag_name(), "html" | "body") {
        return;
    }
    match candidates.iter_mut().find(|candidate| candidate.element.is(element)) {
        Some(candidate) => candidate.score += score,
        None => candidates.push(Candidate {
            element: element.clone(),
            score: base_tag_score(element) + class_id_weight(element, config) + score,
        }),
    }
}

fn in_unlikely_container(element: &Element<'_>) -> bool {
    let mut current = Some(element.clone());
    while let Some(el) = current {
        if matches!(el.tag_name(), "article" | "main" | "body") {
            return false;
        }
        if is_unlikely(&el) {
            return true;
        }
        current = el.parent();
    }
    false
}

/// The top candidate plus siblings whose score clears the sibling
/// threshold, and prose paragraphs with few links.
fn with_siblings<'a>(top: &Candidate<'a>, candidates: &[Candidate<'a>], config: &ExtractConfig) -> Vec<Element<'a>> {
    let Some(parent) = top.element.parent() else {
        return vec![top.element.clone()];
    };

    let threshold = top.score * config.sibling_threshold;
    parent
        .children()
        .filter(|sibling| {
            if sibling.is(&top.element) {
                return true;
            }
            if candidates
                .iter()
                .any(|candidate| candidate.element.is(sibling) && candidate.score >= threshold)
            {
                return true;
            }
            sibling.tag_name() == "p" && sibling.text().trim().chars().count() > 80 && link_density(sibling) < 0.25
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROSE: &str = "Deploying the service takes three steps, and each one builds on the last, \
                         so read them in order, then run the commands below on a fresh machine.";

    fn page() -> String {
        format!(
            r#"<html><body>
            <nav class="site-nav"><pre><code class="language-bash">npm install site-theme</code></pre><a href="/">Home</a></nav>
            <div class="layout">
              <aside class="sidebar"><p>{PROSE}</p><pre><code class="language-ruby">puts "ad"</code></pre></aside>
              <article class="post">
                <p>{PROSE}</p>
                <pre><code class="language-go">package main</code></pre>
                <p>{PROSE}</p>
                <p>{PROSE}</p>
              </article>
            </div>
            <footer><p>{PROSE}</p></footer>
            </body></html>"#
        )
    }

    #[test]
    fn test_extracts_article_container() {
        let doc = Document::parse(&page());
        let extracted = extract_content(&doc, &ExtractConfig::default()).expect("article should be found");

        assert!(extracted.content.starts_with("<article class=\"post\">"));
        assert!(extracted.content.contains("language-go"));
        assert!(!extracted.content.contains("language-bash"));
        assert!(!extracted.content.contains("language-ruby"));
        assert!(extracted.top_score >= 20.0);
    }

    #[test]
    fn test_short_page_is_not_narrowed() {
        let doc = Document::parse("<p>Start here.</p><pre><code>x = 1</code></pre>");
        assert!(extract_content(&doc, &ExtractConfig::default()).is_none());
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::parse("");
        assert!(extract_content(&doc, &ExtractConfig::default()).is_none());
    }

    #[test]
    fn test_prose_sibling_included() {
        let html = format!(
            r#"<body><div><div id="content"><p>{PROSE}</p><p>{PROSE}</p></div><p>{PROSE}</p><ul class="menu"><li><a href="/a">A link list item</a></li></ul></div></body>"#
        );
        let doc = Document::parse(&html);
        let extracted = extract_content(&doc, &ExtractConfig::default()).unwrap();

        assert_eq!(extracted.element_count, 2);
        assert!(extracted.content.starts_with("<div id=\"content\">"));
        assert!(!extracted.content.contains("menu"));
    }
}
