//! HTML parsing and DOM queries.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! code-span scanner and metadata extraction. Parsing never fails: the
//! HTML5 parser recovers from malformed markup, so a broken document simply
//! yields fewer elements.
//!
//! # Example
//!
//! ```rust
//! use fencetag_core::parse::Document;
//!
//! let html = r#"<pre><code class="language-rust">fn main() {}</code></pre>"#;
//! let doc = Document::parse(html);
//! let code = doc.select("pre code").unwrap();
//! assert_eq!(code[0].attr("class"), Some("language-rust"));
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{FencetagError, Result};

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Parses an HTML fragment, such as the serialized table handed over by
    /// the Markdown converter.
    pub fn parse_fragment(html: &str) -> Self {
        Self { html: Html::parse_fragment(html) }
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`FencetagError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Gets the first element matching a selector, if any.
    pub fn select_first(&'_ self, selector: &str) -> Option<Element<'_>> {
        let sel = Selector::parse(selector).ok()?;
        self.html.select(&sel).next().map(|el| Element { element: el })
    }

    /// Gets the content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        self.select_first("title").map(|el| el.text())
    }

    /// Gets the `content` attribute of a `<meta>` tag matched by `property`
    /// or `name`.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        for attr in ["property", "name"] {
            let selector = format!("meta[{}=\"{}\"]", attr, key);
            if let Some(el) = self.select_first(&selector)
                && let Some(content) = el.attr("content")
            {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
        None
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }

    /// Gets the `<body>` element, or the root element for fragments.
    pub fn body(&'_ self) -> Element<'_> {
        self.select_first("body")
            .unwrap_or(Element { element: self.html.root_element() })
    }
}

/// A wrapper around scraper's ElementRef.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the underlying scraper element.
    pub fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// Whether both wrap the same node.
    pub fn is(&self, other: &Element<'_>) -> bool {
        self.element == other.element
    }

    /// Gets the lower-cased tag name.
    pub fn tag_name(&self) -> &'a str {
        self.element.value().name()
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the parent element, if the parent is an element.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(|el| Element { element: el })
    }

    /// Gets the child elements, in document order.
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.children().filter_map(ElementRef::wrap).map(|el| Element { element: el })
    }

    /// Gets the text content of this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Whether any ancestor of this element has the given tag name.
    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| ancestor.value().name().eq_ignore_ascii_case(tag))
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`FencetagError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| FencetagError::HtmlParseError(format!("Invalid selector: {}", e)))
}
