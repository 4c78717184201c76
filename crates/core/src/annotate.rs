//! Streaming HTML annotation of code languages.
//!
//! Before conversion, every `code` element whose class declares a language
//! (by the scanner's rules) gets a canonical `language-<id>` class token in
//! front, which the Markdown converter turns into a fence info string. A
//! `pre` whose own class resolves gets a `data-language` attribute.
//!
//! Both passes first drop `language-*` class tokens that could not stand as
//! a fence info string.

use crate::fences::is_fence_token;
use crate::normalize::LanguageNormalizer;
use crate::scanner::resolve_class;

/// Annotate code elements of `html` with canonical language classes.
///
/// Also applies [`sanitize_code_classes`]. Rewriting errors return the input
/// unchanged.
///
/// # Example
///
/// ```rust
/// use fencetag_core::annotate::annotate_code_languages;
/// use fencetag_core::normalize::default_normalizer;
///
/// let html = r#"<pre><code class="highlight js">x</code></pre>"#;
/// let out = annotate_code_languages(html, default_normalizer());
/// assert!(out.contains(r#"class="language-javascript highlight js""#));
/// ```
pub fn annotate_code_languages(html: &str, normalizer: &LanguageNormalizer) -> String {
    rewrite_code_classes(html, Some(normalizer))
}

/// Drop `language-*` class tokens on code elements whose suffix cannot be a
/// fence info token, e.g. one containing a backtick.
///
/// The Markdown converter copies that suffix verbatim after the opening
/// fence, where a backtick would break the fence.
pub fn sanitize_code_classes(html: &str) -> String {
    rewrite_code_classes(html, None)
}

fn fence_safe_class(class: &str) -> String {
    class
        .split_whitespace()
        .filter(|token| token.strip_prefix("language-").is_none_or(is_fence_token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn rewrite_code_classes(html: &str, normalizer: Option<&LanguageNormalizer>) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![
                lol_html::element!("code[class]", |el| {
                    if let Some(class) = el.get_attribute("class") {
                        let mut safe = fence_safe_class(&class);
                        if let Some(normalizer) = normalizer {
                            let language = resolve_class(&safe, normalizer);
                            let token = format!("language-{}", language);
                            if !language.is_empty() && !safe.split(' ').any(|t| t == token) {
                                safe = if safe.is_empty() { token } else { format!("{} {}", token, safe) };
                            }
                        }
                        if safe != class.trim() {
                            el.set_attribute("class", &safe).ok();
                        }
                    }
                    Ok(())
                }),
                lol_html::element!("pre[class]", |el| {
                    if let Some(class) = el.get_attribute("class") {
                        let safe = fence_safe_class(&class);
                        if let Some(normalizer) = normalizer {
                            let language = resolve_class(&safe, normalizer);
                            if !language.is_empty() {
                                el.set_attribute("data-language", &language).ok();
                            }
                        }
                        if safe != class.trim() {
                            el.set_attribute("class", &safe).ok();
                        }
                    }
                    Ok(())
                }),
            ],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }

    if rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}
