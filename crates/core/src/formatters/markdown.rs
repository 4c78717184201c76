use tracing::warn;
use url::Url;

use crate::fences::find_fenced_blocks;
use crate::metadata::Metadata;
#[cfg(feature = "markdown")]
use crate::FencetagError;
use crate::Result;

/// Configuration for Markdown document assembly
#[derive(Debug, Clone)]
pub struct MarkdownConfig {
    /// Include TOML frontmatter with metadata
    pub include_frontmatter: bool,
    /// Include title as H1 heading at the start of content
    pub include_title_heading: bool,
    /// Include the source/author/date header block
    pub include_header: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { include_frontmatter: false, include_title_heading: true, include_header: true }
    }
}

/// Convert HTML to Markdown with the pipe-table handler installed.
///
/// Runs of blank lines outside fenced blocks collapse to one; leading and
/// trailing blank lines are removed.
#[cfg(feature = "markdown")]
pub fn html_to_markdown(html: &str) -> Result<String> {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["head", "script", "style", "noscript"])
        .add_handler(vec!["table"], super::table::table_handler)
        .build();

    let markdown = converter
        .convert(html)
        .map_err(|e| FencetagError::ConversionError(e.to_string()))?;

    Ok(normalize_blank_lines(&markdown))
}

/// Fallback HTML to text conversion when markdown feature is disabled
#[cfg(not(feature = "markdown"))]
pub fn html_to_markdown(html: &str) -> Result<String> {
    Ok(html_to_text(html))
}

/// Plain text of an HTML document: lines trimmed, blank runs collapsed.
pub fn html_to_text(html: &str) -> String {
    let text = crate::parse::Document::parse(html).text_content();
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    normalize_blank_lines(&lines.join("\n"))
}

/// Collapse blank-line runs outside fenced blocks and trim the ends.
pub fn normalize_blank_lines(markdown: &str) -> String {
    let blocks = find_fenced_blocks(markdown);
    let inside_fence = |line: usize| {
        blocks
            .iter()
            .any(|b| line > b.open_line && b.close_line.is_none_or(|close| line < close))
    };

    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = true;
    for (number, line) in markdown.lines().enumerate() {
        if inside_fence(number) {
            lines.push(line);
            previous_blank = false;
            continue;
        }

        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(if blank { "" } else { line });
        previous_blank = blank;
    }

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let mut output = lines.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

/// Assemble the final document around a Markdown body.
pub fn assemble_document(
    body: &str, metadata: &Metadata, source_url: Option<&str>, config: &MarkdownConfig,
) -> String {
    let mut output = String::new();

    if config.include_frontmatter {
        output.push_str(&generate_frontmatter(metadata, source_url));
        output.push('\n');
    }

    if config.include_title_heading
        && let Some(title) = &metadata.title
    {
        output.push_str(&format!("# {}\n\n", escape_markdown(title)));
    }

    if config.include_header
        && let Some(header) = generate_header(metadata, source_url)
    {
        output.push_str(&header);
    }

    output.push_str(body);
    output
}

/// Generate TOML frontmatter from metadata
fn generate_frontmatter(metadata: &Metadata, source_url: Option<&str>) -> String {
    let mut frontmatter = String::from("+++");

    if let Some(title) = &metadata.title {
        frontmatter.push_str(&format!("\ntitle = {}", toml_escape_string(title)));
    }

    if let Some(author) = &metadata.author {
        frontmatter.push_str(&format!("\nauthor = {}", toml_escape_string(author)));
    }

    if let Some(date) = &metadata.date {
        frontmatter.push_str(&format!("\ndate = {}", toml_escape_string(date)));
    }

    if let Some(site) = &metadata.site_name {
        frontmatter.push_str(&format!("\nsite = {}", toml_escape_string(site)));
    }

    if let Some(url) = source_url {
        frontmatter.push_str(&format!("\nsource = {}", toml_escape_string(url)));
    }

    frontmatter.push_str("\n+++\n");
    frontmatter
}

/// Header block: source link, author and date, closed by a rule.
fn generate_header(metadata: &Metadata, source_url: Option<&str>) -> Option<String> {
    let mut items = Vec::new();

    if let Some(url) = source_url {
        let label = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url.to_string());
        items.push(format!("- Source: [{}]({})", escape_markdown(&label), url));
    }

    if let Some(author) = &metadata.author {
        items.push(format!("- Author: {}", escape_markdown(author)));
    }

    if let Some(date) = &metadata.date {
        items.push(format!("- Date: {}", escape_markdown(date)));
    }

    if items.is_empty() {
        return None;
    }

    Some(format!("{}\n\n---\n\n", items.join("\n")))
}

/// Escape a string for TOML format
fn toml_escape_string(s: &str) -> String {
    let needs_escape = s.contains('"') || s.contains('\\') || s.contains('\n');
    if needs_escape {
        format!(
            "\"{}\"",
            s.replace('\\', "\\\\").replace('\"', "\\\"").replace('\n', "\\n")
        )
    } else {
        format!("\"{}\"", s)
    }
}

/// Escape inline Markdown syntax characters
pub fn escape_markdown(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '<' | '>' | '#') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Markdown formatter with configurable options
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormatter {
    config: MarkdownConfig,
}

impl MarkdownFormatter {
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarkdownConfig {
        &self.config
    }

    /// Convert an HTML body to Markdown, falling back to its plain text when
    /// the converter fails.
    pub fn body(&self, html: &str) -> String {
        match html_to_markdown(html) {
            Ok(markdown) => markdown,
            Err(e) => {
                warn!(error = %e, "markdown conversion failed, using plain text");
                html_to_text(html)
            }
        }
    }

    /// Wrap a Markdown body with the configured frontmatter, title and header.
    pub fn assemble(&self, body: &str, metadata: &Metadata, source_url: Option<&str>) -> String {
        assemble_document(body, metadata, source_url, &self.config)
    }
}
