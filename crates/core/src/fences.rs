//! Fenced code block recognition in Markdown.
//!
//! Fences are recognized line by line: an opening line of three or more
//! backticks (indented at most three spaces) with an optional info string,
//! the body, and a closing line of at least as many backticks with nothing
//! else on it. A fence left open runs to the end of the document.
//!
//! The parser records byte spans so that callers can rewrite the language
//! token of a header without touching any other byte of the document.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static OPENING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^( {0,3})(`{3,})([ \t]*)([^\s`]*)([^`]*)$").expect("opening fence pattern is valid")
});

static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(`{3,})[ \t]*$").expect("closing fence pattern is valid"));

/// A fenced code block found in a Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Position among the document's fenced blocks, starting at 0.
    pub index: usize,
    /// Length of the opening backtick run.
    pub fence_len: usize,
    /// Language token of the opening line (first word of the info string).
    pub language: String,
    /// Body text between the fences, without the final line break.
    pub content: String,
    /// Byte range of the language token in the document. Empty when the
    /// fence has no token; it then marks where a token would be inserted.
    pub token_span: Range<usize>,
    /// Zero-based line number of the opening fence.
    pub open_line: usize,
    /// Zero-based line number of the closing fence, `None` when unclosed.
    pub close_line: Option<usize>,
}

impl FencedBlock {
    /// Whether the opening fence carries a language token.
    pub fn is_tagged(&self) -> bool {
        !self.language.is_empty()
    }

    /// Whether a closing fence was found.
    pub fn is_closed(&self) -> bool {
        self.close_line.is_some()
    }
}

/// Text surrounding a fenced block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextWindow {
    /// Lines preceding the opening fence.
    pub before: String,
    /// Lines following the closing fence.
    pub after: String,
}

impl ContextWindow {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self { before: before.into(), after: after.into() }
    }

    /// Both sides joined by a line break.
    pub fn text(&self) -> String {
        match (self.before.is_empty(), self.after.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.before.clone(),
            (true, false) => self.after.clone(),
            (false, false) => format!("{}\n{}", self.before, self.after),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.before.trim().is_empty() && self.after.trim().is_empty()
    }
}

struct Line<'a> {
    start: usize,
    text: &'a str,
}

fn split_lines(markdown: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for raw in markdown.split_inclusive('\n') {
        let text = raw.trim_end_matches('\n').trim_end_matches('\r');
        lines.push(Line { start, text });
        start += raw.len();
    }
    lines
}

/// Find all fenced code blocks in document order.
pub fn find_fenced_blocks(markdown: &str) -> Vec<FencedBlock> {
    let lines = split_lines(markdown);
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        let Some(caps) = OPENING_FENCE.captures(line.text) else {
            i += 1;
            continue;
        };

        let fence_len = caps.get(2).map_or(3, |m| m.len());
        let token = caps.get(4).map_or("", |m| m.as_str());
        let token_start = line.start + caps.get(4).map_or(line.text.len(), |m| m.start());
        let token_span = token_start..token_start + token.len();

        let close = (i + 1..lines.len()).find(|&j| {
            CLOSING_FENCE
                .captures(lines[j].text)
                .and_then(|c| c.get(1))
                .is_some_and(|run| run.len() >= fence_len)
        });

        let body_end = close.unwrap_or(lines.len());
        let content = lines[i + 1..body_end]
            .iter()
            .map(|l| l.text)
            .collect::<Vec<_>>()
            .join("\n");

        blocks.push(FencedBlock {
            index: blocks.len(),
            fence_len,
            language: token.to_string(),
            content,
            token_span,
            open_line: i,
            close_line: close,
        });

        i = close.map_or(lines.len(), |c| c + 1);
    }

    blocks
}

/// Count the fenced code blocks of a document.
pub fn count_fenced_blocks(markdown: &str) -> usize {
    find_fenced_blocks(markdown).len()
}

/// Collect up to `lines` lines on each side of a block.
pub fn context_window(markdown: &str, block: &FencedBlock, lines: usize) -> ContextWindow {
    if lines == 0 {
        return ContextWindow::default();
    }

    let all: Vec<&str> = split_lines(markdown).into_iter().map(|l| l.text).collect();

    let before_start = block.open_line.saturating_sub(lines);
    let before = all[before_start..block.open_line].join("\n");

    let after = match block.close_line {
        Some(close) => {
            let start = (close + 1).min(all.len());
            let end = (close + 1 + lines).min(all.len());
            all[start..end].join("\n")
        }
        None => String::new(),
    };

    ContextWindow { before, after }
}

/// Whether `language` can stand as a fence info token.
///
/// A backtick in the info string would turn the opening line into an inline
/// code span, and whitespace would split the token.
pub fn is_fence_token(language: &str) -> bool {
    !language.is_empty() && !language.chars().any(|c| c == '`' || c.is_whitespace())
}

/// Rewrite the language tokens of selected blocks.
///
/// `replacements` pairs a block (by its token span) with the new token.
/// Replacements that are not valid fence tokens are skipped. Every other
/// byte of `markdown` is copied unchanged.
pub fn rewrite_tokens(markdown: &str, blocks: &[FencedBlock], replacements: &[(usize, String)]) -> String {
    let mut spans: Vec<(&Range<usize>, &str)> = replacements
        .iter()
        .filter(|(_, language)| is_fence_token(language))
        .filter_map(|(index, language)| blocks.get(*index).map(|b| (&b.token_span, language.as_str())))
        .collect();
    spans.sort_by_key(|(span, _)| span.start);

    let mut output = String::with_capacity(markdown.len() + spans.len() * 8);
    let mut cursor = 0;
    for (span, language) in spans {
        if span.start < cursor {
            continue;
        }
        output.push_str(&markdown[cursor..span.start]);
        output.push_str(language);
        cursor = span.end;
    }
    output.push_str(&markdown[cursor..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_simple_blocks() {
        let md = "```\nA\n```\n\n```python\nB\n```";
        let blocks = find_fenced_blocks(md);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, "");
        assert_eq!(blocks[0].content, "A");
        assert_eq!(blocks[1].language, "python");
        assert_eq!(blocks[1].content, "B");
        assert_eq!(&md[blocks[1].token_span.clone()], "python");
    }

    #[test]
    fn test_info_string_keeps_first_word() {
        let md = "``` js title=\"x.js\"\nlet a;\n```\n";
        let blocks = find_fenced_blocks(md);
        assert_eq!(blocks[0].language, "js");
        assert_eq!(&md[blocks[0].token_span.clone()], "js");
    }

    #[test]
    fn test_longer_fence_contains_shorter() {
        let md = "````markdown\n```rust\nfn a() {}\n```\n````\n";
        let blocks = find_fenced_blocks(md);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "markdown");
        assert_eq!(blocks[0].fence_len, 4);
        assert!(blocks[0].content.contains("```rust"));
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let md = "text\n```go\npackage main\n";
        let blocks = find_fenced_blocks(md);
        assert_eq!(blocks.len(), 1);
        assert!(!blocks[0].is_closed());
        assert_eq!(blocks[0].content, "package main");
    }

    #[test]
    fn test_inline_backticks_are_not_fences() {
        let md = "Use ```inline``` and `code` here.\n";
        assert_eq!(count_fenced_blocks(md), 0);
    }

    #[test]
    fn test_crlf_lines() {
        let md = "```\r\nA\r\n```\r\n";
        let blocks = find_fenced_blocks(md);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "A");
        assert_eq!(blocks[0].token_span, 3..3);
    }

    #[test]
    fn test_context_window() {
        let md = "one\ntwo\nthree\n```\ncode\n```\nfour\nfive\nsix\n";
        let blocks = find_fenced_blocks(md);
        let ctx = context_window(md, &blocks[0], 2);
        assert_eq!(ctx.before, "two\nthree");
        assert_eq!(ctx.after, "four\nfive");
        assert_eq!(ctx.text(), "two\nthree\nfour\nfive");
    }

    #[test]
    fn test_context_window_at_edges() {
        let md = "```\ncode\n```";
        let blocks = find_fenced_blocks(md);
        let ctx = context_window(md, &blocks[0], 3);
        assert!(ctx.is_empty());
        assert_eq!(context_window(md, &blocks[0], 0), ContextWindow::default());
    }

    #[test]
    fn test_rewrite_tokens() {
        let md = "```\nA\n```\n\n```js\nB\n```\n";
        let blocks = find_fenced_blocks(md);
        let out = rewrite_tokens(md, &blocks, &[(0, "python".to_string()), (1, "javascript".to_string())]);
        assert_eq!(out, "```python\nA\n```\n\n```javascript\nB\n```\n");
    }

    #[test]
    fn test_rewrite_ignores_empty_and_unknown_indices() {
        let md = "```\nA\n```\n";
        let blocks = find_fenced_blocks(md);
        let out = rewrite_tokens(md, &blocks, &[(0, String::new()), (5, "go".to_string())]);
        assert_eq!(out, md);
    }

    #[test]
    fn test_rewrite_skips_tokens_that_break_fences() {
        let md = "```
A
```

```
B
```
";
        let blocks = find_fenced_blocks(md);
        let out = rewrite_tokens(md, &blocks, &[(0, "a`b".to_string()), (1, "two words".to_string())]);
        assert_eq!(out, md);
        assert_eq!(find_fenced_blocks(&out).len(), 2);
    }

    #[test]
    fn test_is_fence_token() {
        assert!(is_fence_token("c++"));
        assert!(is_fence_token("objective-c"));
        assert!(!is_fence_token(""));
        assert!(!is_fence_token("a`b"));
        assert!(!is_fence_token("go\tx"));
    }
}
