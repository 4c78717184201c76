pub mod markdown;
pub mod table;

pub use markdown::{
    MarkdownConfig, MarkdownFormatter, assemble_document, html_to_markdown, html_to_text, normalize_blank_lines,
};
pub use table::{rewrite_table, rewrite_table_html};
