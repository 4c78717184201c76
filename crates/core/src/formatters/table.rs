//! HTML table → Markdown pipe table.
//!
//! The header comes from the `thead` row group, or from the first row when
//! there is none. Data rows are every other row of the table. Cell text is
//! trimmed, pipes are escaped and line breaks become spaces so that every row
//! stays on one line.

use scraper::{ElementRef, Selector};

use crate::parse::Document;

/// Rewrite a `table` element as a pipe table.
///
/// Returns `None` when the table has neither a header nor data rows.
///
/// # Example
///
/// ```rust
/// use fencetag_core::formatters::table::rewrite_table_html;
///
/// let html = "<table><tr><th>Name</th><th>Age</th></tr><tr><td>John</td><td>25</td></tr></table>";
/// assert_eq!(
///     rewrite_table_html(html).unwrap(),
///     "| Name | Age |\n| --- | --- |\n| John | 25 |\n\n"
/// );
/// ```
pub fn rewrite_table(table: ElementRef<'_>) -> Option<String> {
    let rows = own_rows(table);

    let header = rows
        .iter()
        .find(|row| has_ancestor(**row, "thead", table))
        .or_else(|| rows.first())
        .copied();

    let header_cells = header.map(row_cells).unwrap_or_default();
    let header_id = header.map(|row| row.id());

    let data: Vec<Vec<String>> = rows
        .iter()
        .filter(|row| Some(row.id()) != header_id && !has_ancestor(**row, "thead", table))
        .map(|row| row_cells(*row))
        .filter(|cells| !cells.is_empty())
        .collect();

    if header_cells.is_empty() && data.is_empty() {
        return None;
    }

    let mut output = String::new();
    if !header_cells.is_empty() {
        output.push_str(&format_row(&header_cells));
        let delimiter = vec!["---".to_string(); header_cells.len()];
        output.push_str(&format_row(&delimiter));
    }
    for cells in &data {
        output.push_str(&format_row(cells));
    }
    output.push('\n');

    Some(output)
}

/// Parse `html` and rewrite its first table.
pub fn rewrite_table_html(html: &str) -> Option<String> {
    let doc = Document::parse_fragment(html);
    let table = doc.select_first("table")?;
    rewrite_table(table.element_ref())
}

/// Rows belonging to `table` itself, skipping rows of nested tables.
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let Ok(selector) = Selector::parse("tr") else { return Vec::new() };
    table
        .select(&selector)
        .filter(|row| nearest_table(*row).is_some_and(|t| t.id() == table.id()))
        .collect()
}

fn nearest_table(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

fn has_ancestor(element: ElementRef<'_>, tag: &str, stop: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .take_while(|node| node.id() != stop.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == tag)
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "th" | "td"))
        .map(|cell| clean_cell(&cell.text().collect::<String>()))
        .collect()
}

fn clean_cell(text: &str) -> String {
    text.trim().replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn format_row(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

/// `htmd` element handler for `table`.
#[cfg(feature = "markdown")]
pub fn table_handler(
    _handlers: &dyn htmd::element_handler::Handlers, element: htmd::Element,
) -> Option<htmd::element_handler::HandlerResult> {
    let content = serialize_node(element.node)
        .and_then(|html| rewrite_table_html(&html))
        .map(|table| format!("\n\n{}\n\n", table.trim_end()))
        .unwrap_or_default();

    Some(htmd::element_handler::HandlerResult { content, markdown_translated: true })
}

#[cfg(feature = "markdown")]
fn serialize_node(node: &markup5ever_rcdom::Handle) -> Option<String> {
    use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
    use markup5ever_rcdom::SerializableHandle;

    let opts = SerializeOpts { traversal_scope: TraversalScope::IncludeNode, ..Default::default() };
    let mut bytes = Vec::new();
    let handle = SerializableHandle::from(node.clone());
    serialize(&mut bytes, &handle, opts).ok()?;
    String::from_utf8(bytes).ok()
}
