use serde::Serialize;

use crate::Document;

/// Article metadata shown in the document header and frontmatter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub site_name: Option<String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.date.is_none() && self.site_name.is_none()
    }
}

impl Document {
    /// Extract title with priority fallback:
    /// 1. Open Graph `og:title`
    /// 2. Twitter `twitter:title`
    /// 3. `<title>` element
    /// 4. First `<h1>` element
    /// 5. `.post-title`, `.article-title`, `.entry-title`
    pub fn extract_title(&self) -> Option<String> {
        if let Some(title) = self.meta_content("og:title") {
            return Some(title);
        }

        if let Some(title) = self.meta_content("twitter:title") {
            return Some(title);
        }

        if let Some(title) = self.title().and_then(non_empty) {
            return Some(title);
        }

        self.first_text(&["h1", ".post-title", ".article-title", ".entry-title"])
    }

    /// Extract author with priority fallback:
    /// 1. Meta `author` / `article:author`
    /// 2. `[rel="author"]` link text
    /// 3. Byline classes
    pub fn extract_author(&self) -> Option<String> {
        if let Some(author) = self.meta_content("author") {
            return Some(author);
        }

        if let Some(author) = self.meta_content("article:author") {
            return Some(author);
        }

        self.first_text(&[
            "[rel=\"author\"]",
            ".author",
            ".post-author",
            ".article-author",
            ".byline",
            ".author-name",
        ])
    }

    /// Extract date with priority fallback:
    /// 1. Meta `article:published_time` / `og:published_time`
    /// 2. `<time>` element, `datetime` attribute first
    /// 3. Date classes
    pub fn extract_date(&self) -> Option<String> {
        if let Some(date) = self.meta_content("article:published_time") {
            return Some(date);
        }

        if let Some(date) = self.meta_content("og:published_time") {
            return Some(date);
        }

        if let Some(time) = self.select_first("time") {
            if let Some(datetime) = time.attr("datetime").and_then(|d| non_empty(d.to_string())) {
                return Some(datetime);
            }
            if let Some(text) = non_empty(time.text()) {
                return Some(text);
            }
        }

        self.first_text(&[".date", ".post-date", ".article-date", ".published", ".timestamp"])
    }

    /// Extract site name from Open Graph `og:site_name`
    pub fn extract_site_name(&self) -> Option<String> {
        self.meta_content("og:site_name")
    }

    /// Extract all metadata at once
    pub fn extract_metadata(&self) -> Metadata {
        Metadata {
            title: self.extract_title(),
            author: self.extract_author(),
            date: self.extract_date(),
            site_name: self.extract_site_name(),
        }
    }

    /// Text of the first element matching any selector, in selector order.
    fn first_text(&self, selectors: &[&str]) -> Option<String> {
        selectors
            .iter()
            .filter_map(|selector| self.select_first(selector))
            .find_map(|el| non_empty(el.text()))
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
