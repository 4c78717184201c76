//! Library API integration tests
use fencetag_core::*;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

#[test]
fn test_scan_fixture() {
    let html = read_fixture("mixed_code.html");
    let languages = scan(&html);
    assert_eq!(languages, vec!["go".to_string(), "dockerfile".to_string(), String::new()]);
}

#[test]
fn test_convert_fixture() {
    let html = read_fixture("mixed_code.html");
    let article = convert(&html).expect("should convert");

    assert_eq!(article.metadata.title.as_deref(), Some("Shipping a Go service"));
    assert_eq!(article.metadata.author.as_deref(), Some("Jane Doe"));
    assert_eq!(article.strategy, Strategy::Positional);
    assert_eq!(article.languages(), vec!["go", "dockerfile", "bash"]);
    assert_eq!(article.code_blocks[2].source, AttributionSource::Classified);
    assert_eq!(article.untagged_count(), 0);
}

#[test]
fn test_convert_fixture_markdown() {
    let html = read_fixture("mixed_code.html");
    let article = convert(&html).unwrap();
    let md = &article.markdown;

    assert!(md.starts_with("# Shipping a Go service\n\n"));
    assert!(md.contains("- Author: Jane Doe"));
    assert!(md.contains("```go\n"));
    assert!(md.contains("package main"));
    assert!(md.contains("```dockerfile\n"));
    assert!(md.contains("```bash\n"));
    assert!(md.contains("| Setting | Value |\n| --- | --- |\n| replicas | 3 |\n| port | 8080 |"));
    assert!(!md.contains("tracking"));
    assert!(!md.contains("background"));
}

#[test]
fn test_convert_skips_page_chrome() {
    let html = read_fixture("with_chrome.html");
    let article = convert(&html).unwrap();

    assert_eq!(article.metadata.title.as_deref(), Some("Profiling a Rust service"));
    assert_eq!(article.declared_languages, vec!["rust".to_string(), String::new()]);
    assert_eq!(article.strategy, Strategy::Positional);
    assert_eq!(article.languages(), vec!["rust", "bash"]);
    assert!(!article.markdown.contains("docs-theme"));
    assert!(!article.markdown.contains("subscribe"));
    assert!(!article.markdown.contains("theme: minimal"));
    assert!(article.markdown.contains("Profiling starts with a release build"));
}

#[test]
fn test_convert_whole_page_without_extraction() {
    let html = read_fixture("with_chrome.html");
    let config = ConverterConfig::builder().extract_content(false).build();
    let article = Converter::new(config).unwrap().convert(&html, None).unwrap();

    assert_eq!(article.declared_languages.len(), 5);
    assert!(article.markdown.contains("```bash\nnpm install docs-theme"));
}

#[test]
fn test_convert_with_url() {
    let html = read_fixture("mixed_code.html");
    let article = convert_with_url(&html, "https://notes.example.dev/go-service").expect("should convert");

    assert_eq!(article.source_url.as_deref(), Some("https://notes.example.dev/go-service"));
    assert!(
        article
            .markdown
            .contains("- Source: [notes.example.dev](https://notes.example.dev/go-service)")
    );
}

#[test]
fn test_convert_without_code() {
    let html = read_fixture("no_code.html");
    let article = convert(&html).unwrap();

    assert!(article.code_blocks.is_empty());
    assert!(article.declared_languages.is_empty());
    assert!(article.markdown.contains("café culture"));
    assert!(article.markdown.contains("珈琲"));
}

#[test]
fn test_json_output() {
    let html = read_fixture("mixed_code.html");
    let article = convert(&html).unwrap();
    let json = article.to_json().unwrap();

    assert_eq!(json["strategy"], "positional");
    assert_eq!(json["metadata"]["site_name"], "Dev Notes");
    assert_eq!(json["code_blocks"][0]["source"], "positional");
    assert_eq!(json["code_blocks"][2]["language"], "bash");
    assert_eq!(json["declared_languages"][1], "dockerfile");
}

#[test]
fn test_tag_markdown_fixture() {
    let markdown = read_fixture("untagged.md");
    let attribution = Converter::default().tag_markdown(&markdown);

    assert_eq!(attribution.strategy, Strategy::Independent);
    assert_eq!(attribution.tagged_count(), 2);
    assert!(attribution.markdown.contains("```bash\n#!/bin/bash"));
    assert!(attribution.markdown.contains("```go\npackage main"));
    assert!(attribution.markdown.starts_with("# Notes\n\nRun the script in bash:\n"));
}

#[test]
fn test_reattach_is_idempotent() {
    let markdown = read_fixture("untagged.md");
    let languages = ["bash", "go"];
    let once = reattach(&markdown, &languages);
    assert_eq!(reattach(&once, &languages), once);
}

#[test]
fn test_config_fixture() {
    let config = EngineConfig::load(std::path::Path::new(&get_fixture_path("config.json"))).unwrap();
    assert_eq!(config.min_confidence, 0.4);
    assert_eq!(config.context_lines, 2);
    assert_eq!(config.weights.context, 4.0);
    assert_eq!(config.weights.explicit, 10.0);
    assert_eq!(config.normalizer().normalize("tf"), "hcl");
}

#[test]
fn test_converter_from_config_file() {
    let engine = EngineConfig::load(std::path::Path::new(&get_fixture_path("config.json"))).unwrap();
    let config = ConverterConfig::builder().engine(engine).title_heading(false).header(false).build();
    let converter = Converter::new(config).unwrap();

    let article = converter
        .convert(r#"<pre><code class="lang-tf">resource "x" "y" {}</code></pre>"#, None)
        .unwrap();
    assert_eq!(article.declared_languages, vec!["hcl".to_string()]);
    assert!(article.markdown.starts_with("```hcl\n"));
}

#[test]
fn test_backtick_class_does_not_break_fences() {
    let html = r#"<pre><code class="language-a`b">first</code></pre><pre><code class="language-go">second</code></pre>"#;
    let converter = Converter::new(ConverterConfig::builder().title_heading(false).header(false).build()).unwrap();
    let article = converter.convert(html, None).unwrap();

    assert_eq!(scan(html), vec![String::new(), "go".to_string()]);
    assert_eq!(find_fenced_blocks(&article.markdown).len(), 2);
    assert!(!article.markdown.contains("a`b"));
    assert!(article.markdown.contains("```go\nsecond\n```"));
}

#[test]
fn test_classifier_explicit_priority() {
    let classifier = LanguageClassifier::new(WeightConfig::default());
    let block = CodeBlock::explicit("package main\nfunc main() {}", "python");
    let score = classifier.classify(&block);
    assert_eq!(score.language, "python");
    assert_eq!(score.confidence, 1.0);
}

#[test]
fn test_rewrite_table_api() {
    let html = "<table><tr><td>a|b</td><td>c</td></tr><tr><td>1</td><td>2</td></tr></table>";
    let table = formatters::rewrite_table_html(html).unwrap();
    assert_eq!(table, "| a\\|b | c |\n| --- | --- |\n| 1 | 2 |\n\n");
}
