//! Signal tables for the classifier.
//!
//! Each table is plain data iterated uniformly: code-content heuristics
//! probe the block body, context signals probe the prose around it. Table
//! order is evaluation order, which in turn decides ties.

use std::sync::LazyLock;

use regex::Regex;

use super::WeightConfig;

/// A single test against code content.
#[derive(Debug, Clone, Copy)]
pub enum Probe {
    /// Content contains the needle.
    Contains(&'static str),
    /// Content contains the needle but not the second string.
    ContainsUnless(&'static str, &'static str),
    /// Content matches the regular expression.
    Pattern(&'static str),
    /// Every nested probe matches.
    All(&'static [Probe]),
}

/// Ordered code-content heuristics: a language fires when any probe matches.
pub const HEURISTIC_TABLE: &[(&str, &[Probe])] = &[
    (
        "go",
        &[
            Probe::Contains("package main"),
            Probe::ContainsUnless("func ", "def "),
            Probe::Contains("fmt."),
            Probe::Contains(":="),
        ],
    ),
    (
        "rust",
        &[
            Probe::Contains("fn main()"),
            Probe::Contains("let mut "),
            Probe::Contains("println!"),
            Probe::Contains("impl "),
            Probe::Pattern(r"\bfn \w+\s*[<(]"),
            Probe::Pattern(r"(?m)^use \w+(::\w+)+"),
        ],
    ),
    (
        "python",
        &[
            Probe::Contains("def "),
            Probe::Contains("if __name__"),
            Probe::Contains("self."),
            Probe::Pattern(r"(?m)^from [\w.]+ import "),
            Probe::Pattern(r"(?m)^import \w+(\.\w+)*\s*$"),
            Probe::ContainsUnless("print(", ";"),
        ],
    ),
    (
        "javascript",
        &[
            Probe::Contains("console.log("),
            Probe::Pattern(r"\bfunction\s*\w*\s*\("),
            Probe::Contains("=> {"),
            Probe::Pattern(r"\bconst\s+\w+\s*="),
            Probe::Pattern(r"\bvar\s+\w+\s*="),
            Probe::Contains("==="),
            Probe::Contains("require("),
        ],
    ),
    (
        "typescript",
        &[
            Probe::Pattern(r":\s*(string|number|boolean)\b"),
            Probe::Pattern(r"(?m)^\s*(export\s+)?interface\s+\w+"),
            Probe::Pattern(r"(?m)^\s*(export\s+)?type\s+\w+\s*="),
        ],
    ),
    (
        "cpp",
        &[
            Probe::Pattern(r"#include\s*<iostream>"),
            Probe::Pattern(r"\bstd::(cout|cin|cerr|endl|vector|unique_ptr|shared_ptr|make_unique|move)\b"),
            Probe::Contains("using namespace"),
            Probe::Contains("cout <<"),
            Probe::Pattern(r"\btemplate\s*<"),
        ],
    ),
    (
        "c",
        &[
            Probe::Pattern(r"#include\s*<stdio\.h>"),
            Probe::Pattern(r"\bprintf\s*\("),
            Probe::Pattern(r"\bmalloc\s*\("),
            Probe::Pattern(r"\bint\s+main\s*\("),
        ],
    ),
    (
        "java",
        &[
            Probe::Contains("public class "),
            Probe::Contains("System.out.println"),
            Probe::Contains("public static void main"),
            Probe::Contains("@Override"),
            Probe::Pattern(r"(?m)^import java\."),
        ],
    ),
    ("csharp", &[Probe::Contains("using System;"), Probe::Contains("Console.WriteLine")]),
    ("php", &[Probe::Contains("<?php"), Probe::Pattern(r"\$\w+->\w+")]),
    (
        "ruby",
        &[
            Probe::Pattern(r"(?m)^\s*def \w+[?!]?\s*$"),
            Probe::Pattern(r"(?m)^\s*end\s*$"),
            Probe::Contains("puts "),
            Probe::Contains("require '"),
        ],
    ),
    (
        "bash",
        &[
            Probe::Pattern(r"\A#!\s*/(usr/)?bin/(env\s+)?(ba|z)?sh\b"),
            Probe::Pattern(r"(?m)^\s*\$ \w"),
            Probe::Pattern(r"(?m)^\s*(sudo|apt|apt-get|brew|curl|wget|cd|mkdir|chmod|git|docker|npm|pip|cargo)\s"),
        ],
    ),
    (
        "dockerfile",
        &[Probe::All(&[
            Probe::Pattern(r"(?m)^FROM\s+\S+"),
            Probe::Pattern(r"(?m)^(RUN|CMD|COPY|WORKDIR|ENTRYPOINT|ENV|EXPOSE)\s"),
        ])],
    ),
    (
        "sql",
        &[
            Probe::Pattern(r"\bSELECT\s+[\w*]"),
            Probe::Contains("INSERT INTO"),
            Probe::Contains("CREATE TABLE"),
            Probe::Contains("DELETE FROM"),
            Probe::Pattern(r"\bWHERE\s+\w"),
        ],
    ),
    (
        "html",
        &[
            Probe::Pattern(r"(?i)<!DOCTYPE\s+html"),
            Probe::Pattern(r"</(html|head|body|div|span|p|a|ul|li|table|form|script)>"),
        ],
    ),
    (
        "css",
        &[Probe::All(&[
            Probe::Pattern(r"(?m)^[.#]?[\w-]+(\s*[\w.#:-]+)*\s*\{\s*$"),
            Probe::Pattern(
                r"(?m)^\s*(color|background(-color)?|margin|padding|display|font-(size|family|weight)|border|width|height)\s*:\s*[^;]+;",
            ),
        ])],
    ),
    ("yaml", &[Probe::Pattern(r"(?m)^[\w-]+:\s*\n\s+[\w-]+:"), Probe::Pattern(r"(?m)^---\s*\n[\w-]+:\s")]),
    ("toml", &[Probe::Pattern(r"(?m)^\[[\w.-]+\]\s*$")]),
    ("json", &[Probe::Pattern(r#"\A\s*\{\s*"[^"]+"\s*:"#)]),
    ("diff", &[Probe::Pattern(r"(?m)^@@ -\d+"), Probe::Pattern(r"(?m)^diff --git ")]),
];

/// Category of a context signal; decides which weight it adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// The prose names the language ("in Rust", "golang").
    Mention,
    /// The prose names a framework or library of the language.
    Framework,
    /// A file name with a language extension.
    FileName,
    /// A manifest or project file name.
    Manifest,
    /// A toolchain command invocation.
    Command,
}

impl ContextKind {
    /// Weight this kind of signal contributes under `weights`.
    pub fn weight(self, weights: &WeightConfig) -> f64 {
        match self {
            ContextKind::Mention => weights.context,
            ContextKind::Framework => weights.context * 0.5,
            ContextKind::FileName => weights.file_extension,
            ContextKind::Manifest => weights.file_extension * 0.8,
            ContextKind::Command => weights.command,
        }
    }
}

/// Ordered context signals, grouped by kind in evaluation order.
pub const CONTEXT_TABLE: &[(ContextKind, &str, &str)] = &[
    (ContextKind::Mention, "go", r"(?i)\b(in\s+go|using\s+go|go\s+example|golang)\b"),
    (ContextKind::Mention, "python", r"(?i)\b(in\s+python|using\s+python|python\s+example)\b"),
    (
        ContextKind::Mention,
        "javascript",
        r"(?i)\b(in\s+js|using\s+js|javascript\s+example|node\.js|javascript)\b",
    ),
    (ContextKind::Mention, "typescript", r"(?i)\b(in\s+ts|using\s+ts|typescript\s+example)\b"),
    (ContextKind::Mention, "rust", r"(?i)\b(in\s+rust|using\s+rust|rust\s+example)\b"),
    (ContextKind::Mention, "java", r"(?i)\b(in\s+java|using\s+java|java\s+example)\b"),
    (ContextKind::Mention, "cpp", r"(?i)(\bin\s+c\+\+|\busing\s+c\+\+|\bcpp\s+example\b)"),
    (ContextKind::Mention, "c", r"(?i)\b(in\s+c|using\s+c|c\s+example)\b"),
    (ContextKind::Mention, "bash", r"(?i)\b(in\s+bash|using\s+bash|shell\s+script)\b"),
    (ContextKind::Mention, "sql", r"(?i)\b(in\s+sql|using\s+sql|database\s+query)\b"),
    (ContextKind::Framework, "python", r"(?i)\b(django|flask|fastapi|pandas|numpy|requests)\b"),
    (ContextKind::Framework, "java", r"(?i)\b(spring|maven|gradle|junit|hibernate)\b"),
    (ContextKind::Framework, "go", r"(?i)\b(gin|fiber|echo|gorilla|cobra|viper)\b"),
    (ContextKind::Framework, "javascript", r"(?i)\b(express|nest|react|vue|angular|webpack)\b"),
    (ContextKind::Framework, "typescript", r"(?i)\b(express|nest|react|vue|angular|webpack)\b"),
    (ContextKind::Framework, "rust", r"(?i)\b(actix|rocket|tokio|serde|clap)\b"),
    (ContextKind::FileName, "go", r"\b\w+\.go\b"),
    (ContextKind::FileName, "python", r"\b\w+\.py\b"),
    (ContextKind::FileName, "javascript", r"\b\w+\.js\b"),
    (ContextKind::FileName, "typescript", r"\b\w+\.ts\b"),
    (ContextKind::FileName, "rust", r"\b\w+\.rs\b"),
    (ContextKind::FileName, "java", r"\b\w+\.java\b"),
    (ContextKind::FileName, "cpp", r"\b\w+\.(cpp|cc|cxx|hpp)\b"),
    (ContextKind::FileName, "c", r"\b\w+\.(c|h)\b"),
    (ContextKind::FileName, "bash", r"\b\w+\.(sh|bash)\b"),
    (ContextKind::FileName, "sql", r"\b\w+\.sql\b"),
    (ContextKind::Manifest, "go", r"\bgo\.(mod|sum)\b"),
    (ContextKind::Manifest, "python", r"\b(requirements\.txt|setup\.py|pyproject\.toml)\b"),
    (ContextKind::Manifest, "javascript", r"\b(package\.json|package-lock\.json|yarn\.lock)\b"),
    (
        ContextKind::Manifest,
        "typescript",
        r"\b(package\.json|package-lock\.json|yarn\.lock|tsconfig\.json)\b",
    ),
    (ContextKind::Manifest, "rust", r"\bCargo\.(toml|lock)\b"),
    (ContextKind::Manifest, "java", r"\b(pom\.xml|build\.gradle)\b"),
    (ContextKind::Command, "go", r"\bgo\s+(build|run|mod|get|install|test)\b"),
    (ContextKind::Command, "python", r"\b(python3?\s+(-m\s+\w+|\w+\.py)|pip3?\s+install)\b"),
    (
        ContextKind::Command,
        "javascript",
        r"\b(node\s+\w+\.js|npm\s+(i|install|run)|yarn\s+(add|install))\b",
    ),
    (
        ContextKind::Command,
        "typescript",
        r"\b(node\s+\w+\.js|npm\s+(i|install|run)|yarn\s+(add|install)|tsc)\b",
    ),
    (ContextKind::Command, "rust", r"\b(cargo\s+(run|build|test|check|add|new)|rustc)\b"),
    (
        ContextKind::Command,
        "java",
        r"\b(javac|java\s+-jar|mvn\s+(compile|package|install)|gradle\s+(build|run))\b",
    ),
    (ContextKind::Command, "cpp", r"(\bg\+\+|\bclang\+\+|\bcmake\b)"),
    (ContextKind::Command, "c", r"\b(gcc|clang|make)\b"),
    (ContextKind::Command, "bash", r"(\b(bash|sh)\b|\./\w+\.sh\b)"),
];

#[derive(Debug)]
enum Matcher {
    Contains(&'static str),
    ContainsUnless(&'static str, &'static str),
    Pattern(Regex),
    All(Vec<Matcher>),
}

impl Matcher {
    fn compile(probe: &Probe) -> Self {
        match *probe {
            Probe::Contains(needle) => Matcher::Contains(needle),
            Probe::ContainsUnless(needle, unless) => Matcher::ContainsUnless(needle, unless),
            Probe::Pattern(pattern) => Matcher::Pattern(compile_pattern(pattern)),
            Probe::All(probes) => Matcher::All(probes.iter().map(Matcher::compile).collect()),
        }
    }

    fn matches(&self, content: &str) -> bool {
        match self {
            Matcher::Contains(needle) => content.contains(needle),
            Matcher::ContainsUnless(needle, unless) => content.contains(needle) && !content.contains(unless),
            Matcher::Pattern(regex) => regex.is_match(content),
            Matcher::All(matchers) => matchers.iter().all(|m| m.matches(content)),
        }
    }
}

fn compile_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid signal pattern {pattern:?}: {e}"))
}

/// A compiled heuristic rule.
#[derive(Debug)]
pub struct Heuristic {
    pub language: &'static str,
    matchers: Vec<Matcher>,
}

impl Heuristic {
    /// Whether any probe of this rule matches.
    pub fn matches(&self, content: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(content))
    }
}

/// A compiled context signal.
#[derive(Debug)]
pub struct ContextSignal {
    pub kind: ContextKind,
    pub language: &'static str,
    regex: Regex,
}

impl ContextSignal {
    pub fn matches(&self, context: &str) -> bool {
        self.regex.is_match(context)
    }
}

static HEURISTICS: LazyLock<Vec<Heuristic>> = LazyLock::new(|| {
    HEURISTIC_TABLE
        .iter()
        .map(|(language, probes)| Heuristic { language: *language, matchers: probes.iter().map(Matcher::compile).collect() })
        .collect()
});

static CONTEXT_SIGNALS: LazyLock<Vec<ContextSignal>> = LazyLock::new(|| {
    CONTEXT_TABLE
        .iter()
        .map(|(kind, language, pattern)| ContextSignal { kind: *kind, language: *language, regex: compile_pattern(pattern) })
        .collect()
});

/// Compiled heuristics in table order.
pub fn heuristics() -> &'static [Heuristic] {
    &HEURISTICS
}

/// Compiled context signals in table order.
pub fn context_signals() -> &'static [ContextSignal] {
    &CONTEXT_SIGNALS
}

/// Languages whose heuristics match `content`, in table order.
pub fn heuristic_matches(content: &str) -> Vec<&'static str> {
    heuristics().iter().filter(|h| h.matches(content)).map(|h| h.language).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(heuristics().len(), HEURISTIC_TABLE.len());
        assert_eq!(context_signals().len(), CONTEXT_TABLE.len());
    }

    #[test]
    fn test_context_table_grouped_by_kind() {
        let order = [
            ContextKind::Mention,
            ContextKind::Framework,
            ContextKind::FileName,
            ContextKind::Manifest,
            ContextKind::Command,
        ];
        let ranks: Vec<usize> = CONTEXT_TABLE
            .iter()
            .map(|(kind, _, _)| order.iter().position(|k| k == kind).unwrap())
            .collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[rstest]
    #[case("package main\nfunc main(){}", vec!["go"])]
    #[case("package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}", vec!["go"])]
    #[case(
        "use std::collections::HashMap;\n\nfn main() {\n    let mut map = HashMap::new();\n    map.insert(\"a\", 1);\n    println!(\"{:?}\", map);\n}",
        vec!["rust"]
    )]
    #[case(
        "def greet(name):\n    print(f\"Hello, {name}\")\n\nif __name__ == \"__main__\":\n    greet(\"world\")",
        vec!["python"]
    )]
    #[case("SELECT id, name FROM users WHERE active = 1;", vec!["sql"])]
    #[case("#!/bin/bash\nset -e\nmkdir -p build", vec!["bash"])]
    #[case("{\n  \"name\": \"fencetag\",\n  \"version\": 1\n}", vec!["json"])]
    #[case("[package]\nname = \"fencetag\"", vec!["toml"])]
    #[case("FROM rust:1.80\nWORKDIR /app\nRUN cargo build", vec!["dockerfile"])]
    #[case("diff --git a/x b/x\n@@ -1,2 +1,2 @@", vec!["diff"])]
    #[case("Hello there, nothing to see.", vec![])]
    fn test_heuristic_matches(#[case] content: &str, #[case] expected: Vec<&str>) {
        assert_eq!(heuristic_matches(content), expected);
    }

    #[test]
    fn test_contains_unless() {
        assert!(heuristic_matches("func handler() {}").contains(&"go"));
        assert!(!heuristic_matches("def func (x): pass").contains(&"go"));
        assert!(heuristic_matches("print(x)").contains(&"python"));
        assert!(!heuristic_matches("print(x);").contains(&"python"));
    }

    #[test]
    fn test_dockerfile_needs_both_instructions() {
        assert!(!heuristic_matches("FROM alpine").contains(&"dockerfile"));
    }

    #[test]
    fn test_context_kind_weights() {
        let weights = WeightConfig::default();
        assert_eq!(ContextKind::Mention.weight(&weights), 3.0);
        assert_eq!(ContextKind::Framework.weight(&weights), 1.5);
        assert_eq!(ContextKind::FileName.weight(&weights), 3.0);
        assert!((ContextKind::Manifest.weight(&weights) - 2.4).abs() < 1e-9);
        assert_eq!(ContextKind::Command.weight(&weights), 2.0);
    }

    #[rstest]
    #[case("Run it with cargo run --release", "rust")]
    #[case("Then go build ./... to compile", "go")]
    #[case("Compile with g++ -O2 main.cc", "cpp")]
    #[case("Install with pip install requests", "python")]
    fn test_command_signals(#[case] context: &str, #[case] language: &str) {
        assert!(
            context_signals()
                .iter()
                .any(|s| s.kind == ContextKind::Command && s.language == language && s.matches(context))
        );
    }

    #[test]
    fn test_go_command_needs_subcommand() {
        assert!(
            !context_signals()
                .iter()
                .any(|s| s.kind == ContextKind::Command && s.language == "go" && s.matches("let's go now"))
        );
    }
}
