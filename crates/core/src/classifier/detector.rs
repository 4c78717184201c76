//! External content detectors.
//!
//! A detector looks at the raw block content and names a language in its
//! own vocabulary. The classifier maps that name through [`DETECTOR_NAMES`]
//! and scales the detector weight by content length.
//!
//! The default detector is a [`DetectorChain`]: syntect's first-line match
//! (shebangs, prologues, mode lines) when the `detector` feature is on,
//! then the statistical token model.

#[cfg(feature = "detector")]
use std::sync::LazyLock;

#[cfg(feature = "detector")]
use syntect::parsing::SyntaxSet;

/// Content shorter than this (in characters) halves the detector weight.
pub const SHORT_CONTENT_CHARS: usize = 50;
/// Content longer than this (in characters) boosts the detector weight by half.
pub const LONG_CONTENT_CHARS: usize = 200;

/// Native detector names → canonical identifiers.
pub const DETECTOR_NAMES: &[(&str, &str)] = &[
    ("Bourne Again Shell (bash)", "bash"),
    ("Shell-Unix-Generic", "bash"),
    ("Shell", "bash"),
    ("Python", "python"),
    ("Ruby", "ruby"),
    ("Perl", "perl"),
    ("PHP", "php"),
    ("PHP Source", "php"),
    ("HTML", "html"),
    ("XML", "xml"),
    ("JavaScript", "javascript"),
    ("TypeScript", "typescript"),
    ("Rust", "rust"),
    ("Go", "go"),
    ("Java", "java"),
    ("C++", "cpp"),
    ("C", "c"),
    ("C#", "csharp"),
    ("SQL", "sql"),
    ("YAML", "yaml"),
    ("TOML", "toml"),
    ("JSON", "json"),
    ("CSS", "css"),
    ("Lua", "lua"),
    ("Makefile", "makefile"),
    ("Diff", "diff"),
    ("Dockerfile", "dockerfile"),
    ("Haskell", "haskell"),
    ("Scala", "scala"),
    ("Clojure", "clojure"),
    ("Erlang", "erlang"),
    ("Groovy", "groovy"),
    ("OCaml", "ocaml"),
    ("R", "r"),
    ("Markdown", "markdown"),
    ("Kotlin", "kotlin"),
    ("Swift", "swift"),
    ("Elixir", "elixir"),
];

/// A content-based language detector.
pub trait ContentDetector: Send + Sync {
    /// Name of the detector, used in logs.
    fn name(&self) -> &str;

    /// Detect the language of `content`, returning the detector's native name.
    fn detect(&self, content: &str) -> Option<String>;
}

/// Runs detectors in order; the first answer wins.
#[derive(Default)]
pub struct DetectorChain {
    detectors: Vec<Box<dyn ContentDetector>>,
}

impl DetectorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, detector: impl ContentDetector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Names of the chained detectors, in order.
    pub fn names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }
}

impl ContentDetector for DetectorChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn detect(&self, content: &str) -> Option<String> {
        self.detectors.iter().find_map(|detector| detector.detect(content))
    }
}

/// The bundled detector chain.
pub fn default_detector() -> DetectorChain {
    let chain = DetectorChain::new();
    #[cfg(feature = "detector")]
    let chain = chain.with(SyntectDetector::new());
    chain.with(super::statistical::StatisticalDetector::new())
}

/// Map a native detector name to a canonical identifier.
pub fn map_detector_name(native: &str) -> Option<&'static str> {
    DETECTOR_NAMES
        .iter()
        .find(|(name, _)| *name == native)
        .map(|(_, canonical)| *canonical)
}

/// Scale the detector weight by content length.
pub fn scaled_weight(base: f64, content: &str) -> f64 {
    let chars = content.chars().count();
    if chars < SHORT_CONTENT_CHARS {
        base * 0.5
    } else if chars > LONG_CONTENT_CHARS {
        base * 1.5
    } else {
        base
    }
}

#[cfg(feature = "detector")]
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Detector backed by syntect's bundled syntax definitions.
///
/// Matches the first non-empty line against each syntax's first-line
/// pattern, which recognizes shebangs, XML and PHP prologues, doctypes and
/// editor mode lines.
#[cfg(feature = "detector")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectDetector;

#[cfg(feature = "detector")]
impl SyntectDetector {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "detector")]
impl ContentDetector for SyntectDetector {
    fn name(&self) -> &str {
        "syntect"
    }

    fn detect(&self, content: &str) -> Option<String> {
        let first = content.lines().find(|line| !line.trim().is_empty())?;
        SYNTAX_SET
            .find_syntax_by_first_line(first)
            .map(|syntax| syntax.name.clone())
    }
}
