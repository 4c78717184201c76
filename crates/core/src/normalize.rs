//! Language name normalization.
//!
//! Code found in the wild labels its language in many inconsistent ways:
//! `js`, `JavaScript`, `ecmascript`, `c++`, `yml`. The [`LanguageNormalizer`]
//! maps all of them onto one canonical identifier per language.
//!
//! Unknown names follow the permissive policy: a plausible token (non-empty,
//! at most [`MAX_UNKNOWN_LEN`] characters drawn from `[a-z0-9_+#.-]`) is
//! returned lower-cased as-is; anything else is unrecognized and yields `""`.
//!
//! # Example
//!
//! ```rust
//! use fencetag_core::normalize::normalize;
//!
//! assert_eq!(normalize("JS"), "javascript");
//! assert_eq!(normalize(" c++ "), "cpp");
//! assert_eq!(normalize("zig"), "zig");
//! assert_eq!(normalize("not a language"), "");
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

/// Longest unknown token still treated as a plausible language name.
pub const MAX_UNKNOWN_LEN: usize = 20;

/// Compiled-in alias table: lower-cased alias → canonical identifier.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("javascript", "javascript"),
    ("ecmascript", "javascript"),
    ("jsx", "javascript"),
    ("node", "javascript"),
    ("mjs", "javascript"),
    ("python", "python"),
    ("py", "python"),
    ("python3", "python"),
    ("py3", "python"),
    ("java", "java"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("c++", "cpp"),
    ("cplusplus", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("c#", "csharp"),
    ("csharp", "csharp"),
    ("cs", "csharp"),
    ("go", "go"),
    ("golang", "go"),
    ("rust", "rust"),
    ("rs", "rust"),
    ("erlang", "erlang"),
    ("erl", "erlang"),
    ("php", "php"),
    ("haskell", "haskell"),
    ("hs", "haskell"),
    ("scala", "scala"),
    ("clojure", "clojure"),
    ("clj", "clojure"),
    ("elixir", "elixir"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("f#", "fsharp"),
    ("fsharp", "fsharp"),
    ("ocaml", "ocaml"),
    ("ml", "ocaml"),
    ("r", "r"),
    ("julia", "julia"),
    ("jl", "julia"),
    ("lua", "lua"),
    ("perl", "perl"),
    ("pl", "perl"),
    ("groovy", "groovy"),
    ("dart", "dart"),
    ("nim", "nim"),
    ("crystal", "crystal"),
    ("cr", "crystal"),
    ("ruby", "ruby"),
    ("rb", "ruby"),
    ("swift", "swift"),
    ("kotlin", "kotlin"),
    ("kt", "kotlin"),
    ("typescript", "typescript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("html", "html"),
    ("htm", "html"),
    ("xhtml", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("sass", "scss"),
    ("sql", "sql"),
    ("mysql", "sql"),
    ("postgresql", "sql"),
    ("psql", "sql"),
    ("bash", "bash"),
    ("shell", "bash"),
    ("sh", "bash"),
    ("zsh", "bash"),
    ("console", "bash"),
    ("shell-session", "bash"),
    ("powershell", "powershell"),
    ("ps1", "powershell"),
    ("json", "json"),
    ("jsonc", "json"),
    ("xml", "xml"),
    ("svg", "xml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("ini", "ini"),
    ("markdown", "markdown"),
    ("md", "markdown"),
    ("dockerfile", "dockerfile"),
    ("docker", "dockerfile"),
    ("makefile", "makefile"),
    ("make", "makefile"),
    ("git", "git"),
    ("diff", "diff"),
    ("patch", "diff"),
    ("graphql", "graphql"),
    ("gql", "graphql"),
    ("protobuf", "protobuf"),
    ("proto", "protobuf"),
];

static DEFAULT_NORMALIZER: LazyLock<LanguageNormalizer> = LazyLock::new(LanguageNormalizer::new);

/// Alias table mapping declared language names to canonical identifiers.
///
/// The table is immutable once built. Every canonical identifier is also an
/// alias of itself, including targets introduced through overrides.
#[derive(Debug, Clone)]
pub struct LanguageNormalizer {
    aliases: HashMap<String, String>,
}

impl LanguageNormalizer {
    /// Build a normalizer from the compiled-in alias table.
    pub fn new() -> Self {
        Self::with_overrides(std::iter::empty::<(String, String)>())
    }

    /// Build a normalizer from the defaults plus extra aliases.
    ///
    /// Overrides win over defaults. Keys and targets are trimmed and
    /// lower-cased; entries with an empty key or target are ignored. An
    /// override keyed on a canonical identifier renames that language, so
    /// every alias pointing at it follows to the new target.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut aliases = HashMap::with_capacity(DEFAULT_ALIASES.len());

        for (alias, canonical) in DEFAULT_ALIASES {
            aliases.insert((*alias).to_string(), (*canonical).to_string());
        }

        for (alias, canonical) in overrides {
            let alias = alias.as_ref().trim().to_lowercase();
            let canonical = canonical.as_ref().trim().to_lowercase();
            if alias.is_empty() || canonical.is_empty() {
                continue;
            }
            for target in aliases.values_mut().filter(|target| **target == alias) {
                target.clone_from(&canonical);
            }
            aliases.insert(alias, canonical);
        }

        let targets: Vec<String> = aliases.values().cloned().collect();
        for canonical in targets {
            aliases.entry(canonical.clone()).or_insert(canonical);
        }

        Self { aliases }
    }

    /// Strict lookup: the canonical identifier for a known alias.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        let key = raw.trim().to_lowercase();
        self.aliases.get(&key).map(String::as_str)
    }

    /// Normalize a declared language name.
    ///
    /// Returns the canonical identifier on an alias hit, the lower-cased
    /// token for a plausible unknown name, and `""` otherwise.
    pub fn normalize(&self, raw: &str) -> String {
        let name = raw.trim().to_lowercase();

        if let Some(canonical) = self.aliases.get(&name) {
            return canonical.clone();
        }

        if is_plausible_name(&name) { name } else { String::new() }
    }

    /// Whether `id` is one of the canonical identifiers of this table.
    pub fn is_canonical(&self, id: &str) -> bool {
        self.aliases.values().any(|canonical| canonical == id)
    }

    /// All canonical identifiers, sorted and deduplicated.
    pub fn canonical_languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.aliases.values().map(String::as_str).collect();
        languages.sort_unstable();
        languages.dedup();
        languages
    }

    /// Number of aliases in the table.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for LanguageNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// The shared normalizer built from the compiled-in table.
pub fn default_normalizer() -> &'static LanguageNormalizer {
    &DEFAULT_NORMALIZER
}

/// Normalize with the compiled-in alias table.
pub fn normalize(raw: &str) -> String {
    DEFAULT_NORMALIZER.normalize(raw)
}

fn is_plausible_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_UNKNOWN_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'_' | b'+' | b'#' | b'.' | b'-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("js", "javascript")]
    #[case("JavaScript", "javascript")]
    #[case("  PY ", "python")]
    #[case("c++", "cpp")]
    #[case("C#", "csharp")]
    #[case("yml", "yaml")]
    #[case("golang", "go")]
    #[case("shell", "bash")]
    #[case("patch", "diff")]
    fn test_alias_resolution(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize(raw), expected);
    }

    #[test]
    fn test_canonical_round_trip() {
        let normalizer = LanguageNormalizer::new();
        for canonical in normalizer.canonical_languages() {
            assert_eq!(normalizer.normalize(canonical), canonical);
        }
    }

    #[test]
    fn test_permissive_unknown_names() {
        assert_eq!(normalize("zig"), "zig");
        assert_eq!(normalize("  VHDL "), "vhdl");
        assert_eq!(normalize("wp-block-code"), "wp-block-code");
    }

    #[test]
    fn test_unrecognized_names() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("two words"), "");
        assert_eq!(normalize("averyveryverylongclassname"), "");
    }

    #[rstest]
    #[case("a`b")]
    #[case("```")]
    #[case("go\tx")]
    #[case("x{y}")]
    #[case("<script>")]
    #[case("a\"b")]
    fn test_markup_tokens_are_unrecognized(#[case] raw: &str) {
        assert_eq!(normalize(raw), "");
    }

    #[test]
    fn test_symbol_tokens_stay_plausible() {
        assert_eq!(normalize("objective-c"), "objective-c");
        assert_eq!(normalize("vb.net"), "vb.net");
        assert_eq!(normalize("q#"), "q#");
        assert_eq!(normalize("emacs_lisp"), "emacs_lisp");
    }

    #[test]
    fn test_length_boundary() {
        let twenty = "a".repeat(MAX_UNKNOWN_LEN);
        let twenty_one = "a".repeat(MAX_UNKNOWN_LEN + 1);
        assert_eq!(normalize(&twenty), twenty);
        assert_eq!(normalize(&twenty_one), "");
    }

    #[test]
    fn test_strict_lookup() {
        let normalizer = LanguageNormalizer::new();
        assert_eq!(normalizer.lookup("TS"), Some("typescript"));
        assert_eq!(normalizer.lookup("zig"), None);
        assert_eq!(normalizer.lookup("highlight"), None);
    }

    #[test]
    fn test_overrides() {
        let normalizer = LanguageNormalizer::with_overrides([("ZIG", "Zig"), ("js", "ecma"), ("", "x")]);
        assert_eq!(normalizer.normalize("zig"), "zig");
        assert_eq!(normalizer.normalize("js"), "ecma");
        assert_eq!(normalizer.lookup("ecma"), Some("ecma"));
        assert!(normalizer.is_canonical("ecma"));
        assert!(normalizer.lookup("").is_none());
    }

    #[test]
    fn test_override_renames_canonical_language() {
        let normalizer = LanguageNormalizer::with_overrides([("javascript", "ecma")]);
        for alias in ["javascript", "js", "ecmascript", "jsx", "node", "mjs"] {
            assert_eq!(normalizer.normalize(alias), "ecma", "{alias}");
        }
        assert!(normalizer.is_canonical("ecma"));
        assert!(!normalizer.is_canonical("javascript"));
        assert!(!normalizer.canonical_languages().contains(&"javascript"));
        assert_eq!(normalizer.normalize("ts"), "typescript");
    }

    #[test]
    fn test_canonical_languages_sorted_and_unique() {
        let normalizer = LanguageNormalizer::new();
        let languages = normalizer.canonical_languages();
        let mut sorted = languages.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(languages, sorted);
        assert!(languages.contains(&"rust"));
        assert!(!languages.contains(&"js"));
    }
}
