//! Engine configuration.
//!
//! [`EngineConfig`] gathers everything a caller may tune: signal weights,
//! the context window, the tagging threshold, extra language aliases and the
//! HTML annotation toggle. It deserializes from JSON; missing fields keep
//! their defaults.
//!
//! # Example
//!
//! ```rust
//! use fencetag_core::EngineConfig;
//!
//! let config: EngineConfig = serde_json::from_str(r#"{
//!     "min_confidence": 0.5,
//!     "weights": { "context": 4.0 },
//!     "aliases": { "tf": "hcl" }
//! }"#).unwrap();
//! config.validate().unwrap();
//! assert_eq!(config.weights.context, 4.0);
//! assert_eq!(config.context_lines, 3);
//! assert_eq!(config.normalizer().normalize("tf"), "hcl");
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{LanguageClassifier, WeightConfig};
use crate::normalize::LanguageNormalizer;
use crate::reattach::AttributionOptions;
use crate::{FencetagError, Result};

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "fencetag";
/// File name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Tunable settings of the attribution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Signal weights (default: explicit 10, file extension 3, command 2,
    /// heuristic 2, detector 2, context 3).
    pub weights: WeightConfig,

    /// Lines of prose collected on each side of a block (default: 3).
    pub context_lines: usize,

    /// Classified languages are written only above this confidence
    /// (default: 0.3).
    pub min_confidence: f64,

    /// Extra aliases, alias → canonical identifier.
    pub aliases: BTreeMap<String, String>,

    /// Whether to annotate code classes in the HTML before conversion
    /// (default: true).
    pub annotate: bool,

    /// Whether to narrow the page to its main content container before
    /// scanning and conversion (default: true).
    pub extract_content: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: WeightConfig::default(),
            context_lines: 3,
            min_confidence: 0.3,
            aliases: BTreeMap::new(),
            annotate: true,
            extract_content: true,
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// [`FencetagError::FileNotFound`] when `path` does not exist,
    /// [`FencetagError::ConfigParseError`] for malformed JSON and
    /// [`FencetagError::ConfigError`] for invalid values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FencetagError::FileNotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Default configuration file location, when a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// The default configuration file, if one exists on disk.
    pub fn discover() -> Option<PathBuf> {
        Self::default_path().filter(|path| path.is_file())
    }

    /// Load `explicit` if given, else the discovered default file, else the
    /// built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::discover() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Check weights and threshold.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;

        if !self.min_confidence.is_finite() || !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(FencetagError::ConfigError(format!(
                "min_confidence must lie within [0, 1], got {}",
                self.min_confidence
            )));
        }

        Ok(())
    }

    /// Normalizer built from the defaults plus configured aliases.
    pub fn normalizer(&self) -> LanguageNormalizer {
        if self.aliases.is_empty() { LanguageNormalizer::new() } else { LanguageNormalizer::with_overrides(&self.aliases) }
    }

    /// Classifier with the configured weights and the default detector.
    pub fn classifier(&self) -> LanguageClassifier {
        LanguageClassifier::with_default_detector(self.weights)
    }

    pub fn attribution_options(&self) -> AttributionOptions {
        AttributionOptions { context_lines: self.context_lines, min_confidence: self.min_confidence }
    }
}
