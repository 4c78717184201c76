//! Weighted signal classification of code blocks.
//!
//! A [`LanguageClassifier`] combines independent signals into a score per
//! candidate language:
//!
//! 1. code-content heuristics ([`signals::HEURISTIC_TABLE`]),
//! 2. an optional external [`ContentDetector`],
//! 3. signals from the prose around the block ([`signals::CONTEXT_TABLE`]).
//!
//! Scores accumulate in an insertion-ordered map, so ties resolve to the
//! language that fired first in evaluation order.
//!
//! # Example
//!
//! ```rust
//! use fencetag_core::classifier::{CodeBlock, LanguageClassifier, WeightConfig};
//!
//! let classifier = LanguageClassifier::new(WeightConfig::default());
//! let score = classifier.classify(&CodeBlock::new("package main\nfunc main(){}"));
//! assert_eq!(score.language, "go");
//! assert!(score.confidence > 0.3);
//! ```

pub mod detector;
pub mod signals;
pub mod statistical;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

pub use detector::{ContentDetector, DetectorChain};
#[cfg(feature = "detector")]
pub use detector::SyntectDetector;
pub use statistical::{StatisticalDetector, TokenModel};

use crate::fences::ContextWindow;
use crate::{FencetagError, Result};

/// Weights of the signal categories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Score of an explicitly declared language
    pub explicit: f64,
    /// File names with a language extension near the block
    pub file_extension: f64,
    /// Toolchain commands near the block
    pub command: f64,
    /// Code-content heuristics
    pub heuristic: f64,
    /// External detector hit
    pub detector: f64,
    /// Language mentions near the block
    pub context: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self { explicit: 10.0, file_extension: 3.0, command: 2.0, heuristic: 2.0, detector: 2.0, context: 3.0 }
    }
}

impl WeightConfig {
    /// Reject negative or non-finite weights.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("explicit", self.explicit),
            ("file_extension", self.file_extension),
            ("command", self.command),
            ("heuristic", self.heuristic),
            ("detector", self.detector),
            ("context", self.context),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(FencetagError::ConfigError(format!(
                    "weight `{name}` must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// A code block to classify.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeBlock {
    pub content: String,
    /// Declared language, if any.
    pub language: Option<String>,
    /// Prose around the block.
    pub context: Option<ContextWindow>,
    /// Whether the declared language is authoritative.
    pub explicit: bool,
}

impl CodeBlock {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), ..Default::default() }
    }

    /// A block whose language was declared by the author.
    pub fn explicit(content: impl Into<String>, language: impl Into<String>) -> Self {
        Self { content: content.into(), language: Some(language.into()), context: None, explicit: true }
    }

    pub fn with_context(mut self, context: ContextWindow) -> Self {
        self.context = Some(context);
        self
    }
}

/// Outcome of a classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LanguageScore {
    /// Best language, or `""` when no signal fired.
    pub language: String,
    /// Raw weighted score of the best language.
    pub score: f64,
    /// Share of the best score in the total, within `[0, 1]`.
    pub confidence: f64,
}

impl LanguageScore {
    pub fn is_empty(&self) -> bool {
        self.language.is_empty()
    }
}

/// Insertion-ordered accumulator of language scores.
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    scores: IndexMap<String, f64>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to `language`. Non-positive or non-finite weights are
    /// not recorded.
    pub fn add(&mut self, language: &str, weight: f64) {
        if language.is_empty() || !weight.is_finite() || weight <= 0.0 {
            return;
        }
        *self.scores.entry(language.to_string()).or_insert(0.0) += weight;
    }

    pub fn get(&self, language: &str) -> Option<f64> {
        self.scores.get(language).copied()
    }

    pub fn total(&self) -> f64 {
        self.scores.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(language, score)| (language.as_str(), *score))
    }

    /// Strictly greatest score; ties keep the earliest inserted language.
    pub fn best(&self) -> LanguageScore {
        let mut best: Option<(&str, f64)> = None;
        for (language, score) in self.iter() {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((language, score));
            }
        }

        let total = self.total();
        match best {
            Some((language, score)) if total > 0.0 => LanguageScore {
                language: language.to_string(),
                score,
                confidence: (score / total).clamp(0.0, 1.0),
            },
            _ => LanguageScore::default(),
        }
    }
}

/// Classifier holding weights and an optional external detector.
pub struct LanguageClassifier {
    weights: WeightConfig,
    detector: Option<Box<dyn ContentDetector>>,
}

impl fmt::Debug for LanguageClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageClassifier")
            .field("weights", &self.weights)
            .field("detector", &self.detector.as_ref().map(|d| d.name()))
            .finish()
    }
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::with_default_detector(WeightConfig::default())
    }
}

impl LanguageClassifier {
    /// A classifier without an external detector.
    pub fn new(weights: WeightConfig) -> Self {
        Self { weights, detector: None }
    }

    /// A classifier with the bundled [`detector::default_detector`] chain.
    pub fn with_default_detector(weights: WeightConfig) -> Self {
        Self::new(weights).with_detector(detector::default_detector())
    }

    pub fn with_detector(mut self, detector: impl ContentDetector + 'static) -> Self {
        self.detector = Some(Box::new(detector));
        self
    }

    pub fn weights(&self) -> &WeightConfig {
        &self.weights
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    /// Classify a block.
    pub fn classify(&self, block: &CodeBlock) -> LanguageScore {
        if block.explicit {
            return LanguageScore {
                language: block.language.clone().unwrap_or_default(),
                score: self.weights.explicit,
                confidence: 1.0,
            };
        }

        let board = self.score_board(block);
        let best = board.best();
        trace!(
            language = best.language.as_str(),
            score = best.score,
            confidence = best.confidence,
            candidates = board.iter().count(),
            "classified block"
        );
        best
    }

    /// Accumulate every signal for a non-explicit block.
    pub fn score_board(&self, block: &CodeBlock) -> ScoreBoard {
        let mut board = ScoreBoard::new();
        let content = block.content.as_str();

        for heuristic in signals::heuristics() {
            if heuristic.matches(content) {
                board.add(heuristic.language, self.weights.heuristic);
            }
        }

        if let Some(detector) = &self.detector
            && let Some(native) = detector.detect(content)
        {
            match detector::map_detector_name(&native) {
                Some(language) => {
                    board.add(language, detector::scaled_weight(self.weights.detector, content));
                }
                None => trace!(detector = detector.name(), native = native.as_str(), "unmapped detector result"),
            }
        }

        if let Some(context) = &block.context {
            let text = context.text();
            if !text.trim().is_empty() {
                for signal in signals::context_signals() {
                    if signal.matches(&text) {
                        board.add(signal.language, signal.kind.weight(&self.weights));
                    }
                }
            }
        }

        board
    }
}
