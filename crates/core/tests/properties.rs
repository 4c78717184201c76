//! Property tests for classification and reattachment
use fencetag_core::{
    AttributionOptions, CodeBlock, ContextWindow, LanguageClassifier, LanguageNormalizer, ScoreBoard, WeightConfig,
    attribute_languages, find_fenced_blocks, reattach,
};
use proptest::prelude::*;

const LANGUAGES: &[&str] = &["go", "rust", "python", "bash", "sql", ""];

fn body() -> impl Strategy<Value = String> {
    "[a-z0-9 =:;(){}.\n]{0,60}"
}

fn document() -> impl Strategy<Value = (String, Vec<&'static str>)> {
    prop::collection::vec((body(), prop::sample::select(LANGUAGES)), 0..8).prop_map(|blocks| {
        let mut md = String::from("Intro paragraph.\n\n");
        let mut languages = Vec::new();
        for (i, (content, language)) in blocks.into_iter().enumerate() {
            md.push_str(&format!("Step {}.\n\n```\n{}\n```\n\n", i, content));
            languages.push(language);
        }
        (md, languages)
    })
}

proptest! {
    #[test]
    fn classify_confidence_is_bounded(content in "\\PC{0,200}", before in "\\PC{0,80}", after in "\\PC{0,80}") {
        let classifier = LanguageClassifier::new(WeightConfig::default());
        let block = CodeBlock::new(content).with_context(ContextWindow::new(before, after));
        let score = classifier.classify(&block);
        prop_assert!(score.confidence >= 0.0);
        prop_assert!(score.confidence <= 1.0);
        if score.language.is_empty() {
            prop_assert_eq!(score.confidence, 0.0);
        }
    }

    #[test]
    fn explicit_language_always_wins(content in "\\PC{0,200}", language in "[a-z]{1,10}") {
        let classifier = LanguageClassifier::new(WeightConfig::default());
        let score = classifier.classify(&CodeBlock::explicit(content, language.clone()));
        prop_assert_eq!(score.language, language);
        prop_assert_eq!(score.confidence, 1.0);
    }

    #[test]
    fn score_board_best_is_bounded(entries in prop::collection::vec((prop::sample::select(LANGUAGES), -5.0f64..10.0), 0..20)) {
        let mut board = ScoreBoard::new();
        for (language, weight) in &entries {
            board.add(language, *weight);
        }
        let best = board.best();
        prop_assert!((0.0..=1.0).contains(&best.confidence));
        prop_assert!(best.score <= board.total() + f64::EPSILON);
        for (_, score) in board.iter() {
            prop_assert!(score <= best.score);
        }
    }

    #[test]
    fn reattach_is_idempotent((md, languages) in document()) {
        let once = reattach(&md, &languages);
        prop_assert_eq!(reattach(&once, &languages), once);
    }

    #[test]
    fn reattach_preserves_blocks_and_order((md, languages) in document()) {
        let tagged = reattach(&md, &languages);
        let before = find_fenced_blocks(&md);
        let after = find_fenced_blocks(&tagged);

        prop_assert_eq!(before.len(), after.len());
        for ((original, rewritten), language) in before.iter().zip(&after).zip(&languages) {
            prop_assert_eq!(&original.content, &rewritten.content);
            prop_assert_eq!(rewritten.language.as_str(), *language);
        }
    }

    #[test]
    fn reattach_touches_only_tokens((md, languages) in document()) {
        let tagged = reattach(&md, &languages);
        let stripped: String = tagged
            .lines()
            .map(|line| if line.starts_with("```") { "```" } else { line })
            .collect::<Vec<_>>()
            .join("\n");
        let original: String = md.lines().collect::<Vec<_>>().join("\n");
        prop_assert_eq!(stripped, original);
    }

    #[test]
    fn attribution_reports_every_block((md, _languages) in document()) {
        let classifier = LanguageClassifier::new(WeightConfig::default());
        let result = attribute_languages(&md, None, &classifier, &AttributionOptions::default());
        let blocks = find_fenced_blocks(&md);
        prop_assert_eq!(result.blocks.len(), blocks.len());
        for (i, block) in result.blocks.iter().enumerate() {
            prop_assert_eq!(block.index, i);
            prop_assert!((0.0..=1.0).contains(&block.confidence));
        }
    }
}

#[test]
fn test_canonical_languages_round_trip() {
    let normalizer = LanguageNormalizer::new();
    for language in normalizer.canonical_languages() {
        assert_eq!(normalizer.normalize(language), language);
        assert_eq!(normalizer.normalize(&language.to_uppercase()), language);
    }
}
