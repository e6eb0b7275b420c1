use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::info;

/// Category of a technical-term pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptCategory {
    GeneralAi,
    MachineLearning,
    Algorithms,
    SelfImprovement,
    Transformers,
    LearningParadigms,
    ModelLifecycle,
    Tooling,
    Data,
    Evaluation,
}

/// A compiled term pattern and the category it belongs to
pub struct ConceptPattern {
    pub category: ConceptCategory,
    pub regex: Regex,
}

/// Term patterns in match order; the order decides ties in the ranking
pub static CONCEPT_PATTERNS: LazyLock<Vec<ConceptPattern>> = LazyLock::new(|| {
    [
        (ConceptCategory::GeneralAi, r"\b(AI|AGI|ASI)\b"),
        (
            ConceptCategory::MachineLearning,
            r"\b(machine learning|deep learning|neural network)\b",
        ),
        (ConceptCategory::Algorithms, r"\b(algorithm|optimization|architecture)\b"),
        (
            ConceptCategory::SelfImprovement,
            r"\b(self-improvement|recursive|meta-learning)\b",
        ),
        (ConceptCategory::Transformers, r"\b(transformer|attention|embedding)\b"),
        (
            ConceptCategory::LearningParadigms,
            r"\b(reinforcement learning|supervised learning)\b",
        ),
        (ConceptCategory::ModelLifecycle, r"\b(model|training|inference)\b"),
        (ConceptCategory::Tooling, r"\b(framework|library|API)\b"),
        (ConceptCategory::Data, r"\b(data|dataset|benchmark)\b"),
        (ConceptCategory::Evaluation, r"\b(performance|accuracy|precision)\b"),
    ]
    .into_iter()
    .map(|(category, pattern)| ConceptPattern {
        category,
        regex: Regex::new(&format!("(?i){}", pattern)).unwrap(),
    })
    .collect()
});

/// Configuration for concept extraction
#[derive(Debug, Clone)]
pub struct ConceptConfig {
    /// Minimum number of mentions for a term to be reported
    pub min_frequency: usize,
    /// Accepted for callers but does not change matching yet
    pub focus_domains: Vec<String>,
}

impl Default for ConceptConfig {
    fn default() -> Self {
        Self {
            min_frequency: 2,
            focus_domains: Vec::new(),
        }
    }
}

/// Concepts that met the frequency threshold
#[derive(Debug, Clone, Serialize)]
pub struct ConceptReport {
    /// Lowercased terms, most frequent first
    pub concepts: Vec<String>,
    /// Counts for the reported terms only
    pub concept_counts: HashMap<String, usize>,
    pub total_concepts: usize,
}

impl ConceptReport {
    pub fn count(&self, concept: &str) -> usize {
        self.concept_counts.get(concept).copied().unwrap_or(0)
    }
}

/// Count technical terms and report those mentioned often enough
///
/// Matching is case-insensitive and every match is lowercased, so `AI`,
/// `Ai` and `ai` share one count. Equal counts keep first-seen order.
pub fn extract_concepts(text: &str, config: &ConceptConfig) -> ConceptReport {
    info!("Extracting concepts (min_freq={})", config.min_frequency);

    // Insertion-ordered tally; the stable sort below relies on it
    let mut tally: Vec<(String, usize)> = Vec::new();

    for pattern in CONCEPT_PATTERNS.iter() {
        for m in pattern.regex.find_iter(text) {
            let term = m.as_str().to_lowercase();
            match tally.iter_mut().find(|(t, _)| *t == term) {
                Some((_, count)) => *count += 1,
                None => tally.push((term, 1)),
            }
        }
    }

    tally.retain(|(_, count)| *count >= config.min_frequency);
    tally.sort_by(|a, b| b.1.cmp(&a.1));

    let report = ConceptReport {
        total_concepts: tally.len(),
        concepts: tally.iter().map(|(term, _)| term.clone()).collect(),
        concept_counts: tally.into_iter().collect(),
    };

    info!("Extracted {} concepts", report.total_concepts);

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str, min_frequency: usize) -> ConceptReport {
        extract_concepts(
            text,
            &ConceptConfig {
                min_frequency,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_sorted_by_frequency() {
        let report = extract("AI AI AI AI algorithm algorithm model", 1);

        assert_eq!(report.concepts, vec!["ai", "algorithm", "model"]);
        assert_eq!(report.count("ai"), 4);
        assert_eq!(report.count("algorithm"), 2);
        assert_eq!(report.count("model"), 1);
        assert_eq!(report.total_concepts, 3);
    }

    #[test]
    fn test_threshold_drops_rare_terms() {
        let report = extract("AI AI AI AI algorithm algorithm model", 2);

        assert_eq!(report.concepts, vec!["ai", "algorithm"]);
        assert!(!report.concept_counts.contains_key("model"));
    }

    #[test]
    fn test_case_insensitive() {
        let report = extract("AI is here. ai is powerful. Ai works.", 2);
        assert_eq!(report.concepts, vec!["ai"]);
        assert_eq!(report.count("ai"), 3);
    }

    #[test]
    fn test_multi_word_phrases() {
        let report = extract(
            "Machine learning is great. Machine learning helps. Machine learning works.",
            2,
        );
        assert_eq!(report.concepts, vec!["machine learning"]);
        assert_eq!(report.count("machine learning"), 3);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        // "data" belongs to a later pattern than "model", so it ranks after it
        let report = extract("data data model model", 1);
        assert_eq!(report.concepts, vec!["model", "data"]);

        let report = extract("inference training training inference", 1);
        assert_eq!(report.concepts, vec!["inference", "training"]);
    }

    #[test]
    fn test_whole_words_only() {
        let report = extract("models datasets maintain", 1);
        assert!(report.concepts.is_empty());
    }

    #[test]
    fn test_counts_respect_threshold() {
        let report = extract("AI is mentioned once. Algorithm algorithm algorithm.", 3);

        assert_eq!(report.concepts, vec!["algorithm"]);
        for count in report.concept_counts.values() {
            assert!(*count >= 3);
        }
    }

    #[test]
    fn test_empty_text() {
        let report = extract("", 1);
        assert!(report.concepts.is_empty());
        assert!(report.concept_counts.is_empty());
        assert_eq!(report.total_concepts, 0);
    }

    #[test]
    fn test_focus_domains_do_not_filter() {
        let config = ConceptConfig {
            min_frequency: 1,
            focus_domains: vec!["robotics".to_string()],
        };
        let report = extract_concepts("attention attention dataset", &config);
        assert_eq!(report.concepts, vec!["attention", "dataset"]);
    }

    #[test]
    fn test_pattern_table_order() {
        assert_eq!(CONCEPT_PATTERNS.len(), 10);
        assert_eq!(CONCEPT_PATTERNS[0].category, ConceptCategory::GeneralAi);
        assert_eq!(CONCEPT_PATTERNS[9].category, ConceptCategory::Evaluation);
    }
}
