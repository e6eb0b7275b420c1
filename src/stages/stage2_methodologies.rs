use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::info;

/// Kind of procedural language a pattern recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodologyCue {
    /// "we use ...", "they implement ..."
    SubjectAction,
    /// "the approach is ...", "our method involves ..."
    ApproachDescription,
    /// "first, ...", "then ...", "finally, ..."
    Sequencing,
    /// "Step 2: ...", "Phase 1: ..."
    NumberedStep,
}

pub struct MethodologyPattern {
    pub cue: MethodologyCue,
    pub regex: Regex,
}

/// Phrase patterns in extraction order; the last capture group is the phrase
pub static METHODOLOGY_PATTERNS: LazyLock<Vec<MethodologyPattern>> = LazyLock::new(|| {
    [
        (
            MethodologyCue::SubjectAction,
            r"(we|they|you)\s+(use|implement|apply|employ|build)\s+([^.!?]{10,100})",
        ),
        (
            MethodologyCue::ApproachDescription,
            r"(approach|method|technique|strategy)\s+(?:is|was|involves)\s+([^.!?]{10,100})",
        ),
        (
            MethodologyCue::Sequencing,
            r"(first|then|next|finally),?\s+([^.!?]{10,100})",
        ),
        (
            MethodologyCue::NumberedStep,
            r"(step \d+|phase \d+):\s*([^.!?]{10,100})",
        ),
    ]
    .into_iter()
    .map(|(cue, pattern)| MethodologyPattern {
        cue,
        regex: Regex::new(&format!("(?i){}", pattern)).unwrap(),
    })
    .collect()
});

static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").unwrap());

static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]{10,})`").unwrap());

/// Configuration for methodology extraction
#[derive(Debug, Clone)]
pub struct MethodologyConfig {
    /// Also collect fenced and inline code spans
    pub extract_code: bool,
    pub max_methodologies: usize,
    pub max_code_examples: usize,
    /// A phrase must be longer than this many characters
    pub min_phrase_chars: usize,
}

impl Default for MethodologyConfig {
    fn default() -> Self {
        Self {
            extract_code: false,
            max_methodologies: 20,
            max_code_examples: 10,
            min_phrase_chars: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodologyReport {
    /// Phrases in extraction order, capped at `max_methodologies`
    pub methodologies: Vec<String>,
    /// Always empty unless code extraction was requested
    pub code_examples: Vec<String>,
    /// Number of distinct phrases found before the cap
    pub total_methodologies: usize,
}

/// Extract procedural phrases, and optionally code spans, from a transcript
///
/// Phrases come out in pattern order, then match order within a pattern.
/// A phrase is kept once; comparison is exact and case-sensitive.
pub fn extract_methodologies(text: &str, config: &MethodologyConfig) -> MethodologyReport {
    info!("Extracting methodologies");

    let mut methodologies: Vec<String> = Vec::new();

    for pattern in METHODOLOGY_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(phrase) = caps.get(caps.len() - 1) else {
                continue;
            };
            let phrase = phrase.as_str().trim();

            if phrase.chars().count() > config.min_phrase_chars
                && !methodologies.iter().any(|m| m == phrase)
            {
                methodologies.push(phrase.to_string());
            }
        }
    }

    let code_examples = if config.extract_code {
        extract_code_examples(text)
    } else {
        Vec::new()
    };

    info!(
        "Extracted {} methodologies, {} code examples",
        methodologies.len(),
        code_examples.len()
    );

    let total_methodologies = methodologies.len();
    methodologies.truncate(config.max_methodologies);

    MethodologyReport {
        methodologies,
        code_examples: code_examples
            .into_iter()
            .take(config.max_code_examples)
            .collect(),
        total_methodologies,
    }
}

/// Fenced blocks first, then inline spans; contents only, untrimmed
fn extract_code_examples(text: &str) -> Vec<String> {
    [&*FENCED_CODE, &*INLINE_CODE]
        .into_iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> MethodologyReport {
        extract_methodologies(text, &MethodologyConfig::default())
    }

    #[test]
    fn test_sequencing_phrases() {
        let report = extract(
            "First, we carefully prepare the dataset and clean all the data. \
             Then, we train the machine learning model using gradient descent. \
             Next, we evaluate the results using validation metrics.",
        );

        assert_eq!(
            report.methodologies,
            vec![
                "we carefully prepare the dataset and clean all the data",
                "we train the machine learning model using gradient descent",
                "we evaluate the results using validation metrics",
            ]
        );
        assert_eq!(report.total_methodologies, 3);
    }

    #[test]
    fn test_subject_action_and_approach() {
        let report = extract(
            "We implement a novel architecture for this task. \
             The approach is to use gradient descent for optimization.",
        );

        assert_eq!(
            report.methodologies,
            vec![
                "a novel architecture for this task",
                "to use gradient descent for optimization",
            ]
        );
    }

    #[test]
    fn test_pattern_order_beats_text_order() {
        let report = extract(
            "Step 1: gather every labelled training example. \
             We use a held-out split to measure generalisation.",
        );

        assert_eq!(report.methodologies[0], "a held-out split to measure generalisation");
        assert_eq!(report.methodologies[1], "gather every labelled training example");
    }

    #[test]
    fn test_short_phrases_dropped() {
        // Matches the pattern but the phrase is exactly 20 characters
        let report = extract("Then, abcdefghij klmnopqrs.");
        assert!(report.methodologies.is_empty());

        let report = extract("Then, abcdefghij klmnopqrst.");
        assert_eq!(report.methodologies, vec!["abcdefghij klmnopqrst"]);
    }

    #[test]
    fn test_duplicates_removed() {
        let report = extract(
            "We use gradient descent for training. We use gradient descent for training.",
        );
        assert_eq!(report.methodologies, vec!["gradient descent for training"]);
        assert_eq!(report.total_methodologies, 1);
    }

    #[test]
    fn test_capped_at_twenty() {
        let text: Vec<String> = (0..30)
            .map(|i| format!("Step {}: Do something number {} that is meaningful.", i, i))
            .collect();
        let report = extract(&text.join(" "));

        assert_eq!(report.methodologies.len(), 20);
        assert_eq!(report.total_methodologies, 30);
        assert_eq!(report.methodologies[0], "Do something number 0 that is meaningful");
        assert_eq!(report.methodologies[19], "Do something number 19 that is meaningful");
    }

    #[test]
    fn test_code_ignored_by_default() {
        let report = extract("Here is some code: ```python print('hello')```");
        assert!(report.code_examples.is_empty());
    }

    #[test]
    fn test_code_extraction() {
        let config = MethodologyConfig {
            extract_code: true,
            ..Default::default()
        };
        let report = extract_methodologies(
            "Here is the code: ```python\ndef hello():\n    print('world')\n``` and `let x = compute();` but not `short`",
            &config,
        );

        assert_eq!(report.code_examples[0], "python\ndef hello():\n    print('world')\n");
        assert!(report.code_examples.contains(&"let x = compute();".to_string()));
        assert!(!report.code_examples.contains(&"short".to_string()));
    }

    #[test]
    fn test_code_examples_capped() {
        let config = MethodologyConfig {
            extract_code: true,
            ..Default::default()
        };
        let text: Vec<String> = (0..15).map(|i| format!("```block number {}```", i)).collect();
        let report = extract_methodologies(&text.join(" "), &config);

        assert_eq!(report.code_examples.len(), 10);
        assert_eq!(report.code_examples[0], "block number 0");
    }

    #[test]
    fn test_empty_text() {
        let report = extract("");
        assert!(report.methodologies.is_empty());
        assert!(report.code_examples.is_empty());
        assert_eq!(report.total_methodologies, 0);
    }
}
