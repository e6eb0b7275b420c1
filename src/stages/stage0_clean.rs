use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::info;

/// `HH:MM:SS.mmm --> HH:MM:SS.mmm`
static LONG_CUE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{2}:\d{2}:\d{2}\.\d{3}\s*-->\s*\d{2}:\d{2}:\d{2}\.\d{3}").unwrap()
});

/// `MM:SS.mmm --> MM:SS.mmm`
static SHORT_CUE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}:\d{2}\.\d{3}\s*-->\s*\d{2}:\d{2}\.\d{3}").unwrap());

/// Arrow left over from cue ranges neither pattern recognised
static STRAY_ARROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-->").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Non-speech annotations such as `[Music]` or `[Applause]`
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").unwrap());

/// Configuration for the cleaning stage
#[derive(Debug, Clone)]
pub struct CleanConfig {
    /// Strip subtitle cue-timing ranges
    pub remove_timestamps: bool,
    /// Drop a line when it repeats the previously kept line
    pub deduplicate: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            remove_timestamps: true,
            deduplicate: true,
        }
    }
}

/// Result of cleaning a transcript
#[derive(Debug, Clone, Serialize)]
pub struct CleanedTranscript {
    #[serde(rename = "cleaned_transcript")]
    pub text: String,
    /// Length of the input in characters
    pub original_length: usize,
    /// Length of `text` in characters
    pub cleaned_length: usize,
    /// `original_length / cleaned_length`, or 1.0 when nothing is left
    pub compression_ratio: f64,
}

impl CleanedTranscript {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Clean raw subtitle text
///
/// Steps run in a fixed order; the config only gates the first two:
/// 1. Remove cue-timing ranges (hour-qualified form first)
/// 2. Drop empty lines and lines equal to the previous kept line
/// 3. Collapse whitespace, remove bracketed annotations (and, with
///    timestamp removal on, leftover arrows), trim
pub fn clean_transcript(raw: &str, config: &CleanConfig) -> CleanedTranscript {
    info!("Cleaning transcript ({} chars)", raw.chars().count());

    let mut cleaned = raw.to_string();

    if config.remove_timestamps {
        cleaned = remove_cue_ranges(&cleaned);
    }

    if config.deduplicate {
        cleaned = dedup_adjacent_lines(&cleaned);
    }

    cleaned = WHITESPACE_RUN.replace_all(&cleaned, " ").into_owned();
    cleaned = strip_annotations(&cleaned, config.remove_timestamps);
    // Removing an annotation between two words leaves a double space
    cleaned = WHITESPACE_RUN.replace_all(&cleaned, " ").trim().to_string();

    let original_length = raw.chars().count();
    let cleaned_length = cleaned.chars().count();
    let compression_ratio = if cleaned_length > 0 {
        original_length as f64 / cleaned_length as f64
    } else {
        1.0
    };

    let result = CleanedTranscript {
        text: cleaned,
        original_length,
        cleaned_length,
        compression_ratio,
    };

    info!(
        "Cleaned transcript ({} chars, {} words)",
        result.cleaned_length,
        result.word_count()
    );

    result
}

fn remove_cue_ranges(text: &str) -> String {
    let text = LONG_CUE_RANGE.replace_all(text, "");
    SHORT_CUE_RANGE.replace_all(&text, "").into_owned()
}

/// Remove bracketed spans, and stray arrows when asked, until none remain
///
/// Either removal can join its neighbours into a new match (`-[x]->`,
/// `---->>`, `[-->]`), so a single pass is not enough.
fn strip_annotations(text: &str, remove_arrows: bool) -> String {
    let mut current = text.to_string();

    loop {
        let mut next = BRACKETED.replace_all(&current, "").into_owned();
        if remove_arrows {
            next = STRAY_ARROW.replace_all(&next, "").into_owned();
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Adjacency-based dedup: a line seen again after a different line is kept
fn dedup_adjacent_lines(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || kept.last() == Some(&line) {
            continue;
        }
        kept.push(line);
    }

    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(text: &str) -> CleanedTranscript {
        clean_transcript(text, &CleanConfig::default())
    }

    #[test]
    fn test_removes_long_timestamps() {
        let result = clean("00:00:05.000 --> 00:00:10.000 Hello world 00:00:10.000 --> 00:00:15.000 Test");

        assert_eq!(result.text, "Hello world Test");
        assert!(!result.text.contains("-->"));
        assert!(!result.text.contains("00:00"));
    }

    #[test]
    fn test_removes_short_timestamps() {
        let result = clean("05:30.500 --> 05:35.000 Some speech content");
        assert_eq!(result.text, "Some speech content");
    }

    #[test]
    fn test_keeps_timestamps_when_disabled() {
        let config = CleanConfig {
            remove_timestamps: false,
            deduplicate: true,
        };
        let result = clean_transcript("05:30.500 --> 05:35.000 speech", &config);
        assert_eq!(result.text, "05:30.500 --> 05:35.000 speech");
    }

    #[test]
    fn test_removes_bracketed_annotations() {
        let result = clean("Hello [Music] everyone [Applause] welcome");
        assert_eq!(result.text, "Hello everyone welcome");
    }

    #[test]
    fn test_dedup_is_adjacency_based() {
        assert_eq!(dedup_adjacent_lines("Hello\nHello\n\nHello\nWorld\nWorld"), "Hello\nWorld");
        assert_eq!(dedup_adjacent_lines("a\nb\na"), "a\nb\na");
        assert_eq!(dedup_adjacent_lines("  a  \na"), "a");
    }

    #[test]
    fn test_dedup_disabled_keeps_repeats() {
        let config = CleanConfig {
            remove_timestamps: true,
            deduplicate: false,
        };
        let result = clean_transcript("Hello\nHello", &config);
        assert_eq!(result.text, "Hello Hello");
    }

    #[test]
    fn test_collapses_whitespace() {
        let result = clean("Hello    world  this   has \t extra\n\n  spaces");
        assert_eq!(result.text, "Hello world this has extra spaces");
    }

    #[test]
    fn test_empty_input() {
        let result = clean("");

        assert_eq!(result.text, "");
        assert_eq!(result.original_length, 0);
        assert_eq!(result.cleaned_length, 0);
        assert_eq!(result.compression_ratio, 1.0);
    }

    #[test]
    fn test_only_annotations_gives_ratio_one() {
        let result = clean("[Music] [Applause]");
        assert_eq!(result.text, "");
        assert_eq!(result.compression_ratio, 1.0);
    }

    #[test]
    fn test_compression_ratio() {
        let input = "[Music] [Music] [Music] Hello world [Applause]";
        let result = clean(input);

        assert_eq!(result.text, "Hello world");
        assert_eq!(result.original_length, input.len());
        assert_eq!(result.cleaned_length, 11);
        assert_eq!(result.compression_ratio, input.len() as f64 / 11.0);
    }

    #[test]
    fn test_lengths_count_characters() {
        let result = clean("café ☕");
        assert_eq!(result.original_length, 6);
        assert_eq!(result.cleaned_length, 6);
    }

    #[test]
    fn test_arrow_rebuilt_by_bracket_removal() {
        assert_eq!(clean("a -[Music]-> b").text, "a b");
        assert_eq!(clean("x ---->> y").text, "x y");
        assert_eq!(clean("p [-->] q").text, "p q");
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let inputs = [
            "WEBVTT\n\n00:00:00.000 --> 00:00:05.000\nHello there\nHello there\n[Music]\nGeneral  Kenobi",
            "a [x] b\n\na\n  c  [y]",
            "stray --> arrow and 01:02.003 --> 01:04.000 cue",
            "a -[Music]-> b",
            "x ---->> y [-->] z",
        ];

        for input in inputs {
            let once = clean(input);
            let twice = clean(&once.text);
            assert_eq!(once.text, twice.text, "input: {:?}", input);
            assert!(!once.text.contains("-->"));
            assert!(!once.text.contains("  "));
        }
    }
}
