pub mod stage0_clean;
pub mod stage1_concepts;
pub mod stage2_methodologies;
pub mod stage3_speakers;

pub use stage0_clean::*;
pub use stage1_concepts::*;
pub use stage2_methodologies::*;
pub use stage3_speakers::*;

use serde::Serialize;

/// Configuration for a full analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub clean: CleanConfig,
    pub concepts: ConceptConfig,
    pub methodologies: MethodologyConfig,
}

/// Output of every stage for one transcript
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptAnalysis {
    pub cleaned: CleanedTranscript,
    pub concepts: ConceptReport,
    pub methodologies: MethodologyReport,
    pub speakers: SpeakerReport,
}

/// Run all stages over one transcript
///
/// Concepts and methodologies read the cleaned text. Speaker analysis reads
/// the raw text, since dedup and whitespace collapsing would remove the
/// legitimately repeated `Name:` lines and the newlines that end them.
pub fn analyze_transcript(raw: &str, config: &AnalysisConfig) -> TranscriptAnalysis {
    let cleaned = clean_transcript(raw, &config.clean);
    let concepts = extract_concepts(&cleaned.text, &config.concepts);
    let methodologies = extract_methodologies(&cleaned.text, &config.methodologies);
    let speakers = segment_speakers(raw);

    TranscriptAnalysis {
        cleaned,
        concepts,
        methodologies,
        speakers,
    }
}
