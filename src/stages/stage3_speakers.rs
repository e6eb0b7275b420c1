use std::sync::LazyLock;

use regex::Regex;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, info};

/// Shortest speech span attributed to a speaker, in characters
const MIN_SPEECH_CHARS: usize = 20;

/// `Name:` followed by speech up to the next colon, newline or marker
static COLON_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Z][a-z]+):").unwrap());

/// `[Name] speech`
static BRACKET_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Z][a-z]+)\]\s*([^\[\n]{20,})").unwrap());

/// `>>Name speech`
static CHEVRON_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">>([A-Z][a-z]+)\s*([^>\n]{20,})").unwrap());

/// How a speaker was marked in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerLabelStyle {
    Colon,
    Bracketed,
    Chevron,
}

/// One attributed span of speech
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerSegment {
    pub speaker: String,
    pub text: String,
    pub style: SpeakerLabelStyle,
}

/// Everything one speaker said, in the order it was found
#[derive(Debug, Clone)]
pub struct SpeakerProfile {
    pub name: String,
    pub segments: Vec<String>,
}

impl SpeakerProfile {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn total_word_count(&self) -> usize {
        self.segments
            .iter()
            .map(|s| s.split_whitespace().count())
            .sum()
    }

    /// First recorded segment, or empty
    pub fn sample_text(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeakerReport {
    pub speaker_count: usize,
    /// Names in first-seen order
    pub speakers: Vec<String>,
    #[serde(rename = "speaker_stats", serialize_with = "serialize_stats")]
    pub profiles: Vec<SpeakerProfile>,
    #[serde(skip)]
    pub segments: Vec<SpeakerSegment>,
}

impl SpeakerReport {
    pub fn profile(&self, name: &str) -> Option<&SpeakerProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }
}

/// Attribute speech spans to labelled speakers
///
/// The three label styles are scanned independently, colon style first,
/// and their matches merged. Text without markers yields an empty report.
pub fn segment_speakers(text: &str) -> SpeakerReport {
    info!("Analyzing speakers");

    let mut segments = colon_segments(text);
    segments.extend(label_segments(text, &BRACKET_LABEL, SpeakerLabelStyle::Bracketed));
    segments.extend(label_segments(text, &CHEVRON_LABEL, SpeakerLabelStyle::Chevron));

    let mut profiles: Vec<SpeakerProfile> = Vec::new();
    for segment in &segments {
        match profiles.iter_mut().find(|p| p.name == segment.speaker) {
            Some(profile) => profile.segments.push(segment.text.clone()),
            None => profiles.push(SpeakerProfile {
                name: segment.speaker.clone(),
                segments: vec![segment.text.clone()],
            }),
        }
    }

    info!("Identified {} speakers", profiles.len());

    SpeakerReport {
        speaker_count: profiles.len(),
        speakers: profiles.iter().map(|p| p.name.clone()).collect(),
        profiles,
        segments,
    }
}

fn colon_segments(text: &str) -> Vec<SpeakerSegment> {
    let markers: Vec<_> = COLON_MARKER.captures_iter(text).collect();
    let mut segments = Vec::new();

    for (i, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let limit = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        let speech = text[whole.end()..limit]
            .trim_start()
            .split([':', '\n'])
            .next()
            .unwrap_or("");

        if speech.chars().count() < MIN_SPEECH_CHARS {
            debug!("Skipping short speech after marker {:?}", name.as_str());
            continue;
        }

        segments.push(SpeakerSegment {
            speaker: name.as_str().to_string(),
            text: speech.trim().to_string(),
            style: SpeakerLabelStyle::Colon,
        });
    }

    segments
}

fn label_segments(text: &str, pattern: &Regex, style: SpeakerLabelStyle) -> Vec<SpeakerSegment> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?;
            let speech = caps.get(2)?;
            Some(SpeakerSegment {
                speaker: name.as_str().to_string(),
                text: speech.as_str().trim().to_string(),
                style,
            })
        })
        .collect()
}

fn serialize_stats<S>(profiles: &[SpeakerProfile], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    #[derive(Serialize)]
    struct Stats<'a> {
        segments: usize,
        total_words: usize,
        sample: &'a str,
    }

    let mut map = serializer.serialize_map(Some(profiles.len()))?;
    for profile in profiles {
        map.serialize_entry(
            &profile.name,
            &Stats {
                segments: profile.segment_count(),
                total_words: profile.total_word_count(),
                sample: profile.sample_text(),
            },
        )?;
    }
    map.end()
}
