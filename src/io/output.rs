use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::VideoMetadata;
use crate::stages::TranscriptAnalysis;

/// Uniform outcome envelope
///
/// Serializes as `{"success": true, ...payload}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ToolResponse<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(message.into()),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize response")
    }

    /// Save the pretty-printed envelope, failures included
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write response to {:?}", path))
    }
}

impl<T: Serialize> From<Result<T>> for ToolResponse<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(e) => Self::failure(format!("{:#}", e)),
        }
    }
}

/// What a video listing was produced from
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSource {
    Query(String),
    Channel(String),
    Category(String),
    Playlist(String),
}

/// Payload for search, channel, trending and playlist results
#[derive(Debug, Clone, Serialize)]
pub struct VideoListing {
    #[serde(flatten)]
    pub source: ListingSource,
    pub count: usize,
    pub videos: Vec<VideoMetadata>,
}

impl VideoListing {
    pub fn new(source: ListingSource, videos: Vec<VideoMetadata>) -> Self {
        Self {
            source,
            count: videos.len(),
            videos,
        }
    }
}

/// Payload for a single video lookup
#[derive(Debug, Clone, Serialize)]
pub struct VideoInfo {
    pub video: VideoMetadata,
}

/// One line per video: `title (duration) by channel - url`
pub fn format_video_lines(videos: &[VideoMetadata]) -> String {
    videos
        .iter()
        .map(|v| {
            format!(
                "{} ({}) by {} - {}",
                v.title,
                v.duration_display.as_deref().unwrap_or("?"),
                v.channel,
                v.canonical_url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable analysis report
pub struct HumanReport<'a> {
    analysis: &'a TranscriptAnalysis,
}

impl<'a> HumanReport<'a> {
    pub fn new(analysis: &'a TranscriptAnalysis) -> Self {
        Self { analysis }
    }

    pub fn format(&self) -> String {
        let a = self.analysis;
        let mut output = String::new();

        output.push_str("Transcript\n==========\n");
        output.push_str(&format!(
            "{} -> {} chars (ratio {:.2}), {} words\n\n",
            a.cleaned.original_length,
            a.cleaned.cleaned_length,
            a.cleaned.compression_ratio,
            a.cleaned.word_count()
        ));

        output.push_str("Concepts\n--------\n");
        for concept in &a.concepts.concepts {
            output.push_str(&format!("{:>4}  {}\n", a.concepts.count(concept), concept));
        }
        output.push('\n');

        output.push_str(&format!(
            "Methodologies ({} found)\n-------------\n",
            a.methodologies.total_methodologies
        ));
        for method in &a.methodologies.methodologies {
            output.push_str(&format!("- {}\n", wrap_text(method, 78).replace('\n', "\n  ")));
        }
        output.push('\n');

        output.push_str("Speakers\n--------\n");
        for profile in &a.speakers.profiles {
            output.push_str(&format!(
                "{}: {} segments, {} words\n",
                profile.name,
                profile.segment_count(),
                profile.total_word_count()
            ));
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}
