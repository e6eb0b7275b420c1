use serde::{Deserialize, Serialize};

use super::{lenient, VideoMetadata};
use crate::ytdlp::extract_video_id;

/// Loose video reference accepted when building a knowledge entity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoReference {
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    /// Free-form duration, either seconds or a display string
    #[serde(default, deserialize_with = "lenient::string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub word_count: Option<u64>,
}

impl From<&VideoMetadata> for VideoReference {
    fn from(meta: &VideoMetadata) -> Self {
        Self {
            url: Some(meta.canonical_url.clone()),
            title: Some(meta.title.clone()),
            duration: meta.duration_display.clone(),
            word_count: None,
        }
    }
}

/// A memory entity describing what was learned from one video
///
/// Construction only; storing it is left to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeEntity {
    pub entity_name: String,
    pub observations: Vec<String>,
}

impl KnowledgeEntity {
    pub fn build(
        video: &VideoReference,
        concepts: &[String],
        methodologies: &[String],
        summary: Option<&str>,
    ) -> Self {
        let url = video.url.as_deref().unwrap_or("");
        let title = video.title.as_deref().unwrap_or("");

        let video_id = extract_video_id(url).unwrap_or_else(|| {
            let digest = format!("{:x}", md5::compute(title.as_bytes()));
            digest[..8].to_string()
        });

        let mut observations = vec![
            format!("URL: {}", video.url.as_deref().unwrap_or("None")),
            format!("Title: {}", video.title.as_deref().unwrap_or("Unknown")),
            format!("Duration: {}", video.duration.as_deref().unwrap_or("Unknown")),
            format!("Word Count: {}", video.word_count.unwrap_or(0)),
        ];

        if let Some(summary) = summary.filter(|s| !s.is_empty()) {
            observations.push(format!("Summary: {}", summary));
        }

        observations.extend(concepts.iter().map(|c| format!("Concept: {}", c)));
        observations.extend(methodologies.iter().map(|m| format!("Methodology: {}", m)));

        Self {
            entity_name: format!("video_knowledge_{}", video_id),
            observations,
        }
    }
}
