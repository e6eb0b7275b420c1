use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// Watch URL template; the video id is appended verbatim
pub const WATCH_URL_PREFIX: &str = "https://youtube.com/watch?v=";

/// One entry from `yt-dlp -J` output, prior to normalization
///
/// Every field is optional. A value of an unexpected JSON type reads as
/// absent instead of failing the whole record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVideoRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub channel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub uploader: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub channel_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub uploader_id: Option<String>,
    /// Seconds; yt-dlp sometimes reports fractional values
    #[serde(default, deserialize_with = "lenient::float")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub duration_string: Option<String>,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub view_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub upload_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::thumbnails")]
    pub thumbnails: Option<Vec<RawThumbnail>>,
}

impl RawVideoRecord {
    /// Whether this record carries a usable (non-empty) video id
    pub fn has_id(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawThumbnail {
    #[serde(default)]
    pub url: Option<String>,
}

/// Playlist-shaped output (search, channel, playlist, trending)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntryList {
    /// Kept as raw JSON so that one malformed entry can be skipped on its own
    #[serde(default, deserialize_with = "lenient::entries")]
    pub entries: Option<Vec<Value>>,
}

/// Canonical video metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub channel_id: Option<String>,
    #[serde(rename = "duration")]
    pub duration_seconds: Option<u64>,
    #[serde(rename = "duration_string")]
    pub duration_display: Option<String>,
    pub view_count: Option<u64>,
    pub upload_date: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: Option<String>,
    /// Always `WATCH_URL_PREFIX` + `id`, even when the id is empty
    #[serde(rename = "url")]
    pub canonical_url: String,
}

impl VideoMetadata {
    /// Normalize one raw record. Never fails; every field has a fallback.
    pub fn from_raw(raw: &RawVideoRecord) -> Self {
        let id = raw.id.clone().unwrap_or_default();

        let thumbnail_url = non_empty(&raw.thumbnail).or_else(|| {
            raw.thumbnails
                .as_ref()
                .and_then(|thumbs| thumbs.last())
                .and_then(|thumb| thumb.url.clone())
        });

        Self {
            canonical_url: watch_url(&id),
            id,
            title: raw.title.clone().unwrap_or_else(|| "Unknown".to_string()),
            channel: non_empty(&raw.channel)
                .or_else(|| raw.uploader.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            channel_id: non_empty(&raw.channel_id).or_else(|| raw.uploader_id.clone()),
            duration_seconds: raw.duration.map(truncate_seconds),
            duration_display: format_duration(raw.duration).or_else(|| raw.duration_string.clone()),
            view_count: raw.view_count,
            upload_date: raw.upload_date.clone(),
            description: raw.description.clone(),
            thumbnail_url,
        }
    }
}

/// Build the canonical watch URL for an id
pub fn watch_url(id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, id)
}

/// Format a second count as `H:MM:SS`, or `M:SS` under an hour
///
/// Fractional input is truncated toward zero first.
pub fn format_duration(seconds: Option<f64>) -> Option<String> {
    let total = truncate_seconds(seconds?);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        Some(format!("{}:{:02}:{:02}", hours, minutes, secs))
    } else {
        Some(format!("{}:{:02}", minutes, secs))
    }
}

fn truncate_seconds(seconds: f64) -> u64 {
    // `as` saturates: negatives and NaN become 0
    seconds.trunc() as u64
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawVideoRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Some(45.0)).as_deref(), Some("0:45"));
        assert_eq!(format_duration(Some(185.0)).as_deref(), Some("3:05"));
        assert_eq!(format_duration(Some(3725.0)).as_deref(), Some("1:02:05"));
        assert_eq!(format_duration(Some(3665.0)).as_deref(), Some("1:01:05"));
        assert_eq!(format_duration(Some(0.0)).as_deref(), Some("0:00"));
        assert_eq!(format_duration(None), None);
    }

    #[test]
    fn test_format_duration_truncates_fractions() {
        assert_eq!(format_duration(Some(125.5)).as_deref(), Some("2:05"));
        assert_eq!(format_duration(Some(59.999)).as_deref(), Some("0:59"));
    }

    #[test]
    fn test_format_duration_has_no_hour_cap() {
        assert_eq!(format_duration(Some(360_000.0)).as_deref(), Some("100:00:00"));
    }

    #[test]
    fn test_uploader_fallback() {
        let meta = VideoMetadata::from_raw(&raw(r#"{"id": "abc123", "uploader": "Chan"}"#));

        assert_eq!(meta.channel, "Chan");
        assert_eq!(meta.duration_seconds, None);
        assert_eq!(meta.duration_display, None);
        assert_eq!(meta.canonical_url, "https://youtube.com/watch?v=abc123");
    }

    #[test]
    fn test_full_record() {
        let meta = VideoMetadata::from_raw(&raw(
            r#"{
                "id": "video123",
                "title": "Introduction to AI",
                "channel": "Tech Channel",
                "channel_id": "UC123",
                "uploader_id": "ignored",
                "duration": 900,
                "duration_string": "ignored",
                "view_count": 10000,
                "upload_date": "20240101",
                "description": "A great intro to AI",
                "thumbnails": [
                    {"url": "https://img.youtube.com/vi/video123/0.jpg"},
                    {"url": "https://img.youtube.com/vi/video123/hq.jpg"}
                ]
            }"#,
        ));

        assert_eq!(meta.title, "Introduction to AI");
        assert_eq!(meta.channel, "Tech Channel");
        assert_eq!(meta.channel_id.as_deref(), Some("UC123"));
        assert_eq!(meta.duration_seconds, Some(900));
        assert_eq!(meta.duration_display.as_deref(), Some("15:00"));
        assert_eq!(meta.view_count, Some(10000));
        assert_eq!(
            meta.thumbnail_url.as_deref(),
            Some("https://img.youtube.com/vi/video123/hq.jpg")
        );
    }

    #[test]
    fn test_duration_string_used_without_duration() {
        let meta = VideoMetadata::from_raw(&raw(r#"{"id": "x", "duration_string": "4:20"}"#));
        assert_eq!(meta.duration_display.as_deref(), Some("4:20"));
    }

    #[test]
    fn test_direct_thumbnail_wins() {
        let meta = VideoMetadata::from_raw(&raw(
            r#"{"id": "x", "thumbnail": "direct.jpg", "thumbnails": [{"url": "list.jpg"}]}"#,
        ));
        assert_eq!(meta.thumbnail_url.as_deref(), Some("direct.jpg"));
    }

    #[test]
    fn test_thumbnail_list_without_url() {
        let meta = VideoMetadata::from_raw(&raw(r#"{"id": "x", "thumbnails": [{"width": 120}]}"#));
        assert_eq!(meta.thumbnail_url, None);

        let meta = VideoMetadata::from_raw(&raw(r#"{"id": "x", "thumbnails": []}"#));
        assert_eq!(meta.thumbnail_url, None);
    }

    #[test]
    fn test_empty_record_defaults() {
        let meta = VideoMetadata::from_raw(&RawVideoRecord::default());

        assert_eq!(meta.id, "");
        assert_eq!(meta.title, "Unknown");
        assert_eq!(meta.channel, "Unknown");
        assert_eq!(meta.channel_id, None);
        assert_eq!(meta.canonical_url, "https://youtube.com/watch?v=");
    }

    #[test]
    fn test_has_id() {
        assert!(raw(r#"{"id": "x"}"#).has_id());
        assert!(!raw(r#"{"id": ""}"#).has_id());
        assert!(!raw(r#"{"id": null}"#).has_id());
        assert!(!raw(r#"{}"#).has_id());
    }

    #[test]
    fn test_serialized_field_names() {
        let meta = VideoMetadata::from_raw(&raw(r#"{"id": "x", "duration": 61}"#));
        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["duration"], 61);
        assert_eq!(json["duration_string"], "1:01");
        assert_eq!(json["url"], "https://youtube.com/watch?v=x");
    }
}
