use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{RawEntryList, RawVideoRecord, VideoMetadata};

/// Read a transcript file, or stdin when the path is `-`
pub fn read_transcript_file(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
}

/// Flatten WebVTT subtitles to plain text
///
/// Drops the `WEBVTT` header, cue-timing lines, numeric cue indices and
/// blank lines, then joins what is left with single spaces.
pub fn vtt_to_text(vtt: &str) -> String {
    vtt.lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && !line.starts_with("WEBVTT")
                && !line.contains("-->")
                && !line.chars().all(|c| c.is_ascii_digit())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse one yt-dlp JSON object into canonical metadata
pub fn parse_video_json(json: &str) -> Result<VideoMetadata> {
    let raw: RawVideoRecord = serde_json::from_str(json).context("Failed to parse yt-dlp JSON")?;
    Ok(VideoMetadata::from_raw(&raw))
}

/// Parse playlist-shaped yt-dlp JSON into canonical metadata
pub fn parse_entries_json(json: &str) -> Result<Vec<VideoMetadata>> {
    let list: RawEntryList = serde_json::from_str(json).context("Failed to parse yt-dlp JSON")?;
    Ok(normalize_entries(&list))
}

/// Normalize every usable entry, preserving order
///
/// Null entries, entries without a non-empty id, and entries that are not
/// JSON objects are skipped.
pub fn normalize_entries(list: &RawEntryList) -> Vec<VideoMetadata> {
    let Some(entries) = &list.entries else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| !entry.is_null())
        .filter_map(|entry| match RawVideoRecord::deserialize(entry) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!("Failed to parse entry: {}", e);
                None
            }
        })
        .filter(RawVideoRecord::has_id)
        .map(|raw| VideoMetadata::from_raw(&raw))
        .collect()
}

/// Normalize a single-record lookup; absent when the record has no id
pub fn normalize_single(value: &Value) -> Option<VideoMetadata> {
    let raw = RawVideoRecord::deserialize(value).ok()?;
    raw.has_id().then(|| VideoMetadata::from_raw(&raw))
}
