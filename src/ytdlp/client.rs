use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::error::{Result, YtDlpError};
use super::urls::{
    channel_url, extract_video_id, playlist_url, search_url, trending_url, video_url, SortOrder,
    TrendingCategory,
};
use crate::io::{normalize_entries, normalize_single, vtt_to_text};
use crate::models::{RawEntryList, VideoMetadata};
use crate::stages::{clean_transcript, CleanConfig};

/// Upper bound on search results per call
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Configuration for the yt-dlp runner
#[derive(Debug, Clone)]
pub struct YtDlpConfig {
    /// Executable to run
    pub binary: PathBuf,
    /// Browser to borrow cookies from (`--cookies-from-browser`); `None` disables
    pub cookie_browser: Option<String>,
    /// Wall-clock limit for one invocation
    pub timeout: Duration,
    /// Where subtitle files are written while fetching transcripts
    pub transcripts_dir: PathBuf,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            cookie_browser: Some("firefox".to_string()),
            timeout: Duration::from_secs(60),
            transcripts_dir: std::env::temp_dir().join("video-transcripts"),
        }
    }
}

impl YtDlpConfig {
    /// Create config from environment variables, falling back to defaults
    ///
    /// `YT_DLP_BIN`, `YT_COOKIE_BROWSER` (empty disables cookies),
    /// `YT_DLP_TIMEOUT_SECS`, `VIDEO_TRANSCRIPTS_DIR`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(binary) = std::env::var("YT_DLP_BIN") {
            config.binary = PathBuf::from(binary);
        }
        if let Ok(browser) = std::env::var("YT_COOKIE_BROWSER") {
            config.cookie_browser = (!browser.trim().is_empty()).then(|| browser.trim().to_string());
        }
        if let Ok(secs) = std::env::var("YT_DLP_TIMEOUT_SECS") {
            match parse_timeout(&secs) {
                Some(timeout) => config.timeout = timeout,
                None => warn!("Ignoring invalid YT_DLP_TIMEOUT_SECS={:?}", secs),
            }
        }
        if let Ok(dir) = std::env::var("VIDEO_TRANSCRIPTS_DIR") {
            config.transcripts_dir = PathBuf::from(dir);
        }

        config
    }
}

/// A transcript downloaded and flattened from auto-generated subtitles
#[derive(Debug, Clone, Serialize)]
pub struct FetchedTranscript {
    pub video_id: String,
    pub url: String,
    pub transcript: String,
    pub word_count: usize,
    pub auto_cleaned: bool,
}

/// Runs yt-dlp and normalizes what it prints
///
/// Holds no mutable state; concurrent calls are independent. Callers are
/// responsible for limiting how many run at once.
pub struct YtDlpClient {
    config: YtDlpConfig,
}

impl YtDlpClient {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &YtDlpConfig {
        &self.config
    }

    /// Search by keyword; `max_results` is capped at `MAX_SEARCH_RESULTS`
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        sort: SortOrder,
    ) -> Result<Vec<VideoMetadata>> {
        let max_results = max_results.min(MAX_SEARCH_RESULTS);
        info!("Searching YouTube for: {} (max={})", query, max_results);

        let videos = self
            .list(&search_url(query, max_results, sort), max_results)
            .await?;
        info!("Search '{}' returned {} results", query, videos.len());
        Ok(videos)
    }

    /// Recent uploads from a channel (`@handle`, id, or URL)
    pub async fn channel_videos(&self, channel: &str, max_results: usize) -> Result<Vec<VideoMetadata>> {
        let url = channel_url(channel);
        let videos = self.list(&url, max_results).await?;
        info!("Channel {} returned {} videos", url, videos.len());
        Ok(videos)
    }

    pub async fn playlist_videos(&self, playlist: &str, max_results: usize) -> Result<Vec<VideoMetadata>> {
        let videos = self.list(&playlist_url(playlist), max_results).await?;
        info!("Playlist returned {} videos", videos.len());
        Ok(videos)
    }

    pub async fn trending(
        &self,
        category: TrendingCategory,
        max_results: usize,
    ) -> Result<Vec<VideoMetadata>> {
        let videos = self.list(&trending_url(category), max_results).await?;
        info!("Trending '{}' returned {} videos", category.as_str(), videos.len());
        Ok(videos)
    }

    /// Full metadata for one video (URL or bare id)
    pub async fn video_metadata(&self, video: &str) -> Result<VideoMetadata> {
        let value = self.run_json(&video_url(video), 1).await?;
        let meta = normalize_single(&value).ok_or_else(|| YtDlpError::NotFound(video.to_string()))?;
        info!("Got info for: {}", meta.title);
        Ok(meta)
    }

    /// Download auto-generated subtitles and flatten them to text
    ///
    /// The subtitle files are removed once read.
    pub async fn fetch_transcript(
        &self,
        url: &str,
        language: &str,
        auto_clean: bool,
    ) -> Result<FetchedTranscript> {
        info!("Fetching transcript from {}", url);

        let video_id = extract_video_id(url).ok_or_else(|| YtDlpError::InvalidUrl(url.to_string()))?;
        let dir = &self.config.transcripts_dir;
        tokio::fs::create_dir_all(dir).await?;

        let template = dir.join(&video_id);
        let args = vec![
            "--write-auto-sub".to_string(),
            "--sub-lang".to_string(),
            language.to_string(),
            "--skip-download".to_string(),
            "--output".to_string(),
            template.to_string_lossy().into_owned(),
            url.to_string(),
        ];

        let output = self.run(&args).await?;
        if !output.status.success() {
            warn!(
                "yt-dlp returned {} while fetching subtitles: {}",
                output.status,
                stderr_excerpt(&output)
            );
        }

        let subtitle_files = find_subtitle_files(dir, &video_id).await?;
        let Some(first) = subtitle_files.first() else {
            return Err(YtDlpError::NoTranscript { video_id });
        };

        let vtt = tokio::fs::read_to_string(first).await;
        remove_files(&subtitle_files).await;

        let mut transcript = vtt_to_text(&vtt?);
        if auto_clean {
            transcript = clean_transcript(&transcript, &CleanConfig::default()).text;
        }

        info!("Fetched transcript ({} chars)", transcript.chars().count());

        Ok(FetchedTranscript {
            word_count: transcript.split_whitespace().count(),
            video_id,
            url: url.to_string(),
            transcript,
            auto_cleaned: auto_clean,
        })
    }

    async fn list(&self, url: &str, max_results: usize) -> Result<Vec<VideoMetadata>> {
        let value = self.run_json(url, max_results).await?;
        let list: RawEntryList = serde_json::from_value(value)?;
        Ok(normalize_entries(&list))
    }

    /// Run yt-dlp in metadata-only JSON mode and parse its stdout
    ///
    /// A non-zero exit that still printed output is logged and parsed, since
    /// `--ignore-errors` reports partial playlists that way.
    pub async fn run_json(&self, url: &str, max_results: usize) -> Result<Value> {
        let mut args: Vec<String> = [
            url,
            "-J",
            "--flat-playlist",
            "--extractor-args",
            "youtubetab:approximate_date",
            "--playlist-start",
            "1",
            "--playlist-end",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(max_results.to_string());
        args.push("--no-warnings".to_string());
        args.push("--ignore-errors".to_string());

        if let Some(browser) = &self.config.cookie_browser {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.clone());
        }

        info!("Running yt-dlp: {}...", args[..args.len().min(5)].join(" "));

        let output = self.run(&args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let excerpt = stderr_excerpt(&output);
            if stdout.trim().is_empty() {
                error!("yt-dlp returned {}: {}", output.status, excerpt);
                return Err(YtDlpError::NonZeroExit {
                    code: output.status.code().unwrap_or(-1),
                    stderr: excerpt,
                });
            }
            warn!("yt-dlp returned {}: {}", output.status, excerpt);
        }

        if stdout.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        serde_json::from_str(&stdout).map_err(|e| {
            error!("Failed to parse yt-dlp JSON output: {}", e);
            YtDlpError::InvalidJson(e)
        })
    }

    async fn run(&self, args: &[String]) -> Result<Output> {
        debug!("Spawning {:?} with {} args", self.config.binary, args.len());

        let child = Command::new(&self.config.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| YtDlpError::Spawn {
                binary: self.config.binary.display().to_string(),
                source,
            })?;

        // Dropping the future on timeout drops the child, which kills it
        match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => {
                let secs = self.config.timeout.as_secs();
                error!("yt-dlp timed out after {} seconds", secs);
                Err(YtDlpError::Timeout { secs })
            }
        }
    }
}

/// `<id>.*.vtt` files in `dir`, sorted by name
async fn find_subtitle_files(dir: &Path, video_id: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{}.", video_id);
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&prefix) && name.ends_with(".vtt") {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Whole seconds, at least one
fn parse_timeout(secs: &str) -> Option<Duration> {
    secs.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

async fn remove_files(files: &[PathBuf]) {
    for file in files {
        if let Err(e) = tokio::fs::remove_file(file).await {
            warn!("Failed to remove {:?}: {}", file, e);
        }
    }
}

fn stderr_excerpt(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        "Unknown error".to_string()
    } else {
        stderr.chars().take(200).collect()
    }
}
