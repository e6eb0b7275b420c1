use thiserror::Error;

/// Failures from running the download tool
///
/// Each class is a separate variant so callers can tell a timeout from a
/// parse failure or a missing video.
#[derive(Error, Debug)]
pub enum YtDlpError {
    #[error("Failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("yt-dlp timed out after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("yt-dlp exited with status {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Invalid response from yt-dlp: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("No transcript found for {video_id} (video may not have captions)")]
    NoTranscript { video_id: String },

    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, YtDlpError>;
