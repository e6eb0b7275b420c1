pub mod io;
pub mod models;
pub mod stages;
pub mod ytdlp;

pub use io::{
    normalize_entries, normalize_single, parse_entries_json, parse_video_json,
    read_transcript_file, vtt_to_text, HumanReport, ListingSource, ToolResponse, VideoInfo,
    VideoListing,
};
pub use models::{KnowledgeEntity, RawVideoRecord, VideoMetadata, VideoReference};
pub use stages::{
    analyze_transcript, clean_transcript, extract_concepts, extract_methodologies,
    segment_speakers, AnalysisConfig, CleanConfig, ConceptConfig, MethodologyConfig,
    TranscriptAnalysis,
};
pub use ytdlp::{FetchedTranscript, SortOrder, TrendingCategory, YtDlpClient, YtDlpConfig, YtDlpError};
