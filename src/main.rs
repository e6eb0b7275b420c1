use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use transcript_miner::io::format_video_lines;
use transcript_miner::{
    analyze_transcript, clean_transcript, extract_concepts, extract_methodologies,
    read_transcript_file, segment_speakers, AnalysisConfig, CleanConfig, ConceptConfig,
    HumanReport, KnowledgeEntity, ListingSource, MethodologyConfig, SortOrder, ToolResponse,
    TrendingCategory, VideoInfo, VideoListing, VideoReference, YtDlpClient, YtDlpConfig,
};

#[derive(Parser)]
#[command(name = "transcript-miner")]
#[command(author, version, about = "Mine video transcripts for concepts, methods and speakers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Also write the JSON response to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Strip timestamps, repeats and bracketed annotations from a transcript
    Clean {
        /// Transcript file, or `-` for stdin
        input: PathBuf,

        /// Keep timestamp lines
        #[arg(long)]
        keep_timestamps: bool,

        /// Keep adjacent duplicate lines
        #[arg(long)]
        keep_duplicates: bool,
    },

    /// Extract recurring technical concepts
    Concepts {
        /// Transcript file, or `-` for stdin
        input: PathBuf,

        /// Minimum occurrences for a concept to be reported
        #[arg(long, default_value = "2")]
        min_frequency: usize,
    },

    /// Extract methodology statements and code examples
    Methodologies {
        /// Transcript file, or `-` for stdin
        input: PathBuf,

        /// Also collect code spans
        #[arg(long)]
        extract_code: bool,
    },

    /// Identify labeled speakers and their segments
    Speakers {
        /// Transcript file, or `-` for stdin
        input: PathBuf,
    },

    /// Run every analysis stage over a transcript
    Analyze {
        /// Transcript file, or `-` for stdin
        input: PathBuf,

        /// Output file for a human-readable report (text)
        #[arg(long)]
        human: Option<PathBuf>,

        /// Minimum occurrences for a concept to be reported
        #[arg(long, default_value = "2")]
        min_frequency: usize,

        /// Also collect code spans
        #[arg(long)]
        extract_code: bool,
    },

    /// Search YouTube by keyword
    Search {
        query: String,

        #[arg(short = 'n', long, default_value = "10")]
        max_results: usize,

        #[arg(long, value_enum, default_value_t = SortOrder::Relevance)]
        sort: SortOrder,
    },

    /// List recent uploads from a channel
    Channel {
        /// `@handle`, channel id, or channel URL
        channel: String,

        #[arg(short = 'n', long, default_value = "10")]
        max_results: usize,
    },

    /// List the videos of a playlist
    Playlist {
        /// Playlist id or URL
        playlist: String,

        #[arg(short = 'n', long, default_value = "20")]
        max_results: usize,
    },

    /// List trending videos
    Trending {
        #[arg(long, value_enum, default_value_t = TrendingCategory::Now)]
        category: TrendingCategory,

        #[arg(short = 'n', long, default_value = "10")]
        max_results: usize,
    },

    /// Show metadata for one video
    Info {
        /// Video id or URL
        video: String,
    },

    /// Download a video's auto-generated transcript
    Transcript {
        url: String,

        #[arg(long, default_value = "en")]
        language: String,

        /// Return the flattened subtitles without cleaning
        #[arg(long)]
        raw: bool,
    },

    /// Build a knowledge entity for a video
    Knowledge {
        /// JSON file describing the video (url, title, duration, word_count)
        #[arg(long)]
        video: PathBuf,

        /// Transcript to extract concepts and methodologies from
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Concept to record (repeatable)
        #[arg(long = "concept")]
        concepts: Vec<String>,

        /// Methodology to record (repeatable)
        #[arg(long = "methodology")]
        methodologies: Vec<String>,

        #[arg(long)]
        summary: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let (success, json) = match run(cli.command, cli.output.as_deref()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let response = ToolResponse::<()>::failure(format!("{:#}", e));
            (false, response.to_json_pretty().unwrap_or_default())
        }
    };

    println!("{}", json);
    if !success {
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Execute one command, returning whether it succeeded and its JSON envelope
async fn run(command: Commands, output: Option<&Path>) -> Result<(bool, String)> {
    match command {
        Commands::Clean {
            input,
            keep_timestamps,
            keep_duplicates,
        } => {
            let config = CleanConfig {
                remove_timestamps: !keep_timestamps,
                deduplicate: !keep_duplicates,
            };
            respond(output, load(&input).map(|raw| clean_transcript(&raw, &config)))
        }
        Commands::Concepts {
            input,
            min_frequency,
        } => {
            let config = ConceptConfig {
                min_frequency,
                ..Default::default()
            };
            respond(output, load_cleaned(&input).map(|text| extract_concepts(&text, &config)))
        }
        Commands::Methodologies {
            input,
            extract_code,
        } => {
            let config = MethodologyConfig {
                extract_code,
                ..Default::default()
            };
            respond(output, load_cleaned(&input).map(|text| extract_methodologies(&text, &config)))
        }
        Commands::Speakers { input } => respond(output, load(&input).map(|raw| segment_speakers(&raw))),
        Commands::Analyze {
            input,
            human,
            min_frequency,
            extract_code,
        } => respond(output, analyze(&input, human.as_deref(), min_frequency, extract_code)),
        Commands::Search {
            query,
            max_results,
            sort,
        } => {
            let result = client().search(&query, max_results, sort).await;
            respond(output, listing(ListingSource::Query(query), result))
        }
        Commands::Channel {
            channel,
            max_results,
        } => {
            let result = client().channel_videos(&channel, max_results).await;
            respond(output, listing(ListingSource::Channel(channel), result))
        }
        Commands::Playlist {
            playlist,
            max_results,
        } => {
            let result = client().playlist_videos(&playlist, max_results).await;
            respond(output, listing(ListingSource::Playlist(playlist), result))
        }
        Commands::Trending {
            category,
            max_results,
        } => {
            let result = client().trending(category, max_results).await;
            respond(output, listing(
                ListingSource::Category(category.as_str().to_string()),
                result,
            ))
        }
        Commands::Info { video } => {
            let result = client().video_metadata(&video).await;
            respond(output, result.map(|video| VideoInfo { video }).map_err(Into::into))
        }
        Commands::Transcript { url, language, raw } => {
            let result = client().fetch_transcript(&url, &language, !raw).await;
            respond(output, result.map_err(Into::into))
        }
        Commands::Knowledge {
            video,
            transcript,
            concepts,
            methodologies,
            summary,
        } => respond(output, knowledge(
            &video,
            transcript.as_deref(),
            concepts,
            methodologies,
            summary.as_deref(),
        )),
    }
}

fn respond<T: Serialize>(output: Option<&Path>, result: Result<T>) -> Result<(bool, String)> {
    let response = ToolResponse::from(result);
    if let Some(path) = output {
        response.write_json(path)?;
        info!("Response written to {:?}", path);
    }
    Ok((response.success, response.to_json_pretty()?))
}

fn client() -> YtDlpClient {
    YtDlpClient::new(YtDlpConfig::from_env())
}

fn load(input: &Path) -> Result<String> {
    info!("Loading transcript from {:?}", input);
    read_transcript_file(input)
}

fn load_cleaned(input: &Path) -> Result<String> {
    let raw = load(input)?;
    Ok(clean_transcript(&raw, &CleanConfig::default()).text)
}

fn listing(
    source: ListingSource,
    result: transcript_miner::ytdlp::error::Result<Vec<transcript_miner::VideoMetadata>>,
) -> Result<VideoListing> {
    let videos = result?;
    debug!("Videos:\n{}", format_video_lines(&videos));
    Ok(VideoListing::new(source, videos))
}

fn analyze(
    input: &Path,
    human: Option<&Path>,
    min_frequency: usize,
    extract_code: bool,
) -> Result<transcript_miner::TranscriptAnalysis> {
    let raw = load(input)?;
    let config = AnalysisConfig {
        concepts: ConceptConfig {
            min_frequency,
            ..Default::default()
        },
        methodologies: MethodologyConfig {
            extract_code,
            ..Default::default()
        },
        ..Default::default()
    };

    let analysis = analyze_transcript(&raw, &config);
    info!(
        "Analysis: {} words, {} concepts, {} methodologies, {} speakers",
        analysis.cleaned.word_count(),
        analysis.concepts.total_concepts,
        analysis.methodologies.total_methodologies,
        analysis.speakers.speaker_count
    );

    if let Some(path) = human {
        HumanReport::new(&analysis).write_file(path)?;
        info!("Human-readable report written to {:?}", path);
    }

    Ok(analysis)
}

fn knowledge(
    video: &Path,
    transcript: Option<&Path>,
    mut concepts: Vec<String>,
    mut methodologies: Vec<String>,
    summary: Option<&str>,
) -> Result<KnowledgeEntity> {
    let json = std::fs::read_to_string(video)
        .with_context(|| format!("Failed to read file: {:?}", video))?;
    let mut reference: VideoReference =
        serde_json::from_str(&json).context("Failed to parse video description")?;

    if let Some(path) = transcript {
        let analysis = analyze_transcript(&load(path)?, &AnalysisConfig::default());
        concepts.extend(analysis.concepts.concepts);
        methodologies.extend(analysis.methodologies.methodologies);
        reference
            .word_count
            .get_or_insert(analysis.cleaned.word_count() as u64);
    }

    Ok(KnowledgeEntity::build(
        &reference,
        &concepts,
        &methodologies,
        summary,
    ))
}
