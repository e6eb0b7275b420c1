use crate::models::watch_url;

const YOUTUBE: &str = "https://youtube.com";

/// Sort order for keyword search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    #[default]
    Relevance,
    Date,
    ViewCount,
    Rating,
}

impl SortOrder {
    /// YouTube's `sp` filter value, URL-encoded
    fn filter_code(self) -> Option<&'static str> {
        match self {
            Self::Relevance => None,
            Self::Date => Some("CAI%3D"),
            Self::ViewCount => Some("CAM%3D"),
            Self::Rating => Some("CAE%3D"),
        }
    }
}

/// Trending feed category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TrendingCategory {
    #[default]
    Now,
    Music,
    Gaming,
    Movies,
}

impl TrendingCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::Music => "music",
            Self::Gaming => "gaming",
            Self::Movies => "movies",
        }
    }

    fn path(self) -> &'static str {
        match self {
            Self::Now => "trending",
            Self::Music => "feed/trending?bp=4gINGgt5dG1hX2NoYXJ0cw%3D%3D",
            Self::Gaming => "gaming",
            Self::Movies => "feed/trending?bp=4gIcGhpnYW1pbmdfY29ycHVzX21vc3RfcG9wdWxhcg%3D%3D",
        }
    }
}

/// Extract the video id from a `youtu.be/` or `youtube.com/watch` URL
///
/// The scheme is not checked. Returns `None` for anything else, including
/// watch URLs without a `v` parameter.
pub fn extract_video_id(url: &str) -> Option<String> {
    if let Some((_, rest)) = url.split_once("youtu.be/") {
        let id = rest.split('?').next().unwrap_or("");
        return (!id.is_empty()).then(|| id.to_string());
    }

    if url.contains("youtube.com/watch") {
        let query = url.split_once('?')?.1;
        let query = query.split('#').next().unwrap_or("");
        return url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, value)| key == "v" && !value.is_empty())
            .map(|(_, value)| value.into_owned());
    }

    None
}

/// Search target for yt-dlp
///
/// Relevance uses the `ytsearchN:` prefix; other orders go through the
/// results page with a sort filter.
pub fn search_url(query: &str, max_results: usize, sort: SortOrder) -> String {
    match sort.filter_code() {
        None => format!("ytsearch{}:{}", max_results, query),
        Some(code) => format!(
            "{}/results?search_query={}&sp={}",
            YOUTUBE,
            urlencoding::encode(query),
            code
        ),
    }
}

/// Accepts `@handle`, a bare channel id, or a channel URL
pub fn channel_url(channel: &str) -> String {
    if !channel.starts_with("http") {
        if channel.starts_with('@') {
            format!("{}/{}/videos", YOUTUBE, channel)
        } else {
            format!("{}/channel/{}/videos", YOUTUBE, channel)
        }
    } else if !channel.contains("/videos") {
        format!("{}/videos", channel.trim_end_matches('/'))
    } else {
        channel.to_string()
    }
}

/// Accepts a playlist URL or a bare playlist id
pub fn playlist_url(playlist: &str) -> String {
    if playlist.starts_with("http") {
        playlist.to_string()
    } else {
        format!("{}/playlist?list={}", YOUTUBE, playlist)
    }
}

pub fn trending_url(category: TrendingCategory) -> String {
    format!("{}/{}", YOUTUBE, category.path())
}

/// Accepts a video URL or a bare video id
pub fn video_url(video: &str) -> String {
    if video.starts_with("http") {
        video.to_string()
    } else {
        watch_url(video)
    }
}
