//! YouTube URL parsing and validation.

use regex::Regex;
use std::sync::LazyLock;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
        .expect("URL pattern compiles")
});

static BARE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_-]{11})$").expect("id pattern compiles"));

/// Extract the video id from a YouTube URL (watch, short, or embed form),
/// or from a bare 11-character id.
pub fn parse_video_id(url: &str) -> Option<&str> {
    if let Some(caps) = URL_PATTERN.captures(url) {
        return caps.get(1).map(|m| m.as_str());
    }
    BARE_ID_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn is_valid_youtube_url(url: &str) -> bool {
    parse_video_id(url).is_some()
}
