//! Request and response types for the video API.

use serde::{Deserialize, Serialize};

use crate::transcription::subtitles::Cue;

/// Envelope every successful route responds with.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSubtitlesRequest {
    pub url: Option<String>,
    /// Target language; defaults to English (no translation).
    pub language: Option<String>,
    /// Spoken language of the video; defaults to English.
    pub source_language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateSubtitlesRequest {
    pub subtitles: Option<Vec<Cue>>,
    pub target_language: Option<String>,
    pub source_language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSubtitles {
    pub video_id: String,
    pub title: String,
    pub language: String,
    pub subtitle_url: String,
    pub subtitle_count: usize,
    pub transcription: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalGeneratedSubtitles {
    pub video_id: String,
    pub title: String,
    pub language: String,
    pub subtitle_url: String,
    pub video_url: String,
    pub subtitle_count: usize,
    pub transcription: String,
    /// Set when translation failed and the source-language track was
    /// served instead.
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedSubtitles {
    pub language: String,
    pub subtitles: Vec<Cue>,
    pub subtitle_url: String,
    pub subtitle_count: usize,
}

#[derive(Debug, Serialize)]
pub struct LanguageEntry {
    pub code: &'static str,
    pub name: &'static str,
}
