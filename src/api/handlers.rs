//! Request handlers: per-route orchestration of the downloader,
//! transcriber, and translation chain.

use serde_json::Value;
use tracing::{error, info};

use super::error::ApiError;
use super::models::{
    GenerateSubtitlesRequest, GeneratedSubtitles, InfoRequest, LanguageEntry,
    LocalGeneratedSubtitles, TranslateSubtitlesRequest, TranslatedSubtitles,
};
use super::server::AppState;
use crate::download::{DownloadedMedia, VideoDescriptor};
use crate::language::Language;
use crate::transcription::subtitles::{build_cues, to_webvtt, Cue};
use crate::youtube;

/// Handle health check requests
pub async fn health_check() -> Value {
    serde_json::json!({
        "status": "ok",
        "service": "tubescribe",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
}

/// Validate the url field shared by the video routes.
fn required_url(url: &Option<String>) -> Result<&str, ApiError> {
    let url = url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::validation("Video URL is required"))?;

    if !youtube::is_valid_youtube_url(url) {
        return Err(ApiError::validation("Invalid YouTube URL"));
    }
    Ok(url)
}

/// Handle video metadata requests.
pub async fn video_info(state: &AppState, req: InfoRequest) -> Result<VideoDescriptor, ApiError> {
    let url = required_url(&req.url)?;

    let info = state.downloader.video_info(url).await?;

    if info.is_private {
        return Err(ApiError::forbidden("Video is private and cannot be accessed"));
    }
    if info.is_live_content {
        return Err(ApiError::validation("Live videos are not supported"));
    }

    Ok(info)
}

/// Generate a subtitle track for playback against the YouTube embed.
/// Translation failure here is a hard failure.
pub async fn generate_subtitles(
    state: &AppState,
    req: GenerateSubtitlesRequest,
) -> Result<GeneratedSubtitles, ApiError> {
    let url = required_url(&req.url)?;
    let language = Language::parse(req.language.as_deref().unwrap_or("english"));
    let source = Language::parse(req.source_language.as_deref().unwrap_or("english"));

    let info = state.downloader.video_info(url).await?;
    if info.is_private {
        return Err(ApiError::forbidden("Video is private and cannot be accessed"));
    }

    info!("🎵 Extracting audio from video");
    let audio = state.downloader.download_audio(url).await?;

    // The audio is only needed for transcription; remove it whether or not
    // the rest of the pipeline succeeds.
    let result = transcribe_and_translate(state, &audio, language, source, false).await;
    state.downloader.cleanup_file(&audio.path).await;
    let (cues, transcription, _warning) = result?;

    let subtitle_url = write_vtt(state, &audio.id, language, &cues).await?;

    Ok(GeneratedSubtitles {
        video_id: info.video_id,
        title: info.title,
        language: language.to_string(),
        subtitle_url,
        subtitle_count: cues.len(),
        transcription,
    })
}

/// Generate subtitles and download the full video for local playback.
/// Translation failure here is recovered: the source-language track is
/// served with a warning instead of failing the request.
pub async fn generate_subtitles_local(
    state: &AppState,
    req: GenerateSubtitlesRequest,
) -> Result<LocalGeneratedSubtitles, ApiError> {
    let url = required_url(&req.url)?;
    let language = Language::parse(req.language.as_deref().unwrap_or("english"));
    let source = Language::parse(req.source_language.as_deref().unwrap_or("english"));

    let info = state.downloader.video_info(url).await?;
    if info.is_private {
        return Err(ApiError::forbidden("Video is private and cannot be accessed"));
    }

    info!("🎬 Downloading video for local playback");
    let video = state.downloader.download_video(url).await?;

    let result = async {
        info!("🎵 Extracting audio for transcription");
        let audio = state.downloader.download_audio(url).await?;

        let out = transcribe_and_translate(state, &audio, language, source, true).await;
        state.downloader.cleanup_file(&audio.path).await;
        let (cues, transcription, warning) = out?;

        let subtitle_url = write_vtt(state, &audio.id, language, &cues).await?;
        Ok::<_, ApiError>((cues.len(), transcription, warning, subtitle_url))
    }
    .await;

    let (subtitle_count, transcription, warning, subtitle_url) = match result {
        Ok(parts) => parts,
        Err(e) => {
            state.downloader.cleanup_file(&video.path).await;
            return Err(e);
        }
    };

    let video_file = video
        .path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("{}.mp4", video.id));

    Ok(LocalGeneratedSubtitles {
        video_id: info.video_id,
        title: info.title,
        language: language.to_string(),
        subtitle_url,
        video_url: format!("/videos/{}", video_file),
        subtitle_count,
        transcription,
        warning,
    })
}

/// Re-translate an existing subtitle track.
pub async fn translate_subtitles(
    state: &AppState,
    req: TranslateSubtitlesRequest,
) -> Result<TranslatedSubtitles, ApiError> {
    let subtitles = req
        .subtitles
        .ok_or_else(|| ApiError::validation("Subtitles array is required"))?;
    let target = req
        .target_language
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Target language is required"))?;
    let target = Language::parse(target);
    let source = Language::parse(req.source_language.as_deref().unwrap_or("english"));

    let translated = state
        .translator
        .translate_cues(&subtitles, target, source)
        .await?;

    let file_name = format!(
        "translated_{}_{}.vtt",
        chrono::Utc::now().timestamp_millis(),
        target
    );
    let subtitle_url = write_vtt_file(state, &file_name, &translated).await?;

    Ok(TranslatedSubtitles {
        language: target.to_string(),
        subtitle_url,
        subtitle_count: translated.len(),
        subtitles: translated,
    })
}

/// The fixed language list served by `GET /api/video/languages`.
pub fn available_languages() -> Vec<LanguageEntry> {
    Language::all()
        .iter()
        .map(|language| LanguageEntry {
            code: language.code(),
            name: language.name(),
        })
        .collect()
}

/// Transcribe the downloaded audio, build cues, and translate them when the
/// target differs from the source. With `recover` set, an exhausted
/// translation chain falls back to the source-language cues and a warning.
async fn transcribe_and_translate(
    state: &AppState,
    audio: &DownloadedMedia,
    language: Language,
    source: Language,
    recover: bool,
) -> Result<(Vec<Cue>, String, Option<String>), ApiError> {
    info!("🎙️ Transcribing audio");
    let transcript = state.transcriber.transcribe(&audio.path, source).await?;
    let cues = build_cues(&transcript.words);

    if language.code() == source.code() {
        return Ok((cues, transcript.full_text, None));
    }

    info!("🌐 Translating to {}", language);
    match state.translator.translate_cues(&cues, language, source).await {
        Ok(translated) => Ok((translated, transcript.full_text, None)),
        Err(e) if recover => {
            error!("⚠️ Translation failed: {}", e);
            info!("📝 Using {} subtitles as fallback", source.name());
            let warning = format!(
                "Translation to {} failed. Showing {} subtitles instead.",
                language,
                source.name()
            );
            Ok((cues, transcript.full_text, Some(warning)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Write a cue track as `<id>_<language>.vtt` in the temp dir and return
/// its public URL.
async fn write_vtt(
    state: &AppState,
    id: &str,
    language: Language,
    cues: &[Cue],
) -> Result<String, ApiError> {
    write_vtt_file(state, &format!("{}_{}.vtt", id, language), cues).await
}

async fn write_vtt_file(state: &AppState, file_name: &str, cues: &[Cue]) -> Result<String, ApiError> {
    let path = state.downloader.temp_dir().join(file_name);
    tokio::fs::write(&path, to_webvtt(cues))
        .await
        .map_err(|e| anyhow::anyhow!("failed to write subtitle file: {}", e))?;

    Ok(format!("/subtitles/{}", file_name))
}
