//! yt-dlp adapter: video metadata, audio-only extraction, and full video
//! download into the temp directory, plus temp-file housekeeping.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{DownloaderConfig, StorageConfig};

/// Metadata for one video, fetched fresh per request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDescriptor {
    pub video_id: String,
    pub title: String,
    /// Duration in seconds.
    pub duration: u64,
    pub thumbnail: Option<String>,
    pub author: Option<String>,
    pub description: String,
    pub is_private: bool,
    pub is_live_content: bool,
}

/// A media file materialized in the temp directory, owned by the request
/// that created it.
#[derive(Debug, Clone)]
pub struct DownloadedMedia {
    pub id: String,
    pub path: PathBuf,
}

pub struct Downloader {
    config: DownloaderConfig,
    storage: StorageConfig,
}

impl Downloader {
    pub fn new(config: DownloaderConfig, storage: StorageConfig) -> Self {
        Self { config, storage }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.storage.temp_dir
    }

    /// Fetch video metadata via `yt-dlp --dump-json`.
    pub async fn video_info(&self, url: &str) -> Result<VideoDescriptor> {
        info!("📹 Getting video information");

        let output = Command::new(&self.config.yt_dlp_bin)
            .args(["--dump-json", "--no-warnings", url])
            .output()
            .await
            .map_err(|e| {
                anyhow!("download failed: could not run {}: {}", self.config.yt_dlp_bin, e)
            })?;

        if !output.status.success() {
            return Err(anyhow!(
                "download failed: yt-dlp exited with {}: {}",
                output.status,
                stderr_without_warnings(&output.stderr)
            ));
        }

        let info: Value = serde_json::from_slice(&output.stdout)
            .context("download failed: unparsable yt-dlp metadata")?;

        Ok(descriptor_from_dump(&info))
    }

    /// Download and extract best-quality audio as `<uuid>.mp3`.
    pub async fn download_audio(&self, url: &str) -> Result<DownloadedMedia> {
        let id = Uuid::new_v4().to_string();
        let audio_path = self.storage.temp_dir.join(format!("{id}.mp3"));
        let template = self.storage.temp_dir.join(format!("{id}.%(ext)s"));

        info!("🎵 Downloading audio with yt-dlp");

        let mut command = Command::new(&self.config.yt_dlp_bin);
        command.args([
            "-f",
            "bestaudio",
            "-x",
            "--audio-format",
            "mp3",
            "--audio-quality",
            "0",
        ]);
        if let Some(ffmpeg) = &self.config.ffmpeg_location {
            command.args(["--ffmpeg-location", ffmpeg]);
        }
        command
            .arg("-o")
            .arg(&template)
            .args(["--no-warnings", "--no-playlist", url]);

        self.run_download(command).await?;

        if !audio_path.exists() {
            // yt-dlp may keep a different extension; adopt whatever file
            // shares our id stem.
            self.adopt_stray_output(&id, &audio_path).await?;
        }

        info!("✅ Audio download completed");
        Ok(DownloadedMedia { id, path: audio_path })
    }

    /// Download the full video as `<uuid>.mp4` for local playback.
    pub async fn download_video(&self, url: &str) -> Result<DownloadedMedia> {
        let id = Uuid::new_v4().to_string();
        let video_path = self.storage.temp_dir.join(format!("{id}.mp4"));

        info!("🎬 Downloading video with yt-dlp");

        let mut command = Command::new(&self.config.yt_dlp_bin);
        command.args(["-f", "best[ext=mp4]/best", "--merge-output-format", "mp4"]);
        if let Some(ffmpeg) = &self.config.ffmpeg_location {
            command.args(["--ffmpeg-location", ffmpeg]);
        }
        command
            .arg("-o")
            .arg(&video_path)
            .args(["--no-warnings", "--no-playlist", url]);

        self.run_download(command).await?;

        if !video_path.exists() {
            return Err(anyhow!("download failed: video file not found after download"));
        }

        info!("✅ Video download completed");
        Ok(DownloadedMedia { id, path: video_path })
    }

    async fn run_download(&self, mut command: Command) -> Result<()> {
        let output = command.output().await.map_err(|e| {
            anyhow!("download failed: could not run {}: {}", self.config.yt_dlp_bin, e)
        })?;

        if !output.status.success() {
            return Err(anyhow!(
                "download failed: yt-dlp exited with {}: {}",
                output.status,
                stderr_without_warnings(&output.stderr)
            ));
        }
        Ok(())
    }

    async fn adopt_stray_output(&self, id: &str, expected: &Path) -> Result<()> {
        let mut entries = tokio::fs::read_dir(&self.storage.temp_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(id) && entry.path() != expected {
                tokio::fs::rename(entry.path(), expected).await?;
                return Ok(());
            }
        }
        Err(anyhow!("download failed: audio file not found after download"))
    }

    /// Best-effort removal of a temp file. Never fails the request.
    pub async fn cleanup_file(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!("🗑️ Cleaned up {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to clean up {}: {}", path.display(), e),
        }
    }

    /// Delete temp files older than the retention window. Returns how many
    /// files were removed. Runs uncoordinated with in-flight requests: a
    /// file still being served to a very slow client can be swept.
    pub async fn sweep_stale(&self) -> Result<usize> {
        let max_age = Duration::from_secs(self.storage.retention_secs);
        let now = SystemTime::now();
        let mut removed = 0;

        let mut entries = tokio::fs::read_dir(&self.storage.temp_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            if now.duration_since(modified).map_or(false, |age| age > max_age) {
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => {
                        debug!("🗑️ Removed stale file {}", entry.path().display());
                        removed += 1;
                    }
                    Err(e) => {
                        warn!("Failed to remove stale file {}: {}", entry.path().display(), e);
                    }
                }
            }
        }

        Ok(removed)
    }
}

fn descriptor_from_dump(info: &Value) -> VideoDescriptor {
    VideoDescriptor {
        video_id: info["id"].as_str().unwrap_or_default().to_string(),
        title: info["title"].as_str().unwrap_or_default().to_string(),
        duration: info["duration"].as_u64().unwrap_or(0),
        thumbnail: info["thumbnail"]
            .as_str()
            .map(str::to_string)
            .or_else(|| {
                info["thumbnails"]
                    .as_array()
                    .and_then(|thumbs| thumbs.last())
                    .and_then(|thumb| thumb["url"].as_str())
                    .map(str::to_string)
            }),
        author: info["uploader"]
            .as_str()
            .or_else(|| info["channel"].as_str())
            .map(str::to_string),
        description: info["description"].as_str().unwrap_or_default().to_string(),
        is_private: info["availability"].as_str() == Some("private"),
        is_live_content: info["is_live"].as_bool().unwrap_or(false),
    }
}

fn stderr_without_warnings(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .filter(|line| !line.contains("WARNING"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn downloader_with_temp_dir(dir: &Path) -> Downloader {
        let config = Config::default();
        let mut storage = config.storage.clone();
        storage.temp_dir = dir.to_path_buf();
        Downloader::new(config.downloader.clone(), storage)
    }

    #[test]
    fn test_descriptor_from_full_dump() {
        let dump = serde_json::json!({
            "id": "dQw4w9WgXcQ",
            "title": "Test Video",
            "duration": 212,
            "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hq720.jpg",
            "uploader": "Test Channel",
            "description": "A test",
            "availability": "public",
            "is_live": false
        });
        let descriptor = descriptor_from_dump(&dump);

        assert_eq!(descriptor.video_id, "dQw4w9WgXcQ");
        assert_eq!(descriptor.title, "Test Video");
        assert_eq!(descriptor.duration, 212);
        assert_eq!(
            descriptor.thumbnail.as_deref(),
            Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hq720.jpg")
        );
        assert_eq!(descriptor.author.as_deref(), Some("Test Channel"));
        assert!(!descriptor.is_private);
        assert!(!descriptor.is_live_content);
    }

    #[test]
    fn test_descriptor_falls_back_to_thumbnail_list_and_channel() {
        let dump = serde_json::json!({
            "id": "abc",
            "title": "No top-level thumbnail",
            "thumbnails": [
                {"url": "https://low.jpg"},
                {"url": "https://best.jpg"}
            ],
            "channel": "Fallback Channel",
            "availability": "private",
            "is_live": true
        });
        let descriptor = descriptor_from_dump(&dump);

        assert_eq!(descriptor.thumbnail.as_deref(), Some("https://best.jpg"));
        assert_eq!(descriptor.author.as_deref(), Some("Fallback Channel"));
        assert_eq!(descriptor.duration, 0);
        assert!(descriptor.is_private);
        assert!(descriptor.is_live_content);
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let dump = serde_json::json!({"id": "abc", "title": "t"});
        let json = serde_json::to_value(descriptor_from_dump(&dump)).unwrap();

        assert_eq!(json["videoId"], "abc");
        assert!(json.get("isPrivate").is_some());
        assert!(json.get("isLiveContent").is_some());
        assert!(json.get("is_private").is_none());
    }

    #[test]
    fn test_stderr_warning_lines_are_dropped() {
        let stderr = b"WARNING: unable to verify\nERROR: video unavailable\n";
        assert_eq!(stderr_without_warnings(stderr), "ERROR: video unavailable");
    }

    #[tokio::test]
    async fn test_cleanup_missing_file_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = downloader_with_temp_dir(dir.path());

        downloader.cleanup_file(&dir.path().join("nope.mp3")).await;
    }

    #[tokio::test]
    async fn test_cleanup_removes_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = downloader_with_temp_dir(dir.path());
        let file = dir.path().join("media.mp3");
        tokio::fs::write(&file, b"data").await.unwrap();

        downloader.cleanup_file(&file).await;
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_sweep_leaves_fresh_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = downloader_with_temp_dir(dir.path());
        tokio::fs::write(dir.path().join("fresh.vtt"), b"WEBVTT\n\n")
            .await
            .unwrap();

        let removed = downloader.sweep_stale().await.unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("fresh.vtt").exists());
    }
}
