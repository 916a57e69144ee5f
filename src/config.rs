use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the TubeScribe service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// yt-dlp settings
    pub downloader: DownloaderConfig,

    /// Speech-to-text provider settings
    pub transcription: TranscriptionConfig,

    /// Translation chain settings
    pub translation: TranslationConfig,

    /// Temp-file storage settings
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the HTTP API listens on
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// yt-dlp binary, resolved through PATH by default
    pub yt_dlp_bin: String,

    /// Directory passed to yt-dlp via --ffmpeg-location, if set
    pub ffmpeg_location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// AssemblyAI API base URL
    pub api_endpoint: String,

    /// API key; falls back to ASSEMBLYAI_API_KEY from the environment
    pub api_key: Option<String>,

    /// Seconds between transcript status polls
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds (covers the audio upload)
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// LibreTranslate base URL
    pub libretranslate_url: String,

    /// Optional LibreTranslate API key
    pub libretranslate_api_key: Option<String>,

    /// Interpreter for the deep-translator helper script
    pub python_bin: String,

    /// Path to the deep-translator helper script
    pub deep_translator_script: PathBuf,

    /// Cues translated concurrently per batch
    pub batch_size: usize,

    /// Pause between batches in milliseconds
    pub batch_delay_ms: u64,

    /// Per-provider timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for downloaded media and generated subtitle files
    pub temp_dir: PathBuf,

    /// Age after which the sweep deletes a temp file, in seconds
    pub retention_secs: u64,

    /// Interval between sweeps, in seconds
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Load configuration from the first parseable file, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let config_paths = ["tubescribe.toml", "config/tubescribe.toml"];

        let mut config = Self::default();
        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(parsed) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config = parsed;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        config.apply_env();
        Ok(config)
    }

    /// Environment overrides for deployment-sensitive settings.
    pub fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(key) = std::env::var("ASSEMBLYAI_API_KEY") {
            self.transcription.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("LIBRETRANSLATE_URL") {
            self.translation.libretranslate_url = url;
        }
        if let Ok(key) = std::env::var("LIBRETRANSLATE_API_KEY") {
            self.translation.libretranslate_api_key = Some(key);
        }
        if let Ok(dir) = std::env::var("TUBESCRIBE_TEMP_DIR") {
            self.storage.temp_dir = PathBuf::from(dir);
        }
    }

    /// Validate configuration and create the temp directory if missing.
    pub fn validate(&self) -> Result<()> {
        if self.translation.batch_size == 0 {
            return Err(anyhow!("translation.batch_size must be greater than 0"));
        }

        if self.transcription.poll_interval_secs == 0 {
            return Err(anyhow!("transcription.poll_interval_secs must be greater than 0"));
        }

        if self.storage.sweep_interval_secs == 0 {
            return Err(anyhow!("storage.sweep_interval_secs must be greater than 0"));
        }

        if !self.storage.temp_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.storage.temp_dir) {
                return Err(anyhow!("Cannot create temp directory: {}", e));
            }
        }

        if self.transcription.api_key.is_none() {
            tracing::warn!("⚠️ AssemblyAI API key not found. Transcription will not work.");
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "TubeScribe Configuration:\n\
            - Port: {}\n\
            - yt-dlp: {}\n\
            - Transcription endpoint: {}\n\
            - AssemblyAI key: {}\n\
            - LibreTranslate: {}\n\
            - Temp directory: {}\n\
            - Retention: {}s",
            self.server.port,
            self.downloader.yt_dlp_bin,
            self.transcription.api_endpoint,
            if self.transcription.api_key.is_some() {
                "configured"
            } else {
                "missing"
            },
            self.translation.libretranslate_url,
            self.storage.temp_dir.display(),
            self.storage.retention_secs,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: 3001 },
            downloader: DownloaderConfig {
                yt_dlp_bin: "yt-dlp".to_string(),
                ffmpeg_location: None,
            },
            transcription: TranscriptionConfig {
                api_endpoint: "https://api.assemblyai.com/v2".to_string(),
                api_key: None,
                poll_interval_secs: 3,
                request_timeout_secs: 300, // audio uploads can be large
            },
            translation: TranslationConfig {
                libretranslate_url: "https://libretranslate.com".to_string(),
                libretranslate_api_key: None,
                python_bin: "python3".to_string(),
                deep_translator_script: PathBuf::from("scripts/deep_translator.py"),
                batch_size: 5,
                batch_delay_ms: 1000,
                request_timeout_secs: 10,
            },
            storage: StorageConfig {
                temp_dir: PathBuf::from("./temp"),
                retention_secs: 3600,
                sweep_interval_secs: 3600,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.transcription.poll_interval_secs, 3);
        assert_eq!(config.translation.batch_size, 5);
        assert_eq!(config.translation.batch_delay_ms, 1000);
        assert_eq!(config.storage.retention_secs, 3600);
    }

    #[test]
    fn test_validation_rejects_zero_batch_size() {
        let mut config = Config::default();
        config.translation.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_creates_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.temp_dir = dir.path().join("nested").join("temp");

        assert!(config.validate().is_ok());
        assert!(config.storage.temp_dir.exists());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.translation.batch_size, config.translation.batch_size);
    }
}
