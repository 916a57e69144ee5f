//! Speech-to-text adapter for the AssemblyAI v2 API.
//!
//! Upload the audio file, create a transcription job, then poll the job on a
//! fixed interval until it reaches a terminal state.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::{TranscriptionOutput, Word};
use crate::config::TranscriptionConfig;
use crate::language::Language;

pub struct AssemblyAiTranscriber {
    config: TranscriptionConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TranscriptRequest {
    audio_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_detection: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptCreated {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptStatus {
    status: String,
    text: Option<String>,
    words: Option<Vec<Word>>,
    error: Option<String>,
}

impl AssemblyAiTranscriber {
    pub fn new(config: TranscriptionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// The key is checked when transcription is attempted, not at startup,
    /// so the rest of the service stays usable without one.
    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("AssemblyAI API key is not configured"))
    }

    /// Upload a local audio file, returning the provider-side URL.
    async fn upload_audio(&self, audio_path: &Path) -> Result<String> {
        let audio_data = tokio::fs::read(audio_path).await?;

        let response = self
            .client
            .post(format!("{}/upload", self.config.api_endpoint))
            .header("authorization", self.api_key()?)
            .header("content-type", "application/octet-stream")
            .body(audio_data)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("audio upload failed {}: {}", status, text));
        }

        let upload: UploadResponse = response.json().await?;
        Ok(upload.upload_url)
    }

    /// Create a transcription job. A non-English hint is passed as an
    /// explicit language code; English falls back to automatic detection.
    async fn request_transcript(&self, audio_url: String, source: Language) -> Result<String> {
        let request = if source == Language::English {
            TranscriptRequest {
                audio_url,
                language_code: None,
                language_detection: Some(true),
            }
        } else {
            TranscriptRequest {
                audio_url,
                language_code: Some(source.code()),
                language_detection: None,
            }
        };

        let response = self
            .client
            .post(format!("{}/transcript", self.config.api_endpoint))
            .header("authorization", self.api_key()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("transcription request failed {}: {}", status, text));
        }

        let created: TranscriptCreated = response.json().await?;
        Ok(created.id)
    }

    /// Poll the job until it completes or errors.
    async fn wait_for_transcript(&self, transcript_id: &str) -> Result<TranscriptStatus> {
        loop {
            let response = self
                .client
                .get(format!(
                    "{}/transcript/{}",
                    self.config.api_endpoint, transcript_id
                ))
                .header("authorization", self.api_key()?)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                return Err(anyhow!("transcript status check failed {}: {}", status, text));
            }

            let transcript: TranscriptStatus = response.json().await?;
            match transcript.status.as_str() {
                "completed" => return Ok(transcript),
                "error" => {
                    return Err(anyhow!(
                        "transcription failed: {}",
                        transcript
                            .error
                            .unwrap_or_else(|| "unknown provider error".to_string())
                    ));
                }
                _ => {
                    debug!("Transcript {} still {}", transcript_id, transcript.status);
                    tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
                }
            }
        }
    }

    /// Full pipeline: upload, create the job, poll to completion.
    pub async fn transcribe(
        &self,
        audio_path: &Path,
        source: Language,
    ) -> Result<TranscriptionOutput> {
        info!("📤 Uploading audio to AssemblyAI");
        let audio_url = self.upload_audio(audio_path).await?;

        info!("🎙️ Requesting transcription for {} audio", source);
        let transcript_id = self.request_transcript(audio_url, source).await?;

        info!("⏳ Waiting for transcription to complete");
        let transcript = self.wait_for_transcript(&transcript_id).await?;
        info!("✅ Transcription completed");

        Ok(TranscriptionOutput {
            full_text: transcript.text.unwrap_or_default(),
            words: transcript.words.unwrap_or_default(),
        })
    }
}
