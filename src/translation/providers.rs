//! The four translation backends, in chain priority order.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::Translate;
use crate::config::TranslationConfig;
use crate::language::Language;

/// Primary provider: the free Google web endpoint.
pub struct GoogleWebTranslator {
    client: reqwest::Client,
}

impl GoogleWebTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Translate for GoogleWebTranslator {
    fn label(&self) -> &'static str {
        "google"
    }

    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String> {
        let response = self
            .client
            .get("https://translate.googleapis.com/translate_a/single")
            .query(&[
                ("client", "gtx"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("google translate error {}: {}", status, body));
        }

        // Nested-array payload; segment texts live at [0][i][0].
        let payload: Value = response.json().await?;
        let segments = payload
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("unexpected google translate response shape"))?;

        let translated: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        if translated.is_empty() {
            return Err(anyhow!("google translate returned no segments"));
        }
        Ok(translated)
    }
}

/// Second provider: the older Google endpoint with a different request
/// shape (form POST, `dj=1` object payload).
pub struct GoogleLegacyTranslator {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct LegacyResponse {
    sentences: Vec<LegacySentence>,
}

#[derive(Debug, Deserialize)]
struct LegacySentence {
    #[serde(default)]
    trans: String,
}

impl GoogleLegacyTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Translate for GoogleLegacyTranslator {
    fn label(&self) -> &'static str {
        "google-alt"
    }

    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String> {
        let response = self
            .client
            .post("https://translate.google.com/translate_a/single?client=at&dt=t&dj=1")
            .form(&[
                ("sl", source.code()),
                ("tl", target.code()),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("google translate (alt) error {}: {}", status, body));
        }

        let payload: LegacyResponse = response.json().await?;
        let translated: String = payload
            .sentences
            .iter()
            .map(|sentence| sentence.trans.as_str())
            .collect();

        if translated.is_empty() {
            return Err(anyhow!("google translate (alt) returned no sentences"));
        }
        Ok(translated)
    }
}

/// Third provider: the Python deep-translator library behind a subprocess.
///
/// The helper script takes `<text> <source> <target>` and prints a single
/// JSON object (`{"success": true, "translation": ...}` or
/// `{"success": false, "error": ...}`) on stdout.
pub struct DeepTranslatorBridge {
    python_bin: String,
    script: PathBuf,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct BridgeOutput {
    success: bool,
    #[serde(default)]
    translation: String,
    #[serde(default)]
    error: Option<String>,
}

impl DeepTranslatorBridge {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            python_bin: config.python_bin.clone(),
            script: config.deep_translator_script.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl Translate for DeepTranslatorBridge {
    fn label(&self) -> &'static str {
        "deep-translator"
    }

    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String> {
        debug!("🐍 Running deep-translator for {} -> {}", source, target);

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.python_bin)
                .arg(&self.script)
                .arg(text)
                .arg(source.code())
                .arg(target.code())
                .output(),
        )
        .await
        .map_err(|_| anyhow!("deep-translator timed out after {:?}", self.timeout))?
        .with_context(|| format!("could not run {}", self.python_bin))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "deep-translator exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed: BridgeOutput =
            serde_json::from_str(stdout.trim()).context("unparsable deep-translator output")?;

        if !parsed.success {
            return Err(anyhow!(
                "{}",
                parsed
                    .error
                    .unwrap_or_else(|| "unknown deep-translator error".to_string())
            ));
        }
        Ok(parsed.translation)
    }
}

/// Final fallback: a self-hosted or hosted LibreTranslate instance.
pub struct LibreTranslator {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'static str,
    target: &'static str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LibreResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl LibreTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.libretranslate_url.trim_end_matches('/').to_string(),
            api_key: config.libretranslate_api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl Translate for LibreTranslator {
    fn label(&self) -> &'static str {
        "libretranslate"
    }

    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String> {
        let request = LibreRequest {
            q: text,
            source: source.code(),
            target: target.code(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("libretranslate error {}: {}", status, body));
        }

        let payload: LibreResponse = response.json().await?;
        Ok(payload.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_libre_request_omits_missing_api_key() {
        let request = LibreRequest {
            q: "hello",
            source: "en",
            target: "es",
            format: "text",
            api_key: None,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["q"], "hello");
        assert_eq!(json["format"], "text");
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn test_bridge_output_parses_both_outcomes() {
        let ok: BridgeOutput =
            serde_json::from_str(r#"{"success": true, "translation": "hola"}"#).unwrap();
        assert!(ok.success);
        assert_eq!(ok.translation, "hola");

        let err: BridgeOutput =
            serde_json::from_str(r#"{"success": false, "error": "no internet"}"#).unwrap();
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("no internet"));
    }

    #[test]
    fn test_legacy_response_concatenates_sentences() {
        let payload: LegacyResponse = serde_json::from_str(
            r#"{"sentences": [{"trans": "Hola "}, {"trans": "mundo"}]}"#,
        )
        .unwrap();

        let translated: String = payload.sentences.iter().map(|s| s.trans.as_str()).collect();
        assert_eq!(translated, "Hola mundo");
    }
}
