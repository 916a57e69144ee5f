//! Multi-provider translation with ordered fallback.
//!
//! Providers are tried in fixed priority order; the first success wins. A
//! provider failure is never retried, it just advances the chain. When every
//! provider fails, the caller gets a single aggregate error naming each one.

pub mod providers;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::TranslationConfig;
use crate::language::Language;
use crate::transcription::subtitles::Cue;

/// A single translation backend.
#[async_trait]
pub trait Translate: Send + Sync {
    /// Stable label used in aggregate error messages.
    fn label(&self) -> &'static str;

    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String>;
}

/// The ordered provider chain, plus the batching policy for whole caption
/// tracks.
pub struct TranslationService {
    providers: Vec<Box<dyn Translate>>,
    batch_size: usize,
    batch_delay: Duration,
}

impl TranslationService {
    /// Build the standard four-provider chain: Google web endpoint, the
    /// alternate Google endpoint, the deep-translator subprocess, then
    /// LibreTranslate.
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let providers: Vec<Box<dyn Translate>> = vec![
            Box::new(providers::GoogleWebTranslator::new(config)?),
            Box::new(providers::GoogleLegacyTranslator::new(config)?),
            Box::new(providers::DeepTranslatorBridge::new(config)),
            Box::new(providers::LibreTranslator::new(config)?),
        ];

        Ok(Self {
            providers,
            batch_size: config.batch_size,
            batch_delay: Duration::from_millis(config.batch_delay_ms),
        })
    }

    /// Build a chain from explicit providers.
    pub fn with_providers(
        providers: Vec<Box<dyn Translate>>,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            providers,
            batch_size,
            batch_delay,
        }
    }

    /// Translate one text through the chain.
    ///
    /// Identical source and target short-circuit without touching any
    /// provider.
    pub async fn translate_text(
        &self,
        text: &str,
        target: Language,
        source: Language,
    ) -> Result<String> {
        if source.code() == target.code() {
            return Ok(text.to_string());
        }

        let mut errors = Vec::new();
        for provider in &self.providers {
            match provider.translate(text, source, target).await {
                Ok(translated) => return Ok(translated),
                Err(e) => {
                    warn!("⚠️ {} failed: {}", provider.label(), e);
                    errors.push(format!("{}: {}", provider.label(), e));
                }
            }
        }

        Err(anyhow!(
            "all translation providers unavailable: {}",
            errors.join("; ")
        ))
    }

    /// Translate a whole caption track, five cues at a time with a pause
    /// between batches to stay under provider rate limits. Cues within a
    /// batch each run the full chain concurrently; any cue exhausting the
    /// chain fails the whole call.
    pub async fn translate_cues(
        &self,
        cues: &[Cue],
        target: Language,
        source: Language,
    ) -> Result<Vec<Cue>> {
        info!("🌐 Translating {} cues to {}", cues.len(), target);

        let mut translated = Vec::with_capacity(cues.len());
        let mut batches = cues.chunks(self.batch_size).peekable();

        while let Some(batch) = batches.next() {
            let results = try_join_all(batch.iter().map(|cue| async move {
                let text = self.translate_text(&cue.text, target, source).await?;
                Ok::<Cue, anyhow::Error>(Cue {
                    start: cue.start,
                    end: cue.end,
                    text,
                })
            }))
            .await?;
            translated.extend(results);

            if batches.peek().is_some() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        info!("✅ Translation to {} completed", target);
        Ok(translated)
    }
}
