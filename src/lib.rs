//! TubeScribe - YouTube subtitle generation and translation service.
//!
//! Downloads a video's audio through yt-dlp, transcribes it with AssemblyAI,
//! groups the word-level transcript into caption cues, optionally translates
//! the cues through a chain of translation providers, and serves the result
//! as WebVTT alongside the downloaded media.

pub mod api;
pub mod config;
pub mod download;
pub mod language;
pub mod transcription;
pub mod translation;
pub mod youtube;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::download::{DownloadedMedia, Downloader, VideoDescriptor};
pub use crate::language::Language;
pub use crate::transcription::subtitles::{build_cues, to_srt, to_webvtt, Cue};
pub use crate::transcription::{AssemblyAiTranscriber, TranscriptionOutput, Word};
pub use crate::translation::{Translate, TranslationService};
