pub mod assemblyai;
pub mod subtitles;

use serde::{Deserialize, Serialize};

pub use assemblyai::AssemblyAiTranscriber;

/// One timestamped word from the speech-to-text provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    /// Start offset in milliseconds.
    pub start: u64,
    /// End offset in milliseconds.
    pub end: u64,
}

/// Complete transcript for one audio file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionOutput {
    /// Full transcription text.
    pub full_text: String,
    /// Word-level timestamps, the input for cue construction.
    pub words: Vec<Word>,
}
