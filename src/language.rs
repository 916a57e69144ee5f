use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages supported by the transcription and translation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
    Hindi,
    Chinese,
}

impl Language {
    /// Two-letter code understood by every external provider.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::Hindi => "hi",
            Language::Chinese => "zh",
        }
    }

    /// Capitalized display name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::Hindi => "Hindi",
            Language::Chinese => "Chinese",
        }
    }

    /// Parse a language name or two-letter code, case-insensitively.
    /// Unknown input falls back to English.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "english" | "en" => Language::English,
            "spanish" | "es" => Language::Spanish,
            "hindi" | "hi" => Language::Hindi,
            "chinese" | "zh" => Language::Chinese,
            _ => Language::English,
        }
    }

    /// All supported languages, in the order the API lists them.
    pub fn all() -> [Language; 4] {
        [
            Language::English,
            Language::Spanish,
            Language::Hindi,
            Language::Chinese,
        ]
    }
}

impl fmt::Display for Language {
    /// Lowercase name, used in subtitle file names and API responses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::English => "english",
            Language::Spanish => "spanish",
            Language::Hindi => "hindi",
            Language::Chinese => "chinese",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Spanish.code(), "es");
        assert_eq!(Language::Hindi.code(), "hi");
        assert_eq!(Language::Chinese.code(), "zh");
    }

    #[test]
    fn test_parse_names_and_codes() {
        assert_eq!(Language::parse("Spanish"), Language::Spanish);
        assert_eq!(Language::parse("es"), Language::Spanish);
        assert_eq!(Language::parse("HINDI"), Language::Hindi);
        assert_eq!(Language::parse("zh"), Language::Chinese);
    }

    #[test]
    fn test_unknown_falls_back_to_english() {
        assert_eq!(Language::parse("klingon"), Language::English);
        assert_eq!(Language::parse(""), Language::English);
    }

    #[test]
    fn test_display_is_lowercase_name() {
        assert_eq!(Language::Chinese.to_string(), "chinese");
        assert_eq!(Language::English.name(), "English");
    }
}
