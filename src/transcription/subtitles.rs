//! Caption cue construction and WebVTT/SRT serialization.

use serde::{Deserialize, Serialize};

use super::Word;

/// Maximum words merged into a single cue.
const MAX_WORDS_PER_CUE: usize = 10;

/// Maximum span of a single cue in milliseconds.
const MAX_CUE_DURATION_MS: u64 = 5000;

/// One timed caption entry. Times are milliseconds from stream start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub start: u64,
    pub end: u64,
    pub text: String,
}

/// Greedily group a word-level transcript into caption cues.
///
/// A cue closes once it holds ten words or spans five seconds; the next word
/// then seeds a fresh cue. The word-count cap keeps cues readable, the
/// duration cap keeps a cue from lingering past natural speech pauses.
/// An empty transcript yields an empty track.
pub fn build_cues(words: &[Word]) -> Vec<Cue> {
    let Some(first) = words.first() else {
        return Vec::new();
    };

    let mut cues = Vec::new();
    let mut current = Cue {
        start: first.start,
        end: first.end,
        text: first.text.clone(),
    };
    let mut word_count = 1;

    for word in &words[1..] {
        let duration = word.end.saturating_sub(current.start);

        if word_count >= MAX_WORDS_PER_CUE || duration >= MAX_CUE_DURATION_MS {
            cues.push(current);
            current = Cue {
                start: word.start,
                end: word.end,
                text: word.text.clone(),
            };
            word_count = 1;
        } else {
            current.end = word.end;
            current.text.push(' ');
            current.text.push_str(&word.text);
            word_count += 1;
        }
    }

    if !current.text.is_empty() {
        cues.push(current);
    }

    cues
}

/// Serialize cues as a WebVTT document: header, then 1-indexed blocks of
/// index, time range, and text.
pub fn to_webvtt(cues: &[Cue]) -> String {
    let mut vtt = String::from("WEBVTT\n\n");

    for (index, cue) in cues.iter().enumerate() {
        vtt.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_timestamp(cue.start),
            format_timestamp(cue.end),
            cue.text
        ));
    }

    vtt
}

/// Serialize cues as SRT: same blocks, no header, comma before the
/// millisecond field.
pub fn to_srt(cues: &[Cue]) -> String {
    let mut srt = String::new();

    for (index, cue) in cues.iter().enumerate() {
        srt.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_timestamp_srt(cue.start),
            format_timestamp_srt(cue.end),
            cue.text
        ));
    }

    srt
}

/// Format milliseconds as a WebVTT timestamp (HH:MM:SS.mmm).
pub fn format_timestamp(milliseconds: u64) -> String {
    let total_seconds = milliseconds / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!(
        "{:02}:{:02}:{:02}.{:03}",
        hours,
        minutes,
        seconds,
        milliseconds % 1000
    )
}

/// Format milliseconds as an SRT timestamp (HH:MM:SS,mmm).
pub fn format_timestamp_srt(milliseconds: u64) -> String {
    format_timestamp(milliseconds).replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: u64, end: u64) -> Word {
        Word {
            text: text.to_string(),
            start,
            end,
        }
    }

    /// Words evenly spaced at `gap_ms`, each spanning `gap_ms`.
    fn evenly_spaced(count: usize, gap_ms: u64) -> Vec<Word> {
        (0..count)
            .map(|i| {
                let start = i as u64 * gap_ms;
                word(&format!("word{}", i), start, start + gap_ms)
            })
            .collect()
    }

    #[test]
    fn test_empty_transcript_yields_no_cues() {
        assert!(build_cues(&[]).is_empty());
    }

    #[test]
    fn test_single_word_yields_single_cue() {
        let cues = build_cues(&[word("hello", 100, 500)]);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0], Cue { start: 100, end: 500, text: "hello".to_string() });
    }

    #[test]
    fn test_twelve_words_split_ten_then_two() {
        // 400 ms spacing never trips the duration cap, so the word-count cap
        // decides: 10 words in the first cue, 2 in the second.
        let cues = build_cues(&evenly_spaced(12, 400));
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text.split_whitespace().count(), 10);
        assert_eq!(cues[1].text.split_whitespace().count(), 2);
        assert_eq!(cues[0].start, 0);
        assert_eq!(cues[1].start, 4000);
    }

    #[test]
    fn test_duration_cap_closes_cue() {
        let words = vec![
            word("first", 0, 1000),
            word("second", 5500, 6000),
            word("third", 6100, 6500),
        ];
        let cues = build_cues(&words);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "first");
        assert_eq!(cues[1].text, "second third");
        assert_eq!(cues[1].start, 5500);
    }

    #[test]
    fn test_cue_invariants_hold() {
        let cues = build_cues(&evenly_spaced(57, 700));
        let mut last_start = 0;
        for cue in &cues {
            assert!(cue.start <= cue.end);
            assert!(cue.start >= last_start);
            assert!(cue.text.split_whitespace().count() <= 10);
            last_start = cue.start;
        }
    }

    #[test]
    fn test_word_content_is_preserved() {
        let words = evenly_spaced(37, 450);
        let cues = build_cues(&words);

        let original: Vec<String> = words.iter().map(|w| w.text.clone()).collect();
        let rebuilt: Vec<String> = cues
            .iter()
            .flat_map(|c| c.text.split_whitespace().map(str::to_string))
            .collect();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_timestamp_formatting() {
        assert_eq!(format_timestamp(3661000), "01:01:01.000");
        assert_eq!(format_timestamp(1500), "00:00:01.500");
        assert_eq!(format_timestamp(0), "00:00:00.000");
        assert_eq!(format_timestamp(59999), "00:00:59.999");
    }

    #[test]
    fn test_srt_timestamp_uses_comma() {
        assert_eq!(format_timestamp_srt(3661000), "01:01:01,000");
        assert_eq!(format_timestamp_srt(1500), "00:00:01,500");
    }

    #[test]
    fn test_webvtt_layout() {
        let cues = vec![
            Cue { start: 0, end: 1200, text: "first cue".to_string() },
            Cue { start: 1200, end: 2400, text: "second cue".to_string() },
        ];
        let vtt = to_webvtt(&cues);

        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert!(vtt.contains("1\n00:00:00.000 --> 00:00:01.200\nfirst cue\n"));
        assert!(vtt.contains("2\n00:00:01.200 --> 00:00:02.400\nsecond cue\n"));
    }

    #[test]
    fn test_srt_has_no_header() {
        let cues = vec![Cue { start: 0, end: 1000, text: "only".to_string() }];
        let srt = to_srt(&cues);

        assert!(srt.starts_with("1\n"));
        assert!(srt.contains("00:00:00,000 --> 00:00:01,000"));
        assert!(!srt.contains("WEBVTT"));
    }

    #[test]
    fn test_webvtt_round_trip() {
        let cues = build_cues(&evenly_spaced(23, 600));
        let parsed = parse_webvtt(&to_webvtt(&cues));

        assert_eq!(parsed.len(), cues.len());
        for (original, recovered) in cues.iter().zip(&parsed) {
            assert_eq!(original.start, recovered.start);
            assert_eq!(original.end, recovered.end);
            assert_eq!(original.text, recovered.text);
        }
    }

    /// Minimal reference parser for round-trip checks.
    fn parse_webvtt(vtt: &str) -> Vec<Cue> {
        let body = vtt.strip_prefix("WEBVTT\n\n").expect("WEBVTT header");
        body.split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| {
                let mut lines = block.lines();
                let _index = lines.next().expect("index line");
                let times = lines.next().expect("timing line");
                let (start, end) = times.split_once(" --> ").expect("arrow separator");
                Cue {
                    start: parse_timestamp(start),
                    end: parse_timestamp(end),
                    text: lines.collect::<Vec<_>>().join("\n"),
                }
            })
            .collect()
    }

    fn parse_timestamp(ts: &str) -> u64 {
        let (hms, millis) = ts.split_once('.').expect("fractional separator");
        let parts: Vec<u64> = hms.split(':').map(|p| p.parse().unwrap()).collect();
        (parts[0] * 3600 + parts[1] * 60 + parts[2]) * 1000 + millis.parse::<u64>().unwrap()
    }
}
