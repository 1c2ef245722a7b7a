use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::Cue;

// [Music], [Applause], [Laughter] and friends, possibly broken across lines
static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*?\]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Render cues as a single line of normalized prose
pub fn format_cues(cues: &[Cue]) -> String {
    if cues.is_empty() {
        return String::new();
    }

    match panic::catch_unwind(AssertUnwindSafe(|| clean_cues(cues))) {
        Ok(text) => text,
        Err(_) => {
            warn!("Cue cleaning failed, joining {} raw cues", cues.len());
            raw_join(cues)
        }
    }
}

fn normalize(text: &str) -> String {
    let text = ANNOTATION.replace_all(text.trim(), "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

fn clean_cues(cues: &[Cue]) -> String {
    let joined = cues
        .iter()
        .map(|c| normalize(&c.text))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    // An annotation may open in one cue and close in the next
    normalize(&joined)
}

fn raw_join(cues: &[Cue]) -> String {
    cues.iter()
        .map(|c| c.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Seconds spanned from the first cue's start to the end of the last cue
pub fn duration_covered(cues: &[Cue]) -> f64 {
    match (cues.first(), cues.last()) {
        (Some(first), Some(last)) => (last.start + last.duration - first.start).max(0.0),
        _ => 0.0,
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(text: &str, start: f64, duration: f64) -> Cue {
        Cue {
            text: text.to_string(),
            start,
            duration,
        }
    }

    #[test]
    fn test_format_basic() {
        let cues = vec![cue("Hello world", 0.0, 1.5), cue("This is a test", 1.5, 2.0)];
        assert_eq!(format_cues(&cues), "Hello world This is a test");
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_cues(&[]), "");
    }

    #[test]
    fn test_format_strips_annotations_and_drops_empty_cues() {
        let cues = vec![
            cue("[Music]", 0.0, 3.0),
            cue("  so   today\nwe talk [Applause] about  rust ", 3.0, 4.0),
            cue("   ", 7.0, 1.0),
            cue("[Laughter] right", 8.0, 1.0),
        ];
        assert_eq!(format_cues(&cues), "so today we talk about rust right");
    }

    #[test]
    fn test_format_is_idempotent_as_single_cue() {
        let inputs = [
            vec![cue("a [b] c", 0.0, 1.0), cue("  d\t\te ", 1.0, 1.0)],
            vec![cue("[[nested]] text", 0.0, 1.0)],
            vec![cue("unclosed [bracket", 0.0, 1.0)],
            vec![cue("[a [b] c] tail", 0.0, 1.0)],
            vec![cue("[upbeat\nmusic] hello", 0.0, 1.0)],
            vec![cue("so [laughs", 0.0, 1.0), cue("loudly] ok", 1.0, 1.0)],
        ];
        for cues in inputs {
            let once = format_cues(&cues);
            let twice = format_cues(&[cue(&once, 0.0, 0.0)]);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_format_strips_multiline_annotation() {
        let cues = vec![cue("[upbeat\nmusic] hello", 0.0, 1.0)];
        assert_eq!(format_cues(&cues), "hello");
    }

    #[test]
    fn test_format_strips_annotation_spanning_cues() {
        let cues = vec![cue("so [laughs", 0.0, 1.0), cue("loudly] ok", 1.0, 1.0)];
        assert_eq!(format_cues(&cues), "so ok");
    }

    #[test]
    fn test_raw_join_keeps_text_untouched() {
        let cues = vec![cue("[Music] hi", 0.0, 1.0), cue("", 1.0, 1.0), cue("there ", 2.0, 1.0)];
        assert_eq!(raw_join(&cues), "[Music] hi there ");
    }

    #[test]
    fn test_duration_covered() {
        let cues = vec![cue("a", 10.0, 2.0), cue("b", 12.0, 3.0), cue("c", 20.0, 5.5)];
        assert!((duration_covered(&cues) - 15.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duration_covered_empty_is_zero() {
        assert_eq!(duration_covered(&[]), 0.0);
    }

    #[test]
    fn test_duration_covered_never_negative() {
        // Out-of-order cues from a misbehaving service
        let cues = vec![cue("late", 30.0, 1.0), cue("early", 5.0, 1.0)];
        assert_eq!(duration_covered(&cues), 0.0);

        let single = vec![cue("only", 4.0, 0.0)];
        assert_eq!(duration_covered(&single), 0.0);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("one two  three\nfour"), 4);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
    }
}
