use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of cleaned document text, in characters.
pub const MAX_DOCUMENT_CHARS: usize = 10_000;

static HORIZONTAL_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("valid regex"));
static SPACE_AROUND_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" *\n *").expect("valid regex"));
static NEWLINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Normalizes decoded document text.
///
/// Line endings become `\n`, tabs become spaces, anything outside printable
/// ASCII (other than newlines) is dropped, runs of spaces collapse to one,
/// spaces around line breaks are removed, three or more newlines collapse to
/// two, and the result is trimmed and cut to [`MAX_DOCUMENT_CHARS`].
///
/// Applying it twice gives the same result as applying it once.
pub fn clean_text(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

    let printable: String = normalized
        .chars()
        .filter_map(|c| match c {
            '\n' => Some('\n'),
            '\t' => Some(' '),
            ' '..='~' => Some(c),
            _ => None,
        })
        .collect();

    let collapsed = HORIZONTAL_RUNS.replace_all(&printable, " ");
    let joined = SPACE_AROUND_NEWLINE.replace_all(&collapsed, "\n");
    let paragraphs = NEWLINE_RUNS.replace_all(&joined, "\n\n");

    truncate_chars(paragraphs.trim(), MAX_DOCUMENT_CHARS)
        .trim_end()
        .to_string()
}

/// Returns the longest prefix of `text` holding at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_line_endings_and_blank_lines() {
        let raw = "Week 1\r\n\r\n\r\n\r\nIntro\rWeek 2";
        assert_eq!(clean_text(raw), "Week 1\n\nIntro\nWeek 2");
    }

    #[test]
    fn collapses_horizontal_whitespace() {
        let raw = "Lecture\t\t  one   covers    sets";
        assert_eq!(clean_text(raw), "Lecture one covers sets");
    }

    #[test]
    fn strips_non_printable_and_non_ascii() {
        let raw = "Caf\u{e9} \u{2022} Topics\u{0007}\n\u{00a0}Graphs";
        assert_eq!(clean_text(raw), "Caf Topics\nGraphs");
    }

    #[test]
    fn removes_spaces_around_line_breaks() {
        let raw = "Unit 1   \n   \n  \n  \n Unit 2";
        assert_eq!(clean_text(raw), "Unit 1\n\nUnit 2");
    }

    #[test]
    fn truncates_to_budget() {
        let raw = "word ".repeat(5_000);
        let cleaned = clean_text(&raw);
        assert!(cleaned.chars().count() <= MAX_DOCUMENT_CHARS);
        assert!(!cleaned.ends_with(' '));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let samples = [
            "  Syllabus\r\n\r\n\r\n1.\tIntro \u{2013} basics  \n \n\n\nEnd  ",
            "\u{feff}Header\u{0000}\n\n\n\n\n  body\ttext\r\rmore",
            "tab\t\n\t\ttabbed\n \u{3000} \nwide",
            &"x y\n\n\n".repeat(4_000),
        ];
        for raw in samples {
            let once = clean_text(raw);
            assert_eq!(clean_text(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("h\u{e9}llo", 2), "h\u{e9}");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
