//! Lightweight inline markup for assistant replies
//!
//! Supports a deliberately small subset of markdown:
//! - Bold: `**text**` or `__text__`
//! - Code: `` `text` ``
//! - List items: lines starting with `- ` or `* `
//!
//! Spans never nest. A line is scanned once, left to right, and the first
//! delimiter pair that closes wins.

use std::sync::OnceLock;

use regex::Regex;

/// An inline run of text within a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Plain(String),
    Bold(String),
    Code(String),
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Inline::Plain(s) | Inline::Bold(s) | Inline::Code(s) => s,
        }
    }
}

/// One source line after formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedLine {
    /// A regular line of inline content
    Text(Vec<Inline>),
    /// A `- ` or `* ` bullet with the marker stripped
    ListItem(Vec<Inline>),
    /// A line that is empty after trimming
    Blank,
}

impl FormattedLine {
    /// Render the line without any styling, bullets shown as `• `
    pub fn plain_text(&self) -> String {
        match self {
            FormattedLine::Text(spans) => join_spans(spans),
            FormattedLine::ListItem(spans) => format!("• {}", join_spans(spans)),
            FormattedLine::Blank => String::new(),
        }
    }
}

fn join_spans(spans: &[Inline]) -> String {
    spans.iter().map(Inline::text).collect()
}

// Alternation order is the priority order; the regex crate uses leftmost-first semantics.
fn inline_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\*\*(.*?)\*\*|__(.*?)__|`([^`]+)`").expect("inline markup pattern is valid")
    })
}

/// Format raw assistant text into one block per source line.
///
/// Never fails: unmatched delimiters simply stay in the output as literal text.
pub fn format(content: &str) -> Vec<FormattedLine> {
    content.split('\n').map(format_line).collect()
}

fn format_line(line: &str) -> FormattedLine {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if let Some(rest) = strip_list_marker(line) {
        FormattedLine::ListItem(format_inline(rest))
    } else if line.trim().is_empty() {
        FormattedLine::Blank
    } else {
        FormattedLine::Text(format_inline(line))
    }
}

/// Returns the text after a leading `- ` / `* ` marker, if there is one.
///
/// The marker must be followed by whitespace within the fully trimmed line, so a
/// bare `- ` is ordinary text. The marker is stripped from the left-trimmed line.
fn strip_list_marker(line: &str) -> Option<&str> {
    let mut chars = line.trim().chars();
    let marker = chars.next()?;
    if marker != '-' && marker != '*' {
        return None;
    }
    let space = chars.next()?;
    if !space.is_whitespace() {
        return None;
    }
    let trimmed = line.trim_start();
    Some(&trimmed[marker.len_utf8() + space.len_utf8()..])
}

/// Split a single line into plain, bold and code runs
pub fn format_inline(text: &str) -> Vec<Inline> {
    let mut parts = Vec::new();
    let mut last_end = 0;

    for caps in inline_pattern().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };

        if whole.start() > last_end {
            parts.push(Inline::Plain(text[last_end..whole.start()].to_string()));
        }

        if let Some(bold) = caps.get(1).or_else(|| caps.get(2)) {
            parts.push(Inline::Bold(bold.as_str().to_string()));
        } else if let Some(code) = caps.get(3) {
            parts.push(Inline::Code(code.as_str().to_string()));
        }

        last_end = whole.end();
    }

    if last_end < text.len() {
        parts.push(Inline::Plain(text[last_end..].to_string()));
    }

    if parts.is_empty() {
        parts.push(Inline::Plain(text.to_string()));
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> Inline {
        Inline::Plain(s.to_string())
    }

    fn bold(s: &str) -> Inline {
        Inline::Bold(s.to_string())
    }

    fn code(s: &str) -> Inline {
        Inline::Code(s.to_string())
    }

    #[test]
    fn test_plain_text_passes_through() {
        let lines = format("Here are your tasks\nNothing else");
        assert_eq!(
            lines,
            vec![
                FormattedLine::Text(vec![plain("Here are your tasks")]),
                FormattedLine::Text(vec![plain("Nothing else")]),
            ]
        );
    }

    #[test]
    fn test_bold_span() {
        assert_eq!(format("**bold**"), vec![FormattedLine::Text(vec![bold("bold")])]);
        assert_eq!(format("__bold__"), vec![FormattedLine::Text(vec![bold("bold")])]);
    }

    #[test]
    fn test_code_span() {
        assert_eq!(format("`code`"), vec![FormattedLine::Text(vec![code("code")])]);
    }

    #[test]
    fn test_mixed_spans_keep_order() {
        assert_eq!(
            format_inline("**a** and `b`"),
            vec![bold("a"), plain(" and "), code("b")]
        );
    }

    #[test]
    fn test_surrounding_text_preserved() {
        assert_eq!(
            format_inline("Task **Buy milk** added."),
            vec![plain("Task "), bold("Buy milk"), plain(" added.")]
        );
    }

    #[test]
    fn test_list_items() {
        assert_eq!(format("- item"), vec![FormattedLine::ListItem(vec![plain("item")])]);
        assert_eq!(format("* item"), vec![FormattedLine::ListItem(vec![plain("item")])]);
        assert_eq!(
            format("  - **urgent** thing"),
            vec![FormattedLine::ListItem(vec![bold("urgent"), plain(" thing")])]
        );
    }

    #[test]
    fn test_marker_without_space_is_not_a_list() {
        assert_eq!(format("-item"), vec![FormattedLine::Text(vec![plain("-item")])]);
        assert_eq!(format("-"), vec![FormattedLine::Text(vec![plain("-")])]);
    }

    #[test]
    fn test_bare_marker_is_text() {
        assert_eq!(format("- "), vec![FormattedLine::Text(vec![plain("- ")])]);
        assert_eq!(format("  *  "), vec![FormattedLine::Text(vec![plain("  *  ")])]);
    }

    #[test]
    fn test_list_item_keeps_trailing_text() {
        assert_eq!(
            format("-  spaced  "),
            vec![FormattedLine::ListItem(vec![plain(" spaced  ")])]
        );
    }

    #[test]
    fn test_unmatched_bold_stays_literal() {
        assert_eq!(format("**oops"), vec![FormattedLine::Text(vec![plain("**oops")])]);
        assert_eq!(
            format_inline("**a** b**"),
            vec![bold("a"), plain(" b**")]
        );
    }

    #[test]
    fn test_delimiters_must_match() {
        assert_eq!(format_inline("**mixed__"), vec![plain("**mixed__")]);
    }

    #[test]
    fn test_no_nesting() {
        // Code inside bold is not re-scanned
        assert_eq!(format_inline("**see `x`**"), vec![bold("see `x`")]);
        // Bold markers inside code stay literal
        assert_eq!(format_inline("`a **b` c**"), vec![code("a **b"), plain(" c**")]);
    }

    #[test]
    fn test_empty_code_span_is_literal() {
        assert_eq!(format_inline("``"), vec![plain("``")]);
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(
            format("one\n\n   \ntwo"),
            vec![
                FormattedLine::Text(vec![plain("one")]),
                FormattedLine::Blank,
                FormattedLine::Blank,
                FormattedLine::Text(vec![plain("two")]),
            ]
        );
        assert_eq!(format(""), vec![FormattedLine::Blank]);
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            format("a\r\n- b\r\n"),
            vec![
                FormattedLine::Text(vec![plain("a")]),
                FormattedLine::ListItem(vec![plain("b")]),
                FormattedLine::Blank,
            ]
        );
    }

    #[test]
    fn test_plain_text_rendering() {
        let lines = format("**Tasks**\n- `#3` Buy milk\n");
        let rendered: Vec<String> = lines.iter().map(FormattedLine::plain_text).collect();
        assert_eq!(rendered, vec!["Tasks", "• #3 Buy milk", ""]);
    }
}
