//! One-line descriptions for extracted snippets

/// Longest header kept in a description, in characters
const MAX_HEADER_CHARS: usize = 100;

/// Used when a snippet has nothing but blank or comment lines
pub const FALLBACK_SUMMARY: &str = "N/A Summary";

const COMMENT_PREFIXES: [&str; 3] = ["#", "//", "/*"];

/// Describe a snippet by its first meaningful line.
///
/// The first non-blank line that does not open a comment is truncated to
/// 100 characters (with `...` appended when cut) and wrapped as
/// ``Function/method starting with `<line>`.``
pub fn describe(snippet: &str) -> String {
    let header = snippet
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !is_comment(line));

    match header {
        Some(line) => format!("Function/method starting with `{}`.", truncate(line)),
        None => FALLBACK_SUMMARY.to_string(),
    }
}

fn is_comment(line: &str) -> bool {
    COMMENT_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

fn truncate(line: &str) -> String {
    match line.char_indices().nth(MAX_HEADER_CHARS) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}
