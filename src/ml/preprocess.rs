use once_cell::sync::Lazy;
use regex::Regex;

/// HTML tags, matched without any nesting awareness.
static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("HTML tag pattern is valid"));

/// Normalize raw review text.
///
/// Applied in order: strip HTML tags, drop every character that is not an
/// ASCII letter, ASCII digit, whitespace, `.`, `!` or `?`, lowercase, then
/// collapse whitespace runs into single spaces and trim.
///
/// The output determines every token the vectorizer sees, so it must stay
/// byte-for-byte stable between training and inference.
pub fn normalize(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, "");

    let filtered: String = without_tags
        .chars()
        .filter(|c| is_allowed(*c))
        .map(|c| c.to_ascii_lowercase())
        .collect();

    filtered
        .split(is_space)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unicode whitespace plus the ASCII information separators U+001C..U+001F
fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_space(c) || matches!(c, '.' | '!' | '?')
}

/// Text preprocessing utilities
pub struct TextPreprocessor;

impl TextPreprocessor {
    /// Normalize a single text
    pub fn normalize(text: &str) -> String {
        normalize(text)
    }

    /// Normalize a batch of texts, keeping order
    pub fn normalize_all<S: AsRef<str>>(texts: &[S]) -> Vec<String> {
        texts.iter().map(|t| normalize(t.as_ref())).collect()
    }
}
