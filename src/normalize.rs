//! Text canonicalization shared by the classifier and the cleaned output.
//!
//! `normalize` is idempotent: the placeholders it inserts (`<URL>`, `<EMAIL>`,
//! `<USER>`) never match the patterns they replace, and it never introduces
//! whitespace.

use regex::Regex;
use std::sync::LazyLock;

pub const URL_TOKEN: &str = "<URL>";
pub const EMAIL_TOKEN: &str = "<EMAIL>";
pub const USER_TOKEN: &str = "<USER>";

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
pub(crate) static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(https?://\S+|www\.\S+)").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
pub(crate) static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+").unwrap());

/// Collapse whitespace, then mask URLs, emails and @mentions.
/// URLs go first so addresses inside links are not reported as emails.
pub fn normalize(text: &str) -> String {
    let t = WS_RE.replace_all(text.trim(), " ");
    let t = URL_RE.replace_all(&t, URL_TOKEN);
    let t = EMAIL_RE.replace_all(&t, EMAIL_TOKEN);
    let t = MENTION_RE.replace_all(&t, USER_TOKEN);
    t.into_owned()
}

/// Length in characters (Unicode scalar values).
#[inline]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Whitespace-separated tokens.
#[inline]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Tokens made only of alphabetic characters. Undercounts for scripts written
/// without spaces, which is why the sparse-words rule also checks length.
pub fn alpha_word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().all(char::is_alphabetic))
        .count()
}
