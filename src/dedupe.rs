//! Stable, per-video comment deduplication.
//!
//! Every pass keeps the first occurrence of a key and preserves the relative
//! order of survivors.

use crate::model::RawComment;
use ahash::AHashSet;
use regex::Regex;
use std::sync::LazyLock;

static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Key for near-duplicate detection: lowercase, punctuation removed, whitespace collapsed.
pub fn near_duplicate_key(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lower, "");
    WS_RE.replace_all(&stripped, " ").trim().to_string()
}

/// How many rows each pass removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DedupeStats {
    pub exact: usize,
    pub near: usize,
    pub identity: usize,
}

/// Keep the first row per key, returning survivors and the number removed.
fn retain_first_by<K, F>(rows: Vec<RawComment>, key: F) -> (Vec<RawComment>, usize)
where
    K: std::hash::Hash + Eq,
    F: Fn(&RawComment) -> K,
{
    let keep: Vec<bool> = {
        let mut seen: AHashSet<K> = AHashSet::with_capacity(rows.len());
        rows.iter().map(|r| seen.insert(key(r))).collect()
    };
    let before = rows.len();
    let out: Vec<RawComment> = rows
        .into_iter()
        .zip(keep)
        .filter_map(|(r, k)| k.then_some(r))
        .collect();
    let removed = before - out.len();
    (out, removed)
}

/// Pass 1: same `(video_id, text)`.
pub fn dedupe_exact(rows: Vec<RawComment>) -> (Vec<RawComment>, usize) {
    retain_first_by(rows, |r| (r.video_id.clone(), r.text.clone()))
}

/// Pass 2: same `(video_id, near_duplicate_key(text))`.
pub fn dedupe_near(rows: Vec<RawComment>) -> (Vec<RawComment>, usize) {
    retain_first_by(rows, |r| (r.video_id.clone(), near_duplicate_key(&r.text)))
}

/// Pass 3: same `(video_id, comment_id)`. Raw files from older runs can
/// carry an edited comment twice under one id.
pub fn dedupe_identity(rows: Vec<RawComment>) -> (Vec<RawComment>, usize) {
    retain_first_by(rows, |r| (r.video_id.clone(), r.comment_id.clone()))
}

/// All three passes: exact, near, then identity.
pub fn dedupe_comments(rows: Vec<RawComment>) -> (Vec<RawComment>, DedupeStats) {
    let (rows, exact) = dedupe_exact(rows);
    let (rows, near) = dedupe_near(rows);
    let (rows, identity) = dedupe_identity(rows);
    (rows, DedupeStats { exact, near, identity })
}

/// Identity dedupe by `(video_id, comment_id)`, used before every fetch write.
pub fn dedupe_by_identity(rows: &[RawComment]) -> Vec<&RawComment> {
    let mut seen: AHashSet<(&str, &str)> = AHashSet::with_capacity(rows.len());
    rows.iter()
        .filter(|r| seen.insert((r.video_id.as_str(), r.comment_id.as_str())))
        .collect()
}
