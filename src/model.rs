//! Row types flowing through the pipeline and the CSV layouts they map to.

use crate::config::Domain;
use crate::normalize::{char_len, word_count};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A video candidate from discovery. Only lives for the duration of a fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub published_at: String,
    pub view_count: Option<u64>,
}

/// A top-level comment as fetched. Identity is `(video_id, comment_id)`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RawComment {
    pub video_id: String,
    #[serde(default)]
    pub video_title: String,
    #[serde(default)]
    pub video_published_at: String,
    pub comment_id: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_domain")]
    pub domain: Option<Domain>,
}

// Hand-edited or older raw files may carry blanks or floats like "12.0".
fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let s = Option::<String>::deserialize(d)?.unwrap_or_default();
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Ok(n);
    }
    Ok(s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64).unwrap_or(0))
}

fn lenient_domain<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Domain>, D::Error> {
    let s = Option::<String>::deserialize(d)?.unwrap_or_default();
    Ok(s.parse().ok())
}

/// Raw CSV layout. Column order is fixed by `RAW_COLUMNS`.
#[derive(Serialize)]
pub(crate) struct RawRow<'a> {
    video_id: &'a str,
    video_title: &'a str,
    video_published_at: &'a str,
    comment_id: &'a str,
    published_at: &'a str,
    like_count: i64,
    text: &'a str,
    char_len: usize,
    word_count: usize,
    domain: &'static str,
}

pub const RAW_COLUMNS: &[&str] = &[
    "video_id", "video_title", "video_published_at", "comment_id", "published_at",
    "like_count", "text", "char_len", "word_count", "domain",
];

impl<'a> From<&'a RawComment> for RawRow<'a> {
    fn from(c: &'a RawComment) -> Self {
        Self {
            video_id: &c.video_id,
            video_title: &c.video_title,
            video_published_at: &c.video_published_at,
            comment_id: &c.comment_id,
            published_at: &c.published_at,
            like_count: c.like_count,
            text: &c.text,
            char_len: char_len(&c.text),
            word_count: word_count(&c.text),
            domain: c.domain.map(Domain::as_str).unwrap_or(""),
        }
    }
}

/// Why a comment was rejected. Variants are listed in rule priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    TooShort,
    TooLong,
    NoiseOnly,
    SpamLike,
    LangFilter,
    DomainMismatch,
    TooShortWords,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::TooShort => "too_short",
            DropReason::TooLong => "too_long",
            DropReason::NoiseOnly => "noise_only",
            DropReason::SpamLike => "spam_like",
            DropReason::LangFilter => "lang_filter",
            DropReason::DomainMismatch => "domain_mismatch",
            DropReason::TooShortWords => "too_short_words",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comment that passed every quality rule.
/// Built only through `CleanedComment::new`, which keeps `comment_length` in sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedComment {
    pub video_id: String,
    pub video_title: String,
    pub video_published_at: String,
    pub comment_id: String,
    pub published_at: String,
    pub like_count: i64,
    pub clean_text: String,
    pub comment_length: usize,
    pub domain: Domain,
}

pub const CLEAN_COLUMNS: &[&str] = &[
    "video_id", "video_title", "video_published_at", "comment_id", "published_at",
    "like_count", "clean_text", "comment_length", "domain",
];

impl CleanedComment {
    pub fn new(raw: &RawComment, clean_text: String, domain: Domain) -> Self {
        Self {
            video_id: raw.video_id.clone(),
            video_title: raw.video_title.clone(),
            video_published_at: raw.video_published_at.clone(),
            comment_id: raw.comment_id.clone(),
            published_at: raw.published_at.clone(),
            like_count: raw.like_count,
            comment_length: char_len(&clean_text),
            clean_text,
            domain,
        }
    }
}

/// Audit row for a rejected comment: the cleaned columns, the original text and the reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedComment {
    pub video_id: String,
    pub video_title: String,
    pub video_published_at: String,
    pub comment_id: String,
    pub published_at: String,
    pub like_count: i64,
    pub clean_text: String,
    pub comment_length: usize,
    pub domain: Domain,
    pub text: String,
    pub dropped_reason: DropReason,
}

pub const DROPPED_COLUMNS: &[&str] = &[
    "video_id", "video_title", "video_published_at", "comment_id", "published_at",
    "like_count", "clean_text", "comment_length", "domain", "text", "dropped_reason",
];

impl DroppedComment {
    pub fn new(raw: &RawComment, clean_text: String, domain: Domain, reason: DropReason) -> Self {
        let kept = CleanedComment::new(raw, clean_text, domain);
        Self {
            video_id: kept.video_id,
            video_title: kept.video_title,
            video_published_at: kept.video_published_at,
            comment_id: kept.comment_id,
            published_at: kept.published_at,
            like_count: kept.like_count,
            clean_text: kept.clean_text,
            comment_length: kept.comment_length,
            domain,
            text: raw.text.clone(),
            dropped_reason: reason,
        }
    }
}

/// Outcome of cleaning one comment: kept or dropped with exactly one reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Kept(CleanedComment),
    Dropped(DroppedComment),
}

impl Verdict {
    pub fn dropped_reason(&self) -> Option<DropReason> {
        match self {
            Verdict::Kept(_) => None,
            Verdict::Dropped(d) => Some(d.dropped_reason),
        }
    }
}
