use crate::checkpoint::CheckpointPolicy;
use crate::date::PublishWindow;
use crate::paths::DataPaths;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Content category used to partition data end-to-end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Sneaker,
    Pharma,
    Food,
    Steam,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Domain::Sneaker, Domain::Pharma, Domain::Food, Domain::Steam];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Sneaker => "sneaker",
            Domain::Pharma => "pharma",
            Domain::Food => "food",
            Domain::Steam => "steam",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| anyhow!("unknown domain {s:?} (expected sneaker, pharma, food or steam)"))
    }
}

/// Comment thread ordering accepted by the comments endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CommentOrder {
    #[default]
    Relevance,
    Time,
}

impl CommentOrder {
    pub fn as_api_str(self) -> &'static str {
        match self {
            CommentOrder::Relevance => "relevance",
            CommentOrder::Time => "time",
        }
    }
}

/// Video search ordering. Discovery ranks by popularity, so `ViewCount` is the default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SearchOrder {
    #[default]
    ViewCount,
    Relevance,
    Date,
}

impl SearchOrder {
    pub fn as_api_str(self) -> &'static str {
        match self {
            SearchOrder::ViewCount => "viewCount",
            SearchOrder::Relevance => "relevance",
            SearchOrder::Date => "date",
        }
    }
}

/// Fetch-stage options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub target_total: usize,         // stop once this many comments are accumulated
    pub search_pages: usize,         // search result pages per query
    pub search_page_size: u32,       // videos per search page (API max 50)
    pub per_video_limit: usize,      // top-level comments per video
    pub comment_page_size: u32,      // comments per page (API max 100)
    pub comment_order: CommentOrder,
    pub search_order: SearchOrder,
    pub sleep_between_videos: Duration,
    pub window: PublishWindow,
    pub region_code: Option<String>,
    pub relevance_language: Option<String>,
    pub rank_by_views: bool,         // sort candidates by view count after discovery
    pub checkpoint: CheckpointPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            target_total: 20_000,
            search_pages: 10,
            search_page_size: 50,
            per_video_limit: 500,
            comment_page_size: 100,
            comment_order: CommentOrder::Relevance,
            search_order: SearchOrder::ViewCount,
            sleep_between_videos: Duration::from_millis(200),
            window: PublishWindow::current_year(),
            region_code: None,
            relevance_language: None,
            rank_by_views: false,
            checkpoint: CheckpointPolicy::every_rows(5_000),
        }
    }
}

impl FetchOptions {
    pub fn with_target_total(mut self, n: usize) -> Self {
        self.target_total = n;
        self
    }
    pub fn with_search_pages(mut self, pages: usize) -> Self {
        self.search_pages = pages;
        self
    }
    pub fn with_search_page_size(mut self, n: u32) -> Self {
        self.search_page_size = n.clamp(1, 50);
        self
    }
    pub fn with_per_video_limit(mut self, n: usize) -> Self {
        self.per_video_limit = n;
        self
    }
    pub fn with_comment_page_size(mut self, n: u32) -> Self {
        self.comment_page_size = n.clamp(1, 100);
        self
    }
    pub fn with_comment_order(mut self, order: CommentOrder) -> Self {
        self.comment_order = order;
        self
    }
    pub fn with_search_order(mut self, order: SearchOrder) -> Self {
        self.search_order = order;
        self
    }
    pub fn with_sleep(mut self, d: Duration) -> Self {
        self.sleep_between_videos = d;
        self
    }
    pub fn with_window(mut self, window: PublishWindow) -> Self {
        self.window = window;
        self
    }
    pub fn with_region_code(mut self, code: impl Into<String>) -> Self {
        self.region_code = Some(code.into());
        self
    }
    pub fn with_relevance_language(mut self, lang: impl Into<String>) -> Self {
        self.relevance_language = Some(lang.into());
        self
    }
    pub fn with_rank_by_views(mut self, yes: bool) -> Self {
        self.rank_by_views = yes;
        self
    }
    pub fn with_checkpoint(mut self, policy: CheckpointPolicy) -> Self {
        self.checkpoint = policy;
        self
    }
}

/// Promotional phrasing that marks a comment as spam.
pub const DEFAULT_SPAM_PATTERNS: &[&str] = &[
    r"promo\s?code",
    r"discount",
    r"free\s+\w+",
    r"dm\s+me",
    r"whatsapp",
    r"telegram",
    r"line\s?id",
    r"follow\s+me\s+for\s+link",
    r"subscribe\s+for",
    r"giveaway",
];

/// Thresholds and pattern lists for the quality rules.
/// Lengths are counted in characters, not bytes.
#[derive(Clone, Debug)]
pub struct QualityConfig {
    pub min_chars: usize,
    pub max_chars: usize,
    pub min_words: usize,
    pub min_chars_for_words: usize,  // the word-count rule only fires below this length
    pub repeat_run: usize,           // identical characters in a row that count as noise
    pub code_symbol_run: usize,
    pub symbol_ratio: f64,
    pub long_symbolic_len: usize,
    pub spam_patterns: Vec<String>,
    pub target_language: Option<String>, // e.g. "en", "zh"
    pub domain_filter: bool,
    pub domain_keywords: Option<Vec<String>>, // overrides the domain presets when set
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_chars: 3,
            max_chars: 2000,
            min_words: 2,
            min_chars_for_words: 8,
            repeat_run: 5,
            code_symbol_run: 3,
            symbol_ratio: 0.4,
            long_symbolic_len: 400,
            spam_patterns: DEFAULT_SPAM_PATTERNS.iter().map(|s| s.to_string()).collect(),
            target_language: None,
            domain_filter: false,
            domain_keywords: None,
        }
    }
}

impl QualityConfig {
    pub fn with_char_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_chars = min;
        self.max_chars = max.max(min);
        self
    }
    pub fn with_min_words(mut self, n: usize) -> Self {
        self.min_words = n;
        self
    }
    pub fn with_min_chars_for_words(mut self, n: usize) -> Self {
        self.min_chars_for_words = n;
        self
    }
    pub fn with_repeat_run(mut self, n: usize) -> Self {
        self.repeat_run = n.max(2);
        self
    }
    pub fn with_symbol_density(mut self, ratio: f64, long_len: usize) -> Self {
        self.symbol_ratio = ratio;
        self.long_symbolic_len = long_len;
        self
    }
    pub fn with_spam_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spam_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_target_language(mut self, lang: impl AsRef<str>) -> Self {
        let l = lang.as_ref().trim().to_lowercase();
        self.target_language = if l.is_empty() { None } else { Some(l) };
        self
    }
    pub fn with_domain_filter(mut self, yes: bool) -> Self {
        self.domain_filter = yes;
        self
    }
    pub fn with_domain_keywords<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_keywords = Some(patterns.into_iter().map(Into::into).collect());
        self.domain_filter = true;
        self
    }
}

/// Everything a `YouTubeETL` run needs.
#[derive(Clone, Debug)]
pub struct ETLOptions {
    pub paths: DataPaths,
    pub fetch: FetchOptions,
    pub quality: QualityConfig,
    pub progress: bool, // show progress bars
}

impl Default for ETLOptions {
    fn default() -> Self {
        Self {
            paths: DataPaths::new("./data"),
            fetch: FetchOptions::default(),
            quality: QualityConfig::default(),
            progress: true,
        }
    }
}

impl ETLOptions {
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.paths = DataPaths::new(dir);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
}
