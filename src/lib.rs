mod config;
mod date;
mod paths;
mod query;

mod filters;
mod progress;
mod util;
mod pipeline;

mod checkpoint;
mod csv_io;
mod dedupe;
mod fetch;
mod lang;
mod model;
mod normalize;
mod youtube;

pub use crate::config::{
    CommentOrder, Domain, ETLOptions, FetchOptions, QualityConfig, SearchOrder, DEFAULT_SPAM_PATTERNS,
};
pub use crate::date::PublishWindow;
pub use crate::paths::{discover_raw, DataPaths};
pub use crate::pipeline::{CleanOutput, CleanReport, YouTubeETL};
pub use crate::query::{domain_keywords, preset_queries};

pub use crate::checkpoint::{CheckpointPolicy, Checkpointer};
pub use crate::fetch::{CommentFetcher, Discovery, FailedQuery, FetchReport, FetchStop, SkippedVideo, VideoFetch};
pub use crate::youtube::{
    ApiError, ApiResult, CommentPage, CommentRequest, SearchPage, SearchRequest, TopLevelComment, VideoApi,
    YouTubeClient, API_KEY_ENV,
};

// row types and CSV layouts
pub use crate::model::{
    CleanedComment, DropReason, DroppedComment, RawComment, Verdict, Video, CLEAN_COLUMNS, DROPPED_COLUMNS,
    RAW_COLUMNS,
};

// text quality building blocks
pub use crate::normalize::{alpha_word_count, char_len, normalize, word_count, EMAIL_TOKEN, URL_TOKEN, USER_TOKEN};
pub use crate::filters::{
    has_repeat_run, DomainKeywords, LanguageFilter, MaxLength, MinLength, NoiseOnly, QualityClassifier, QualityRule,
    SparseWords, SpamLike,
};
pub use crate::lang::{default_language_detector, language_matches, LanguageDetector};
#[cfg(feature = "lang-detect")]
pub use crate::lang::WhatlangDetector;
pub use crate::dedupe::{dedupe_by_identity, dedupe_comments, dedupe_exact, dedupe_identity, dedupe_near, near_duplicate_key, DedupeStats};

// file helpers for binaries and tests
pub use crate::csv_io::{read_table, write_raw_comments, write_table, CsvTableWriter};
pub use crate::progress::{make_count_progress, ProgressScope};
pub use crate::util::{init_tracing_once, open_with_backoff, create_with_backoff, remove_with_backoff, replace_file_atomic_backoff};
