//! Video discovery and paginated comment fetching for one domain.

use crate::config::{Domain, FetchOptions};
use crate::dedupe::dedupe_by_identity;
use crate::model::{RawComment, Video};
use crate::progress::ProgressScope;
use crate::youtube::{ApiError, CommentRequest, SearchRequest, VideoApi};
use ahash::AHashSet;
use anyhow::Result;
use std::fmt;
use std::time::Instant;

/// Why a fetch run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FetchStop {
    TargetReached,
    #[default]
    VideosExhausted,
}

impl fmt::Display for FetchStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FetchStop::TargetReached => "target reached",
            FetchStop::VideosExhausted => "videos exhausted",
        })
    }
}

/// A video whose comment pagination failed. Rows from earlier pages were kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedVideo {
    pub video_id: String,
    pub title: String,
    pub rows_kept: usize,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedQuery {
    pub query: String,
    pub error: String,
}

/// Candidate videos in fetch order plus any queries whose search failed.
#[derive(Clone, Debug, Default)]
pub struct Discovery {
    pub videos: Vec<Video>,
    pub failed_queries: Vec<FailedQuery>,
}

/// Result of fetching one video.
#[derive(Debug)]
pub struct VideoFetch {
    pub rows: Vec<RawComment>,
    pub pages: usize,
    pub error: Option<ApiError>,
}

#[derive(Clone, Debug, Default)]
pub struct FetchReport {
    pub domain: Option<Domain>,
    pub candidate_videos: usize,
    pub videos_fetched: usize,
    pub skipped: Vec<SkippedVideo>,
    pub failed_queries: Vec<FailedQuery>,
    pub rows_written: usize,
    pub checkpoints: usize,
    pub stop: FetchStop,
}

/// Drives a `VideoApi` through discovery and per-video pagination.
pub struct CommentFetcher<'a, A: VideoApi + ?Sized> {
    api: &'a A,
    opts: &'a FetchOptions,
    progress: bool,
}

impl<'a, A: VideoApi + ?Sized> CommentFetcher<'a, A> {
    pub fn new(api: &'a A, opts: &'a FetchOptions) -> Self {
        Self { api, opts, progress: false }
    }

    pub fn progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    /// Search every query, dedupe ids in first-seen order, optionally rank by views.
    /// A failing query stops its own pagination only.
    pub fn discover<S: AsRef<str>>(&self, queries: &[S]) -> Discovery {
        let mut seen: AHashSet<String> = AHashSet::new();
        let mut out = Discovery::default();

        for query in queries {
            let query = query.as_ref();
            let mut token: Option<String> = None;
            let mut found = 0usize;
            for page in 0..self.opts.search_pages {
                let req = SearchRequest {
                    query,
                    window: &self.opts.window,
                    order: self.opts.search_order,
                    page_size: self.opts.search_page_size,
                    page_token: token.as_deref(),
                    region_code: self.opts.region_code.as_deref(),
                    relevance_language: self.opts.relevance_language.as_deref(),
                };
                match self.api.search_videos(&req) {
                    Ok(result) => {
                        for video in result.videos {
                            if seen.insert(video.video_id.clone()) {
                                found += 1;
                                out.videos.push(video);
                            }
                        }
                        token = result.next_page_token;
                        if token.is_none() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(query, page, error = %err, "search failed; skipping rest of query");
                        out.failed_queries.push(FailedQuery { query: query.to_string(), error: err.to_string() });
                        break;
                    }
                }
            }
            tracing::debug!(query, new_videos = found, "search done");
        }

        if self.opts.rank_by_views {
            // stable: ties keep discovery order
            out.videos.sort_by(|a, b| b.view_count.unwrap_or(0).cmp(&a.view_count.unwrap_or(0)));
        }
        out
    }

    /// Paginate top-level comments of one video up to `per_video_limit`.
    pub fn fetch_video(&self, video: &Video, domain: Domain) -> VideoFetch {
        let limit = self.opts.per_video_limit;
        let mut rows: Vec<RawComment> = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        while rows.len() < limit {
            let remaining = limit - rows.len();
            let page_size = (self.opts.comment_page_size as usize).min(remaining).max(1) as u32;
            let req = CommentRequest {
                video_id: &video.video_id,
                page_size,
                order: self.opts.comment_order,
                page_token: token.as_deref(),
            };
            let page = match self.api.comment_threads(&req) {
                Ok(p) => p,
                Err(err) => return VideoFetch { rows, pages, error: Some(err) },
            };
            pages += 1;

            if page.comments.is_empty() && token.is_none() {
                break;
            }
            for c in page.comments.into_iter().take(remaining) {
                rows.push(RawComment {
                    video_id: video.video_id.clone(),
                    video_title: video.title.clone(),
                    video_published_at: video.published_at.clone(),
                    comment_id: c.comment_id,
                    published_at: c.published_at,
                    like_count: c.like_count,
                    text: c.text,
                    domain: Some(domain),
                });
            }

            match page.next_page_token {
                // a repeated token would never advance
                Some(next) if token.as_deref() != Some(next.as_str()) => token = Some(next),
                _ => break,
            }
        }
        VideoFetch { rows, pages, error: None }
    }

    /// Discover, then fetch videos in order until the target is met or candidates
    /// run out. `write` receives the identity-deduplicated accumulation on every
    /// checkpoint and once at the end, and returns how many rows it persisted.
    pub fn run<S, F>(&self, domain: Domain, queries: &[S], mut write: F) -> Result<FetchReport>
    where
        S: AsRef<str>,
        F: FnMut(&[&RawComment]) -> Result<usize>,
    {
        let discovery = self.discover(queries);
        let candidates = discovery.videos.len();
        tracing::info!(
            %domain,
            year = self.opts.window.year(),
            search_order = self.opts.search_order.as_api_str(),
            candidates,
            failed_queries = discovery.failed_queries.len(),
            "discovery finished"
        );

        let mut report = FetchReport {
            domain: Some(domain),
            candidate_videos: candidates,
            failed_queries: discovery.failed_queries,
            ..Default::default()
        };
        let target = self.opts.target_total;
        let mut all: Vec<RawComment> = Vec::new();
        let mut cp = self.opts.checkpoint.start(Instant::now());
        let pb = ProgressScope::count(format!("Fetching {domain} comments"), candidates as u64, self.progress);

        report.stop = if target == 0 { FetchStop::TargetReached } else { FetchStop::VideosExhausted };
        if target > 0 {
            for (i, video) in discovery.videos.iter().enumerate() {
                let fetched = self.fetch_video(video, domain);
                tracing::debug!(
                    video_id = %video.video_id,
                    pages = fetched.pages,
                    rows = fetched.rows.len(),
                    "video fetched"
                );
                pb.inc(1);
                report.videos_fetched += 1;

                if let Some(err) = fetched.error {
                    tracing::warn!(
                        video_id = %video.video_id,
                        reason = err.reason().unwrap_or("-"),
                        rows_kept = fetched.rows.len(),
                        error = %err,
                        "skipping video"
                    );
                    report.skipped.push(SkippedVideo {
                        video_id: video.video_id.clone(),
                        title: video.title.clone(),
                        rows_kept: fetched.rows.len(),
                        error: err.to_string(),
                    });
                }
                all.extend(fetched.rows);
                pb.set_message(format!("Fetching {domain} comments ({} rows)", all.len()));

                let now = Instant::now();
                if cp.due(all.len(), now) {
                    let written = write(&dedupe_by_identity(&all))?;
                    cp.mark(all.len(), now);
                    tracing::info!(%domain, rows = written, "checkpoint written");
                }

                if all.len() >= target {
                    report.stop = FetchStop::TargetReached;
                    break;
                }
                if i + 1 < candidates && !self.opts.sleep_between_videos.is_zero() {
                    std::thread::sleep(self.opts.sleep_between_videos);
                }
            }
        }

        report.rows_written = write(&dedupe_by_identity(&all))?;
        report.checkpoints = cp.flushes();
        pb.finish(format!("{domain}: {} rows", report.rows_written));
        tracing::info!(
            %domain,
            rows = report.rows_written,
            videos = report.videos_fetched,
            skipped = report.skipped.len(),
            stop = %report.stop,
            "fetch finished"
        );
        Ok(report)
    }
}
