#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use ytetl::{
    ApiError, ApiResult, CommentPage, CommentRequest, Domain, FetchOptions, LanguageDetector, RawComment,
    SearchOrder, SearchPage, SearchRequest, TopLevelComment, Video, VideoApi,
};

/// Failure modes the fake API can inject on a comment page.
#[derive(Clone, Copy, Debug)]
pub enum Failure {
    CommentsDisabled,
    QuotaExceeded,
    Network,
}

impl Failure {
    fn to_error(self) -> ApiError {
        match self {
            Failure::CommentsDisabled => ApiError::Api {
                status: 403,
                reason: "commentsDisabled".into(),
                message: "comments are disabled".into(),
            },
            Failure::QuotaExceeded => ApiError::Api {
                status: 403,
                reason: "quotaExceeded".into(),
                message: "quota exceeded".into(),
            },
            Failure::Network => ApiError::Network("connection reset".into()),
        }
    }
}

/// In-memory `VideoApi`.
///
/// Search pages are keyed by query, page tokens are page indices. Comment
/// tokens are row offsets, so page sizes requested by the fetcher are honored.
#[derive(Default)]
pub struct FakeApi {
    search: HashMap<String, Vec<Vec<Video>>>,
    search_fail: HashSet<String>,
    comments: HashMap<String, Vec<TopLevelComment>>,
    comment_fail: HashMap<String, (usize, Failure)>,
    watch: Option<PathBuf>,
    /// `(video_id, page_size, page_token)` per comment call, in order.
    pub comment_calls: Mutex<Vec<(String, u32, Option<String>)>>,
    /// `(query, page_token)` per search call, in order.
    pub search_calls: Mutex<Vec<(String, Option<String>)>>,
    /// `(order, window year)` per search call, in order.
    pub search_params: Mutex<Vec<(SearchOrder, i32)>>,
    /// Data rows in the watched file at each comment call (0 if absent).
    pub watched_rows: Mutex<Vec<usize>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, pages: Vec<Vec<Video>>) -> Self {
        self.search.insert(query.to_string(), pages);
        self
    }

    pub fn failing_search(mut self, query: &str) -> Self {
        self.search_fail.insert(query.to_string());
        self
    }

    /// `n` generated comments for `video_id`.
    pub fn with_comments(mut self, video_id: &str, n: usize) -> Self {
        let list = (0..n)
            .map(|i| TopLevelComment {
                comment_id: format!("{video_id}-c{i}"),
                published_at: "2025-03-01T00:00:00Z".into(),
                like_count: i as i64,
                text: format!("comment number {i} on {video_id}"),
            })
            .collect();
        self.comments.insert(video_id.to_string(), list);
        self
    }

    /// Fail the `page`-th (0-based) comment call for `video_id`.
    pub fn failing_comments(mut self, video_id: &str, page: usize, failure: Failure) -> Self {
        self.comment_fail.insert(video_id.to_string(), (page, failure));
        self
    }

    /// Record how many rows `path` holds whenever comments are requested.
    pub fn watch(mut self, path: &Path) -> Self {
        self.watch = Some(path.to_path_buf());
        self
    }

    pub fn comment_calls_for(&self, video_id: &str) -> Vec<(u32, Option<String>)> {
        self.comment_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(v, _, _)| v == video_id)
            .map(|(_, size, tok)| (*size, tok.clone()))
            .collect()
    }
}

impl VideoApi for FakeApi {
    fn search_videos(&self, req: &SearchRequest<'_>) -> ApiResult<SearchPage> {
        self.search_calls
            .lock()
            .unwrap()
            .push((req.query.to_string(), req.page_token.map(str::to_string)));
        self.search_params.lock().unwrap().push((req.order, req.window.year()));
        if self.search_fail.contains(req.query) {
            return Err(ApiError::Api { status: 400, reason: "badRequest".into(), message: "bad query".into() });
        }
        let Some(pages) = self.search.get(req.query) else {
            return Ok(SearchPage::default());
        };
        let idx: usize = req.page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let videos = pages.get(idx).cloned().unwrap_or_default();
        let next_page_token = (idx + 1 < pages.len()).then(|| (idx + 1).to_string());
        Ok(SearchPage { videos, next_page_token })
    }

    fn comment_threads(&self, req: &CommentRequest<'_>) -> ApiResult<CommentPage> {
        if let Some(path) = &self.watch {
            let rows = if path.exists() { read_csv_rows(path).len() } else { 0 };
            self.watched_rows.lock().unwrap().push(rows);
        }
        let call_idx = {
            let mut calls = self.comment_calls.lock().unwrap();
            let idx = calls.iter().filter(|(v, _, _)| v == req.video_id).count();
            calls.push((req.video_id.to_string(), req.page_size, req.page_token.map(str::to_string)));
            idx
        };
        if let Some((page, failure)) = self.comment_fail.get(req.video_id) {
            if *page == call_idx {
                return Err(failure.to_error());
            }
        }

        let all = self.comments.get(req.video_id).map(Vec::as_slice).unwrap_or(&[]);
        let start: usize = req.page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = (start + req.page_size as usize).min(all.len());
        let comments = all.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_page_token = (end < all.len()).then(|| end.to_string());
        Ok(CommentPage { comments, next_page_token })
    }
}

/// Detector for tests: "fr" when the text contains "bonjour", "en" when it
/// contains "hello", undecidable otherwise.
pub struct KeywordDetector;

impl LanguageDetector for KeywordDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let t = text.to_lowercase();
        if t.contains("bonjour") {
            Some("fr".into())
        } else if t.contains("hello") {
            Some("en".into())
        } else {
            None
        }
    }
}

pub fn video(id: &str, views: u64) -> Video {
    Video {
        video_id: id.to_string(),
        title: format!("Title of {id}"),
        published_at: "2025-01-15T12:00:00Z".to_string(),
        view_count: Some(views),
    }
}

pub fn raw(video_id: &str, comment_id: &str, text: &str) -> RawComment {
    RawComment {
        video_id: video_id.to_string(),
        video_title: format!("Title of {video_id}"),
        video_published_at: "2025-01-15T12:00:00Z".to_string(),
        comment_id: comment_id.to_string(),
        published_at: "2025-03-01T00:00:00Z".to_string(),
        like_count: 1,
        text: text.to_string(),
        domain: Some(Domain::Sneaker),
    }
}

/// Fetch options with no sleeping and a small search budget.
pub fn quick_fetch_opts() -> FetchOptions {
    FetchOptions::default()
        .with_sleep(Duration::ZERO)
        .with_search_pages(3)
}

/// Header row of a CSV file.
pub fn read_csv_header(path: &Path) -> Vec<String> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.headers().unwrap().iter().map(str::to_string).collect()
}

/// Data rows of a CSV file as column-name -> value maps.
pub fn read_csv_rows(path: &Path) -> Vec<HashMap<String, String>> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    rdr.records()
        .map(|r| {
            let r = r.unwrap();
            headers.iter().map(str::to_string).zip(r.iter().map(str::to_string)).collect()
        })
        .collect()
}
