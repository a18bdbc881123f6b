//! YouTube Data API v3 client: video search and top-level comment threads.
//!
//! `VideoApi` is the seam the fetcher depends on; `YouTubeClient` is the
//! blocking HTTP implementation.

use crate::config::{CommentOrder, SearchOrder};
use crate::date::PublishWindow;
use crate::model::Video;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const USER_AGENT: &str = concat!("ytetl/", env!("CARGO_PKG_VERSION"));

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error {status} ({reason}): {message}")]
    Api { status: u16, reason: String, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("missing YOUTUBE_API_KEY (set it in the environment or in .env)")]
    MissingApiKey,
}

impl ApiError {
    /// Machine-readable reason from the error body, e.g. `commentsDisabled`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ApiError::Api { reason, .. } => Some(reason.as_str()),
            _ => None,
        }
    }
    pub fn is_comments_disabled(&self) -> bool {
        self.reason() == Some("commentsDisabled")
    }
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self.reason(), Some("quotaExceeded" | "dailyLimitExceeded" | "rateLimitExceeded"))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // the request URL carries the API key
        ApiError::Network(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub window: &'a PublishWindow,
    pub order: SearchOrder,
    pub page_size: u32,
    pub page_token: Option<&'a str>,
    pub region_code: Option<&'a str>,
    pub relevance_language: Option<&'a str>,
}

#[derive(Clone, Debug, Default)]
pub struct SearchPage {
    pub videos: Vec<Video>,
    pub next_page_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CommentRequest<'a> {
    pub video_id: &'a str,
    pub page_size: u32,
    pub order: CommentOrder,
    pub page_token: Option<&'a str>,
}

/// A top-level comment as returned by the API, before it is tied to a video row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopLevelComment {
    pub comment_id: String,
    pub published_at: String,
    pub like_count: i64,
    pub text: String,
}

#[derive(Clone, Debug, Default)]
pub struct CommentPage {
    pub comments: Vec<TopLevelComment>,
    pub next_page_token: Option<String>,
}

/// The two calls discovery and fetching need. Implementations block.
pub trait VideoApi {
    /// One page of search results, with title/publish time/view count filled in.
    fn search_videos(&self, req: &SearchRequest<'_>) -> ApiResult<SearchPage>;
    /// One page of top-level comment threads (replies are not expanded).
    fn comment_threads(&self, req: &CommentRequest<'_>) -> ApiResult<CommentPage>;
}

pub struct YouTubeClient {
    http: reqwest::blocking::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> ApiResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ApiError::MissingApiKey);
        }
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, api_key })
    }

    /// Read the key from `YOUTUBE_API_KEY`. Callers load `.env` beforehand.
    pub fn from_env() -> ApiResult<Self> {
        let key = std::env::var(API_KEY_ENV).map_err(|_| ApiError::MissingApiKey)?;
        Self::new(key)
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> ApiResult<T> {
        let url = format!("{BASE_URL}/{endpoint}");
        let resp = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()?;

        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(api_error_from_body(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Metadata for up to 50 ids in one call. Ids the API doesn't return
    /// (private, deleted) are absent from the map.
    fn videos_by_id(&self, ids: &[String]) -> ApiResult<HashMap<String, Video>> {
        let mut out = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(50) {
            let params = [("part", "snippet,statistics".to_string()), ("id", chunk.join(","))];
            let resp: VideoListResponse = self.get("videos", &params)?;
            for item in resp.items {
                let video = item.into_video();
                out.insert(video.video_id.clone(), video);
            }
        }
        Ok(out)
    }
}

impl VideoApi for YouTubeClient {
    fn search_videos(&self, req: &SearchRequest<'_>) -> ApiResult<SearchPage> {
        let mut params = vec![
            ("part", "id".to_string()),
            ("type", "video".to_string()),
            ("q", req.query.to_string()),
            ("maxResults", req.page_size.clamp(1, 50).to_string()),
            ("order", req.order.as_api_str().to_string()),
            ("publishedAfter", req.window.after_rfc3339()),
            ("publishedBefore", req.window.before_rfc3339()),
        ];
        if let Some(token) = req.page_token {
            params.push(("pageToken", token.to_string()));
        }
        if let Some(region) = req.region_code {
            params.push(("regionCode", region.to_string()));
        }
        if let Some(lang) = req.relevance_language {
            params.push(("relevanceLanguage", lang.to_string()));
        }

        let resp: SearchListResponse = self.get("search", &params)?;
        let next_page_token = resp.next_page_token.clone();
        let ids = resp.video_ids();
        if ids.is_empty() {
            return Ok(SearchPage { videos: Vec::new(), next_page_token });
        }

        let mut meta = self.videos_by_id(&ids)?;
        let videos = ids.iter().filter_map(|id| meta.remove(id)).collect();
        Ok(SearchPage { videos, next_page_token })
    }

    fn comment_threads(&self, req: &CommentRequest<'_>) -> ApiResult<CommentPage> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("videoId", req.video_id.to_string()),
            ("maxResults", req.page_size.clamp(1, 100).to_string()),
            ("order", req.order.as_api_str().to_string()),
            ("textFormat", "plainText".to_string()),
        ];
        if let Some(token) = req.page_token {
            params.push(("pageToken", token.to_string()));
        }
        let resp: CommentThreadListResponse = self.get("commentThreads", &params)?;
        Ok(resp.into_page())
    }
}

// -------- wire format --------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct SearchResult {
    id: SearchResultId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: Option<String>,
}

impl SearchListResponse {
    /// Video ids in result order, without repeats.
    fn video_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.items.len());
        for id in self.items.iter().filter_map(|it| it.id.video_id.as_ref()) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}

#[derive(Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Deserialize)]
struct VideoResource {
    id: String,
    snippet: Option<VideoSnippet>,
    statistics: Option<VideoStatistics>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    published_at: String,
}

// counts arrive as decimal strings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
}

impl VideoResource {
    fn into_video(self) -> Video {
        let (title, published_at) = self
            .snippet
            .map(|s| (s.title, s.published_at))
            .unwrap_or_default();
        Video {
            video_id: self.id,
            title,
            published_at,
            view_count: self.statistics.and_then(|s| s.view_count).and_then(|v| v.parse().ok()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: CommentResource,
}

#[derive(Deserialize)]
struct CommentResource {
    id: String,
    snippet: CommentSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    like_count: i64,
}

impl CommentThreadListResponse {
    fn into_page(self) -> CommentPage {
        let comments = self
            .items
            .into_iter()
            .map(|t| {
                let c = t.snippet.top_level_comment;
                TopLevelComment {
                    comment_id: c.id,
                    published_at: c.snippet.published_at,
                    like_count: c.snippet.like_count,
                    text: c.snippet.text_display,
                }
            })
            .collect();
        CommentPage { comments, next_page_token: self.next_page_token }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    #[serde(default)]
    reason: String,
}

fn api_error_from_body(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => ApiError::Api {
            status,
            reason: env
                .error
                .errors
                .into_iter()
                .map(|e| e.reason)
                .find(|r| !r.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            message: env.error.message,
        },
        Err(_) => ApiError::Api {
            status,
            reason: "unknown".to_string(),
            message: body.chars().take(200).collect(),
        },
    }
}
