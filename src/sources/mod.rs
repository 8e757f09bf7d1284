//! Source adapters that turn external feeds and APIs into [`ContentItem`]s.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Google News | [`google_news`] | RSS search feed | Locale-qualified, text is cleaned |
//! | Reddit | [`reddit`] | OAuth JSON API | Hot posts of one community |
//! | Hacker News | [`hackernews`] | Firebase JSON API | Queryless, one request per story |
//! | arXiv | [`arxiv`] | Atom query API | Newest submissions first |
//!
//! # Common Patterns
//!
//! Each adapter implements [`SourceAdapter::fetch`] and returns items in the
//! upstream's own ranking. Adapters never retry: one failed request fails the
//! whole call. [`fetch_outcome`] logs the failure and folds it into an
//! [`Outcome`] so callers never see an error.

pub mod arxiv;
pub mod google_news;
pub mod hackernews;
pub mod reddit;

use crate::config::HttpConfig;
use crate::error::SourceError;
use crate::models::{ContentItem, Outcome, SourceType};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// One external content origin.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The source type this adapter serves.
    fn kind(&self) -> SourceType;

    /// Fetch at most `limit` items for `query`, in upstream order.
    ///
    /// Queryless sources ignore `query`; the others fail with
    /// [`SourceError::MissingQuery`] when it is absent.
    async fn fetch(&self, query: Option<&str>, limit: usize) -> Result<Vec<ContentItem>, SourceError>;
}

/// The four adapters, one per [`SourceType`].
pub struct Sources {
    pub google_news: Box<dyn SourceAdapter>,
    pub reddit: Box<dyn SourceAdapter>,
    pub hackernews: Box<dyn SourceAdapter>,
    pub arxiv: Box<dyn SourceAdapter>,
}

impl Sources {
    pub fn adapter(&self, kind: SourceType) -> &dyn SourceAdapter {
        match kind {
            SourceType::GoogleNews => self.google_news.as_ref(),
            SourceType::Reddit => self.reddit.as_ref(),
            SourceType::HackerNews => self.hackernews.as_ref(),
            SourceType::Arxiv => self.arxiv.as_ref(),
        }
    }
}

/// Run an adapter and classify the result, logging failures.
///
/// An empty item list becomes [`Outcome::Empty`]; an error becomes
/// [`Outcome::Failed`] carrying the error text.
#[instrument(level = "info", skip_all, fields(source = %adapter.kind(), query = query.unwrap_or("-"), limit = limit))]
pub async fn fetch_outcome(adapter: &dyn SourceAdapter, query: Option<&str>, limit: usize) -> Outcome<Vec<ContentItem>> {
    match adapter.fetch(query, limit).await {
        Ok(items) if items.is_empty() => {
            warn!("Source returned no items");
            Outcome::Empty
        }
        Ok(items) => {
            info!(count = items.len(), "Fetched items");
            Outcome::Found(items)
        }
        Err(e) => {
            error!(error = %e, "Source fetch failed");
            Outcome::Failed(e.to_string())
        }
    }
}

/// Build the HTTP client shared by every adapter and the inference client.
pub fn http_client(config: &HttpConfig) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
}

/// GET `url` and turn non-2xx answers into [`SourceError::Status`].
pub(crate) async fn get_ok(http: &Client, url: &str) -> Result<Response, SourceError> {
    let response = http.get(url).send().await?;
    ensure_success(url, response)
}

pub(crate) fn ensure_success(url: &str, response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Reject a missing or blank query for sources that need one.
pub(crate) fn require_query(kind: SourceType, query: Option<&str>) -> Result<&str, SourceError> {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => Ok(q),
        _ => Err(SourceError::MissingQuery(kind)),
    }
}
