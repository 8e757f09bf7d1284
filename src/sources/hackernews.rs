//! Hacker News adapter over the public Firebase API.
//!
//! Fetches the top-stories id list, then one item request per id, one after
//! the other, until enough live stories are collected. A failed item request
//! fails the whole call.

use super::{SourceAdapter, get_ok};
use crate::error::SourceError;
use crate::models::{ContentItem, SourceType};
use crate::utils::collapse_whitespace;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

const API_BASE: &str = "https://hacker-news.firebaseio.com/v0";

#[derive(Debug, Deserialize)]
struct Story {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    descendants: i64,
    #[serde(default)]
    time: i64,
    #[serde(default)]
    text: String,
}

pub struct HackerNews {
    http: Client,
}

impl HackerNews {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    #[instrument(level = "debug", skip(self))]
    async fn story(&self, id: u64) -> Result<Option<ContentItem>, SourceError> {
        let url = format!("{API_BASE}/item/{id}.json");
        let body = get_ok(&self.http, &url).await?.text().await?;
        let story = parse_story(&body)?;
        if story.is_none() {
            warn!(id, "Story no longer exists; skipping");
        }
        Ok(story)
    }
}

#[async_trait]
impl SourceAdapter for HackerNews {
    fn kind(&self) -> SourceType {
        SourceType::HackerNews
    }

    #[instrument(level = "info", skip(self, _query))]
    async fn fetch(&self, _query: Option<&str>, limit: usize) -> Result<Vec<ContentItem>, SourceError> {
        let url = format!("{API_BASE}/topstories.json");
        let body = get_ok(&self.http, &url).await?.text().await?;
        let ids = parse_top_ids(&body)?;
        debug!(available = ids.len(), "Fetched top story ids");

        let items = collect_live(ids, limit, |id| self.story(id)).await?;
        info!(count = items.len(), "Fetched Hacker News stories");
        Ok(items)
    }
}

/// Fetch stories one id at a time until `limit` live stories are collected.
///
/// # Arguments
///
/// * `ids` - Story ids in ranking order
/// * `limit` - Number of live stories wanted
/// * `fetch` - Loads one story; `Ok(None)` marks a deleted item
///
/// # Returns
///
/// Up to `limit` stories in ranking order. Deleted items are skipped and
/// replaced by the next ids, so fewer than `limit` come back only when the
/// id list runs out. The first failed fetch fails the whole call.
pub(crate) async fn collect_live<F, Fut>(ids: Vec<u64>, limit: usize, fetch: F) -> Result<Vec<ContentItem>, SourceError>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Option<ContentItem>, SourceError>>,
{
    stream::iter(ids)
        .then(fetch)
        .try_filter_map(|story| future::ready(Ok(story)))
        .take(limit)
        .try_collect()
        .await
}

/// Parse the `topstories.json` body.
///
/// # Arguments
///
/// * `body` - A JSON array of item ids
///
/// # Returns
///
/// The ids in ranking order, best first.
pub fn parse_top_ids(body: &str) -> Result<Vec<u64>, SourceError> {
    Ok(serde_json::from_str(body)?)
}

/// Map one item document; `null` (deleted item) yields `None`.
pub fn parse_story(body: &str) -> Result<Option<ContentItem>, SourceError> {
    let story: Option<Story> = serde_json::from_str(body)?;
    Ok(story.map(|story| {
        let mut item = ContentItem::new(story.title, story.url, SourceType::HackerNews.display_name());
        item.score = Some(story.score);
        item.comments = Some(story.descendants);
        item.published = DateTime::<Utc>::from_timestamp(story.time, 0);
        item.selftext = Some(html_to_text(&story.text));
        item
    }))
}

/// Render the HTML fragment of an item's `text` as plain text.
pub fn html_to_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}
