//! arXiv adapter over the Atom query API, newest submissions first.

use super::{SourceAdapter, get_ok, require_query};
use crate::error::SourceError;
use crate::models::{ContentItem, SourceType};
use crate::utils::collapse_whitespace;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

const QUERY_URL: &str = "https://export.arxiv.org/api/query";

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    summary: Option<String>,
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
    #[serde(rename = "link", default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@title")]
    title: Option<String>,
}

pub struct Arxiv {
    http: Client,
}

impl Arxiv {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

/// Query URL sorted by submission date, newest first.
pub fn query_url(query: &str, limit: usize) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        QUERY_URL,
        &[
            ("search_query", query),
            ("start", "0"),
            ("max_results", &limit.to_string()),
            ("sortBy", "submittedDate"),
            ("sortOrder", "descending"),
        ],
    )
}

#[async_trait]
impl SourceAdapter for Arxiv {
    fn kind(&self) -> SourceType {
        SourceType::Arxiv
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, query: Option<&str>, limit: usize) -> Result<Vec<ContentItem>, SourceError> {
        let query = require_query(self.kind(), query)?;
        let url = query_url(query, limit)?;
        let xml = get_ok(&self.http, url.as_str()).await?.text().await?;
        debug!(bytes = xml.len(), "Downloaded arXiv feed");
        parse_feed(&xml, limit)
    }
}

/// Parse an arXiv Atom document into at most `limit` items.
///
/// arXiv reports query errors as a single entry whose id points at
/// `/api/errors`; that entry becomes [`SourceError::Api`].
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<ContentItem>, SourceError> {
    let feed: Feed = from_str(xml)?;
    if let Some(entry) = feed.entries.iter().find(|e| e.id.contains("/api/errors")) {
        let reason = entry.summary.as_deref().unwrap_or(entry.title.as_str());
        return Err(SourceError::Api(collapse_whitespace(reason)));
    }

    Ok(feed
        .entries
        .into_iter()
        .take(limit)
        .map(|entry| {
            let pdf_url = entry
                .links
                .iter()
                .find(|link| link.title.as_deref() == Some("pdf"))
                .map(|link| link.href.clone());
            let mut item = ContentItem::new(
                collapse_whitespace(&entry.title),
                entry.id,
                SourceType::Arxiv.display_name(),
            );
            item.summary = entry.summary.as_deref().map(collapse_whitespace);
            item.published = entry
                .published
                .as_deref()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
                .map(|dt| dt.with_timezone(&Utc));
            item.authors = Some(entry.authors.into_iter().map(|a| a.name).collect());
            item.pdf_url = pdf_url;
            item
        })
        .collect())
}
