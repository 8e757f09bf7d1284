//! Data models shared by the adapters, the summarizer and the aggregate document.
//!
//! - [`ContentItem`]: one normalized post, article or paper
//! - [`SourceResult`]: summary plus items for one (source type, query) pair
//! - [`Outcome`]: found / empty / failed, carried from adapters up to the driver
//! - [`AggregateDocument`]: the persisted JSON artifact
//!
//! Field names match the JSON document consumed by the dashboard, so
//! renaming a field here is a format change.

use crate::error::UnknownSourceType;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of content origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "google_news")]
    GoogleNews,
    #[serde(rename = "reddit")]
    Reddit,
    #[serde(rename = "hackernews")]
    HackerNews,
    #[serde(rename = "arxiv")]
    Arxiv,
}

impl SourceType {
    /// All source types in document order.
    pub const ALL: [SourceType; 4] = [
        SourceType::GoogleNews,
        SourceType::Reddit,
        SourceType::HackerNews,
        SourceType::Arxiv,
    ];

    /// Tag used in the document and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::GoogleNews => "google_news",
            SourceType::Reddit => "reddit",
            SourceType::HackerNews => "hackernews",
            SourceType::Arxiv => "arxiv",
        }
    }

    /// Human-readable platform name.
    pub fn display_name(self) -> &'static str {
        match self {
            SourceType::GoogleNews => "Google News",
            SourceType::Reddit => "Reddit",
            SourceType::HackerNews => "Hacker News",
            SourceType::Arxiv => "arXiv",
        }
    }

    /// Whether fetching from this source needs a query or community name.
    pub fn requires_query(self) -> bool {
        !matches!(self, SourceType::HackerNews)
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = UnknownSourceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownSourceType(s.to_string()))
    }
}

/// Label stamped on every Reddit item of a community.
pub fn reddit_label(community: &str) -> String {
    format!("Reddit - r/{community}")
}

/// One normalized item from any source.
///
/// Only `title`, `url` and `source` are set for every source type; the rest
/// depends on what the upstream API offers and is omitted from JSON when
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,
    pub url: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selftext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl ContentItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            published: None,
            summary: None,
            score: None,
            comments: None,
            selftext: None,
            authors: None,
            pdf_url: None,
        }
    }
}

/// Summary and items for one (source type, query) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub summary: String,
    pub content: Vec<ContentItem>,
}

/// Result of one pipeline step that distinguishes "nothing there" from "broke".
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Found(T),
    Empty,
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Outcome::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_found(&self) -> Option<&T> {
        match self {
            Outcome::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Overall state of an aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every planned pair was fetched, even if some came back empty.
    Success,
    /// At least one pair failed and is listed in `metadata.failures`.
    Partial,
}

/// Number of populated entries per source type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueriesProcessed {
    pub google_news: usize,
    pub reddit: usize,
    pub hackernews: usize,
    pub arxiv: usize,
}

/// A (source type, query) pair that failed during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub generated_at: DateTime<Utc>,
    pub status: RunStatus,
    #[serde(default)]
    pub queries_processed: QueriesProcessed,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SourceFailure>,
}

/// Per-source results keyed by query, in the order the queries were configured.
/// Hacker News is queryless and stored bare.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceData {
    #[serde(default)]
    pub google_news: IndexMap<String, SourceResult>,
    #[serde(default)]
    pub reddit: IndexMap<String, SourceResult>,
    #[serde(default, with = "bare_or_empty")]
    pub hackernews: Option<SourceResult>,
    #[serde(default)]
    pub arxiv: IndexMap<String, SourceResult>,
}

impl SourceData {
    /// The query-keyed map for a source type; `None` for Hacker News.
    pub fn keyed(&self, kind: SourceType) -> Option<&IndexMap<String, SourceResult>> {
        match kind {
            SourceType::GoogleNews => Some(&self.google_news),
            SourceType::Reddit => Some(&self.reddit),
            SourceType::HackerNews => None,
            SourceType::Arxiv => Some(&self.arxiv),
        }
    }

    fn keyed_mut(&mut self, kind: SourceType) -> Option<&mut IndexMap<String, SourceResult>> {
        match kind {
            SourceType::GoogleNews => Some(&mut self.google_news),
            SourceType::Reddit => Some(&mut self.reddit),
            SourceType::HackerNews => None,
            SourceType::Arxiv => Some(&mut self.arxiv),
        }
    }
}

/// The single JSON artifact produced by one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateDocument {
    pub metadata: Metadata,
    pub data: SourceData,
}

impl AggregateDocument {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            metadata: Metadata {
                generated_at,
                status: RunStatus::Success,
                queries_processed: QueriesProcessed::default(),
                failures: Vec::new(),
            },
            data: SourceData::default(),
        }
    }

    /// Store a result. Hacker News ignores `query`; the other sources key by it.
    pub fn insert(&mut self, kind: SourceType, query: Option<&str>, result: SourceResult) {
        match self.data.keyed_mut(kind) {
            Some(map) => {
                map.insert(query.unwrap_or_default().to_string(), result);
            }
            None => self.data.hackernews = Some(result),
        }
        self.refresh_metadata();
    }

    pub fn record_failure(&mut self, kind: SourceType, query: Option<&str>, reason: impl Into<String>) {
        self.metadata.failures.push(SourceFailure {
            source_type: kind,
            query: query.map(str::to_string),
            reason: reason.into(),
        });
        self.refresh_metadata();
    }

    fn refresh_metadata(&mut self) {
        self.metadata.queries_processed = QueriesProcessed {
            google_news: self.data.google_news.len(),
            reddit: self.data.reddit.len(),
            hackernews: usize::from(self.data.hackernews.is_some()),
            arxiv: self.data.arxiv.len(),
        };
        self.metadata.status = if self.metadata.failures.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::Partial
        };
    }
}

/// `Option<SourceResult>` written as the bare result, or `{}` when absent.
mod bare_or_empty {
    use super::SourceResult;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Result(SourceResult),
        Empty {},
    }

    pub fn serialize<S: Serializer>(value: &Option<SourceResult>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(result) => serde::Serialize::serialize(result, serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SourceResult>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Result(result) => Some(result),
            Repr::Empty {} => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_result(title: &str) -> SourceResult {
        SourceResult {
            summary: format!("about {title}"),
            content: vec![ContentItem::new(title, "https://example.com", "Hacker News")],
        }
    }

    #[test]
    fn test_source_type_tags() {
        for kind in SourceType::ALL {
            assert_eq!(kind.as_str().parse::<SourceType>(), Ok(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert_eq!(
            "twitter".parse::<SourceType>(),
            Err(UnknownSourceType("twitter".to_string()))
        );
    }

    #[test]
    fn test_only_hackernews_is_queryless() {
        assert!(SourceType::GoogleNews.requires_query());
        assert!(SourceType::Reddit.requires_query());
        assert!(SourceType::Arxiv.requires_query());
        assert!(!SourceType::HackerNews.requires_query());
    }

    #[test]
    fn test_content_item_omits_absent_fields() {
        let item = ContentItem::new("Title", "https://example.com", "Google News");
        let json = serde_json::to_value(&item).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(json.get("published").is_none());
        assert!(json.get("score").is_none());
    }

    #[test]
    fn test_published_is_iso8601() {
        let mut item = ContentItem::new("T", "u", "arXiv");
        item.published = Some(Utc.with_ymd_and_hms(2025, 5, 6, 14, 30, 0).unwrap());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["published"], "2025-05-06T14:30:00Z");
    }

    #[test]
    fn test_empty_hackernews_serializes_as_empty_object() {
        let doc = AggregateDocument::new(Utc::now());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["data"]["hackernews"], serde_json::json!({}));

        let back: AggregateDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back.data.hackernews, None);
    }

    #[test]
    fn test_hackernews_is_stored_bare() {
        let mut doc = AggregateDocument::new(Utc::now());
        doc.insert(SourceType::HackerNews, Some("ignored"), sample_result("Show HN"));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["data"]["hackernews"]["summary"], "about Show HN");
        assert_eq!(doc.metadata.queries_processed.hackernews, 1);

        let back: AggregateDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_queries_processed_counts_populated_entries() {
        let mut doc = AggregateDocument::new(Utc::now());
        doc.insert(SourceType::GoogleNews, Some("AI"), sample_result("a"));
        doc.insert(SourceType::GoogleNews, Some("Python"), sample_result("b"));
        doc.insert(SourceType::Reddit, Some("rust"), sample_result("c"));

        let counts = doc.metadata.queries_processed;
        assert_eq!(counts.google_news, 2);
        assert_eq!(counts.reddit, 1);
        assert_eq!(counts.hackernews, 0);
        assert_eq!(counts.arxiv, 0);
        assert_eq!(doc.metadata.status, RunStatus::Success);
    }

    #[test]
    fn test_queries_keep_insertion_order() {
        let mut doc = AggregateDocument::new(Utc::now());
        for query in ["Machine Learning", "MLOps", "Artificial Intelligence"] {
            doc.insert(SourceType::Arxiv, Some(query), sample_result(query));
        }
        let json = serde_json::to_string(&doc).unwrap();
        let ml = json.find("\"Machine Learning\":").unwrap();
        let mlops = json.find("\"MLOps\":").unwrap();
        let ai = json.find("\"Artificial Intelligence\":").unwrap();
        assert!(ml < mlops && mlops < ai);

        let back: AggregateDocument = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = back.data.arxiv.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Machine Learning", "MLOps", "Artificial Intelligence"]);
    }

    #[test]
    fn test_failure_marks_run_partial() {
        let mut doc = AggregateDocument::new(Utc::now());
        doc.record_failure(SourceType::Arxiv, Some("MLOps"), "HTTP 503");
        assert_eq!(doc.metadata.status, RunStatus::Partial);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["metadata"]["status"], "partial");
        assert_eq!(json["metadata"]["failures"][0]["source_type"], "arxiv");
        assert_eq!(json["metadata"]["failures"][0]["query"], "MLOps");
    }

    #[test]
    fn test_outcome_accessors() {
        let found: Outcome<u8> = Outcome::Found(3);
        assert!(found.is_found());
        assert_eq!(found.as_found(), Some(&3));
        assert!(Outcome::<u8>::Empty.is_empty());
        assert!(Outcome::<u8>::Failed("x".into()).is_failed());
        assert_eq!(Outcome::<u8>::Empty.found(), None);
    }
}
