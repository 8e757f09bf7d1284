//! Google News RSS search adapter.
//!
//! Builds a locale-qualified search URL such as
//! `https://news.google.com/rss/search?q=Machine+Learning&hl=fr&gl=FR&ceid=FR%3Afr`,
//! parses the RSS 2.0 answer and cleans titles and descriptions, which
//! Google ships as escaped HTML.

use super::{SourceAdapter, get_ok, require_query};
use crate::config::NewsLocale;
use crate::error::SourceError;
use crate::models::{ContentItem, SourceType};
use crate::utils::clean_text;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

const SEARCH_URL: &str = "https://news.google.com/rss/search";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

pub struct GoogleNews {
    http: Client,
    locale: NewsLocale,
}

impl GoogleNews {
    pub fn new(http: Client, locale: NewsLocale) -> Self {
        Self { http, locale }
    }

    /// Search feed URL for `query` with the configured locale.
    pub fn search_url(&self, query: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            SEARCH_URL,
            &[
                ("q", query),
                ("hl", self.locale.hl.as_str()),
                ("gl", self.locale.gl.as_str()),
                ("ceid", self.locale.ceid.as_str()),
            ],
        )
    }
}

#[async_trait]
impl SourceAdapter for GoogleNews {
    fn kind(&self) -> SourceType {
        SourceType::GoogleNews
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, query: Option<&str>, limit: usize) -> Result<Vec<ContentItem>, SourceError> {
        let query = require_query(self.kind(), query)?;
        let url = self.search_url(query)?;
        let xml = get_ok(&self.http, url.as_str()).await?.text().await?;
        debug!(bytes = xml.len(), "Downloaded news feed");

        let items = parse_feed(&xml, limit)?;
        if items.is_empty() {
            warn!(query, "No articles found");
        }
        Ok(items)
    }
}

/// Parse an RSS document into at most `limit` cleaned items.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<ContentItem>, SourceError> {
    let rss: Rss = from_str(xml)?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .take(limit)
        .map(|item| {
            let mut out = ContentItem::new(
                clean_text(item.title.as_deref().unwrap_or_default()),
                item.link.unwrap_or_default(),
                SourceType::GoogleNews.display_name(),
            );
            out.published = item.pub_date.as_deref().and_then(parse_rfc2822);
            out.summary = Some(clean_text(item.description.as_deref().unwrap_or_default()));
            out
        })
        .collect())
}

fn parse_rfc2822(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            debug!(raw, error = %e, "Unparseable pubDate");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FEED: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <generator>NFE/5.0</generator>
    <title>"AI" - Google Actualités</title>
    <link>https://news.google.com/search?q=AI</link>
    <language>fr</language>
    <description>Google Actualités</description>
    <item>
      <title>AI breakthrough - Le Monde</title>
      <link>https://news.google.com/rss/articles/one</link>
      <guid isPermaLink="false">one</guid>
      <pubDate>Tue, 06 May 2025 14:30:00 GMT</pubDate>
      <description>&lt;a href="https://news.google.com/rss/articles/one" target="_blank"&gt;AI breakthrough&lt;/a&gt;&amp;nbsp;&amp;nbsp;&lt;font color="#6f6f6f"&gt;Le Monde&lt;/font&gt;</description>
      <source url="https://www.lemonde.fr">Le Monde</source>
    </item>
    <item>
      <title>ML conference: what's new?</title>
      <link>https://news.google.com/rss/articles/two</link>
      <guid isPermaLink="false">two</guid>
      <pubDate>not a date</pubDate>
      <description>Plain text</description>
      <source url="https://example.org">Example</source>
    </item>
    <item>
      <title>Third</title>
      <link>https://news.google.com/rss/articles/three</link>
    </item>
  </channel>
</rss>"##;

    #[test]
    fn test_parse_feed_maps_and_cleans_items() {
        let items = parse_feed(FEED, 5).unwrap();
        assert_eq!(items.len(), 3);

        let first = &items[0];
        assert_eq!(first.title, "AI breakthrough - Le Monde");
        assert_eq!(first.url, "https://news.google.com/rss/articles/one");
        assert_eq!(first.source, "Google News");
        assert_eq!(first.summary.as_deref(), Some("AI breakthrough Le Monde"));
        assert_eq!(
            first.published,
            Some(Utc.with_ymd_and_hms(2025, 5, 6, 14, 30, 0).unwrap())
        );

        assert_eq!(items[1].title, "ML conference whats new?");
        assert_eq!(items[1].published, None);
        assert_eq!(items[2].summary.as_deref(), Some(""));
    }

    #[test]
    fn test_parse_feed_respects_limit_and_order() {
        let items = parse_feed(FEED, 2).unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["AI breakthrough - Le Monde", "ML conference whats new?"]);
    }

    #[test]
    fn test_parse_feed_without_items() {
        let xml = "<rss><channel><title>empty</title></channel></rss>";
        assert!(parse_feed(xml, 5).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(matches!(parse_feed("<html><body>", 5), Err(SourceError::Xml(_))));
    }

    #[test]
    fn test_search_url_is_locale_qualified() {
        let adapter = GoogleNews::new(Client::new(), NewsLocale::default());
        let url = adapter.search_url("Machine Learning").unwrap();
        assert_eq!(
            url.as_str(),
            "https://news.google.com/rss/search?q=Machine+Learning&hl=fr&gl=FR&ceid=FR%3Afr"
        );
    }

    #[tokio::test]
    async fn test_fetch_requires_query() {
        let adapter = GoogleNews::new(Client::new(), NewsLocale::default());
        let err = adapter.fetch(None, 5).await.unwrap_err();
        assert!(matches!(err, SourceError::MissingQuery(SourceType::GoogleNews)));
    }
}
