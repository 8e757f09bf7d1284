//! One (source type, query) pair from fetch to summarized result.

use crate::config::SourceLimits;
use crate::models::{ContentItem, Outcome, SourceResult, SourceType};
use crate::sources::{Sources, fetch_outcome};
use crate::summarizer::{SUMMARY_ERROR, Summarizer};
use crate::utils::{clean_text, truncate_for_log};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, instrument, warn};

/// Fetches one pair through its adapter and summarizes the items.
///
/// Never returns an error: every failure is logged and reported as
/// [`Outcome::Failed`].
pub struct SourceProcessor {
    sources: Sources,
    summarizer: Summarizer,
    limits: SourceLimits,
    max_length: u32,
    min_length: u32,
    clean_all_sources: bool,
}

impl SourceProcessor {
    /// Create a processor with the cleaner limited to Google News.
    ///
    /// # Arguments
    ///
    /// * `sources` - One adapter per source type
    /// * `summarizer` - Summarizes each non-empty batch of items
    /// * `limits` - Item count requested from each source type
    /// * `max_length` / `min_length` - Summary length bounds passed to the model
    pub fn new(sources: Sources, summarizer: Summarizer, limits: SourceLimits, max_length: u32, min_length: u32) -> Self {
        Self {
            sources,
            summarizer,
            limits,
            max_length,
            min_length,
            clean_all_sources: false,
        }
    }

    /// Also run the text cleaner on Reddit, Hacker News and arXiv items.
    pub fn with_clean_all_sources(mut self, enabled: bool) -> Self {
        self.clean_all_sources = enabled;
        self
    }

    /// Process a pair given by its textual source tag.
    ///
    /// # Arguments
    ///
    /// * `source_type` - One of `google_news`, `reddit`, `hackernews`, `arxiv`
    /// * `query` - Search term or community; ignored for `hackernews`
    ///
    /// # Returns
    ///
    /// [`Outcome::Found`] with the summary and items, [`Outcome::Empty`] when
    /// the source had nothing, or [`Outcome::Failed`] for an unknown tag, a
    /// missing query, a fetch error or a panic.
    pub async fn process_source(&self, source_type: &str, query: Option<&str>) -> Outcome<SourceResult> {
        match source_type.parse::<SourceType>() {
            Ok(kind) => self.process(kind, query).await,
            Err(e) => {
                error!(source_type, error = %e, "Unknown source type");
                Outcome::Failed(e.to_string())
            }
        }
    }

    #[instrument(level = "info", skip(self), fields(source = %kind))]
    pub async fn process(&self, kind: SourceType, query: Option<&str>) -> Outcome<SourceResult> {
        if kind.requires_query() && query.is_none_or(|q| q.trim().is_empty()) {
            error!("Query is required for this source");
            return Outcome::Failed(format!("{kind} requires a query"));
        }

        match AssertUnwindSafe(self.run(kind, query)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(reason = %reason, "Processing panicked");
                Outcome::Failed(format!("panic: {reason}"))
            }
        }
    }

    async fn run(&self, kind: SourceType, query: Option<&str>) -> Outcome<SourceResult> {
        let adapter = self.sources.adapter(kind);
        let mut content = match fetch_outcome(adapter, query, self.limits.for_kind(kind)).await {
            Outcome::Found(items) => items,
            Outcome::Empty => return Outcome::Empty,
            Outcome::Failed(reason) => return Outcome::Failed(reason),
        };

        if self.clean_all_sources && kind != SourceType::GoogleNews {
            content.iter_mut().for_each(clean_item);
        }

        let summary = match self
            .summarizer
            .summarize(&content, self.max_length, self.min_length)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Summarization failed; storing placeholder summary");
                SUMMARY_ERROR.to_string()
            }
        };
        if summary.is_empty() {
            warn!("Summarizer produced an empty summary");
        }

        info!(
            items = content.len(),
            summary = %truncate_for_log(&summary, 120),
            "Processed source"
        );
        Outcome::Found(SourceResult { summary, content })
    }
}

fn clean_item(item: &mut ContentItem) {
    item.title = clean_text(&item.title);
    for field in [&mut item.summary, &mut item.selftext] {
        if let Some(text) = field.as_mut() {
            *text = clean_text(text);
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::sources::SourceAdapter;
    use crate::sources::testing::{StubSource, stub_sources};
    use crate::summarizer::testing::EchoModel;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct PanickingSource;

    #[async_trait]
    impl SourceAdapter for PanickingSource {
        fn kind(&self) -> SourceType {
            SourceType::Arxiv
        }

        async fn fetch(&self, _query: Option<&str>, _limit: usize) -> Result<Vec<ContentItem>, SourceError> {
            panic!("feed exploded")
        }
    }

    fn processor(sources: Sources, model: Arc<EchoModel>) -> SourceProcessor {
        SourceProcessor::new(sources, Summarizer::new(model, 1000), SourceLimits::default(), 300, 100)
    }

    #[tokio::test]
    async fn test_news_pair_end_to_end() {
        let model = Arc::new(EchoModel::default());
        let processor = processor(stub_sources(&["AI breakthrough", "ML conference"]), model.clone());

        let result = processor
            .process_source("google_news", Some("AI"))
            .await
            .found()
            .expect("news result");
        let titles: Vec<&str> = result.content.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["AI breakthrough", "ML conference"]);
        assert!(!result.summary.is_empty());
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_hackernews_limit_and_label() {
        let titles = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let mut sources = stub_sources(&titles);
        sources.hackernews = Box::new(StubSource::with_titles(SourceType::HackerNews, &titles));
        let mut limits = SourceLimits::default();
        limits.hackernews = 5;
        let processor = SourceProcessor::new(
            sources,
            Summarizer::new(Arc::new(EchoModel::default()), 1000),
            limits,
            300,
            100,
        );

        let result = processor.process(SourceType::HackerNews, None).await.found().unwrap();
        assert_eq!(result.content.len(), 5);
        assert!(result.content.iter().all(|i| i.source == "Hacker News"));
    }

    #[tokio::test]
    async fn test_unknown_source_type_fails_softly() {
        let model = Arc::new(EchoModel::default());
        let processor = processor(stub_sources(&["x"]), model.clone());

        let outcome = processor.process_source("twitter", Some("AI")).await;
        assert!(matches!(outcome, Outcome::Failed(ref reason) if reason.contains("twitter")));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_source_never_summarizes() {
        let model = Arc::new(EchoModel::default());
        let mut sources = stub_sources(&["x"]);
        sources.arxiv = Box::new(StubSource::empty(SourceType::Arxiv));
        let processor = processor(sources, model.clone());

        assert!(processor.process_source("arxiv", Some("MLOps")).await.is_empty());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_query_fails_without_fetching() {
        let processor = processor(stub_sources(&["x"]), Arc::new(EchoModel::default()));
        assert!(processor.process(SourceType::Reddit, None).await.is_failed());
        assert!(processor.process(SourceType::GoogleNews, Some("  ")).await.is_failed());
    }

    #[tokio::test]
    async fn test_adapter_failure_is_reported() {
        let mut sources = stub_sources(&["x"]);
        sources.reddit = Box::new(StubSource::failing(SourceType::Reddit, "token rejected"));
        let processor = processor(sources, Arc::new(EchoModel::default()));

        match processor.process(SourceType::Reddit, Some("rust")).await {
            Outcome::Failed(reason) => assert!(reason.contains("token rejected")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_summarizer_failure_keeps_content() {
        let processor = processor(stub_sources(&["AI breakthrough"]), Arc::new(EchoModel::failing_on(1)));

        let result = processor.process(SourceType::GoogleNews, Some("AI")).await.found().unwrap();
        assert_eq!(result.summary, SUMMARY_ERROR);
        assert_eq!(result.content.len(), 1);
    }

    #[tokio::test]
    async fn test_adapter_panic_becomes_failure() {
        let mut sources = stub_sources(&["x"]);
        sources.arxiv = Box::new(PanickingSource);
        let processor = processor(sources, Arc::new(EchoModel::default()));

        match processor.process(SourceType::Arxiv, Some("AI")).await {
            Outcome::Failed(reason) => assert!(reason.contains("feed exploded")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clean_all_sources_switch() {
        let titles = ["<b>Rust</b> &amp; friends"];
        let model = Arc::new(EchoModel::default());

        let raw = processor(stub_sources(&titles), model.clone());
        let result = raw.process(SourceType::Reddit, Some("rust")).await.found().unwrap();
        assert_eq!(result.content[0].title, "<b>Rust</b> &amp; friends");

        let cleaning = processor(stub_sources(&titles), model).with_clean_all_sources(true);
        let result = cleaning.process(SourceType::Reddit, Some("rust")).await.found().unwrap();
        assert_eq!(result.content[0].title, "Rust friends");
    }
}
