//! The aggregation driver: plans every (source type, query) pair, runs them
//! on a bounded pool and writes the aggregate document.

use crate::error::AggregateError;
use crate::models::{AggregateDocument, Outcome, SourceResult, SourceType};
use crate::outputs::json;
use crate::processor::SourceProcessor;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, instrument};

/// One planned pair; `index` is its position in document key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub index: usize,
    pub kind: SourceType,
    pub query: Option<String>,
}

pub struct Aggregator {
    processor: SourceProcessor,
    queries: Vec<String>,
    subreddits: Vec<String>,
    concurrency: usize,
}

impl Aggregator {
    /// Create a sequential driver; see [`Aggregator::with_concurrency`].
    ///
    /// # Arguments
    ///
    /// * `processor` - Handles each (source type, query) pair
    /// * `queries` - Search terms for Google News and arXiv, in document order
    /// * `subreddits` - Community names for Reddit, in document order
    pub fn new(processor: SourceProcessor, queries: Vec<String>, subreddits: Vec<String>) -> Self {
        Self {
            processor,
            queries,
            subreddits,
            concurrency: 1,
        }
    }

    /// Maximum number of pairs in flight. One gives a strictly sequential run.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Pairs in key order: news queries, communities, Hacker News, arXiv queries.
    pub fn plan(&self) -> Vec<Task> {
        let news = self.queries.iter().map(|q| (SourceType::GoogleNews, Some(q.clone())));
        let reddit = self.subreddits.iter().map(|c| (SourceType::Reddit, Some(c.clone())));
        let hackernews = std::iter::once((SourceType::HackerNews, None));
        let arxiv = self.queries.iter().map(|q| (SourceType::Arxiv, Some(q.clone())));

        news.chain(reddit)
            .chain(hackernews)
            .chain(arxiv)
            .enumerate()
            .map(|(index, (kind, query))| Task { index, kind, query })
            .collect()
    }

    /// Run every planned pair and assemble the document without writing it.
    #[instrument(level = "info", skip(self), fields(concurrency = self.concurrency))]
    pub async fn collect(&self) -> AggregateDocument {
        let tasks = self.plan();
        info!(tasks = tasks.len(), "Starting aggregation");

        let finished: Vec<(Task, Outcome<SourceResult>)> = stream::iter(tasks)
            .map(|task| async move {
                let outcome = self.processor.process(task.kind, task.query.as_deref()).await;
                (task, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut document = AggregateDocument::new(Utc::now());
        let (mut found, mut empty, mut failed) = (0usize, 0usize, 0usize);
        for (task, outcome) in finished.into_iter().sorted_by_key(|(task, _)| task.index) {
            match outcome {
                Outcome::Found(result) => {
                    found += 1;
                    document.insert(task.kind, task.query.as_deref(), result);
                }
                Outcome::Empty => empty += 1,
                Outcome::Failed(reason) => {
                    failed += 1;
                    document.record_failure(task.kind, task.query.as_deref(), reason);
                }
            }
        }

        info!(found, empty, failed, status = ?document.metadata.status, "Aggregation finished");
        document
    }

    /// Run the whole pipeline and overwrite `path` with the result.
    ///
    /// Source failures are recorded in the document. Only a failure to write
    /// the file is returned as an error.
    ///
    /// # Arguments
    ///
    /// * `path` - Output file; parent directories are created when missing
    ///
    /// # Returns
    ///
    /// The document that was written, or [`AggregateError`] if serializing or
    /// writing it failed. Nothing is written on failure.
    #[instrument(level = "info", skip(self), fields(path = %path.display()))]
    pub async fn run_all(&self, path: &Path) -> Result<AggregateDocument, AggregateError> {
        let start = Instant::now();
        let document = self.collect().await;

        if let Err(e) = json::write_document(&document, path).await {
            error!(error = %e, "Failed to write aggregate document");
            return Err(e);
        }

        info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            queries_processed = ?document.metadata.queries_processed,
            "Aggregate document written"
        );
        Ok(document)
    }
}
