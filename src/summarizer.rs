//! Batch summarization of a source's items.
//!
//! The text of every item is concatenated, cut into fixed-size chunks that
//! fit the model's input window, and each chunk is summarized on its own.
//! The partial summaries are joined in chunk order; there is no second
//! summary-of-summaries pass.

use crate::error::SummarizeError;
use crate::inference::{SummaryModel, SummaryParams};
use crate::models::ContentItem;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Summary stored in place of a real one when the model fails.
pub const SUMMARY_ERROR: &str = "Error generating summary";

/// Concatenate `title selftext summary` for every item, in item order.
pub fn item_text(items: &[ContentItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "{} {} {}",
                item.title,
                item.selftext.as_deref().unwrap_or_default(),
                item.summary.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split `text` into contiguous chunks of at most `chunk_size` characters.
///
/// Boundaries are purely positional and may fall mid-word, but never inside a
/// UTF-8 code point. Concatenating the chunks gives back `text`. A
/// `chunk_size` of zero is treated as one.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<&str> {
    let size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(text.len() / size + 1);
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Chunked summarizer over a [`SummaryModel`].
#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn SummaryModel>,
    chunk_size: usize,
}

impl Summarizer {
    /// Create a summarizer over `model`.
    ///
    /// # Arguments
    ///
    /// * `model` - The model called once per non-blank chunk
    /// * `chunk_size` - Characters per chunk; zero is treated as one
    pub fn new(model: Arc<dyn SummaryModel>, chunk_size: usize) -> Self {
        Self { model, chunk_size }
    }

    /// Summarize `items` with the given length bounds.
    ///
    /// Whitespace-only chunks are skipped. The first failing chunk aborts
    /// the whole call; no partial summary is returned.
    ///
    /// # Arguments
    ///
    /// * `items` - Items whose title, selftext and summary are summarized together
    /// * `max_length` - Upper bound on each chunk summary, in model tokens
    /// * `min_length` - Lower bound on each chunk summary, in model tokens
    ///
    /// # Returns
    ///
    /// The chunk summaries joined by single spaces, in chunk order. Empty when
    /// the items hold no text.
    #[instrument(level = "info", skip_all, fields(items = items.len(), max_length = max_length))]
    pub async fn summarize(
        &self,
        items: &[ContentItem],
        max_length: u32,
        min_length: u32,
    ) -> Result<String, SummarizeError> {
        let params = SummaryParams {
            max_length,
            min_length,
        };
        let text = item_text(items);
        let chunks = chunk_text(&text, self.chunk_size);
        let total = chunks.len();
        debug!(chars = text.chars().count(), chunks = total, "Prepared summary input");

        let mut summaries = Vec::with_capacity(total);
        for (index, chunk) in chunks.into_iter().enumerate() {
            if chunk.trim().is_empty() {
                continue;
            }
            let summary = self
                .model
                .summarize(chunk, params)
                .await
                .map_err(|source| SummarizeError::Chunk { index, total, source })?;
            let summary = summary.trim();
            if !summary.is_empty() {
                summaries.push(summary.to_string());
            }
        }

        info!(chunks = total, summarized = summaries.len(), "Summary generated");
        Ok(summaries.join(" "))
    }
}
