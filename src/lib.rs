//! # tech_watch
//!
//! A technology-watch aggregator. It pulls recent items from Google News,
//! Reddit, Hacker News and arXiv for a fixed set of topics, summarizes each
//! (source, topic) batch with a hosted abstractive model, and writes one JSON
//! document for a dashboard to render.
//!
//! ## Architecture
//!
//! 1. **Fetching**: one [`sources::SourceAdapter`] per source type
//! 2. **Summarizing**: chunked calls to a [`inference::SummaryModel`]
//! 3. **Processing**: [`processor::SourceProcessor`] turns one pair into an [`models::Outcome`]
//! 4. **Aggregating**: [`aggregator::Aggregator`] fans pairs out on a bounded pool
//! 5. **Output**: the JSON document, plus an optional Markdown digest

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod outputs;
pub mod processor;
pub mod sources;
pub mod summarizer;
pub mod utils;
