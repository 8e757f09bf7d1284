//! Error types for each layer of the pipeline.
//!
//! Adapters, the inference client and the summarizer all have their own
//! error enum. None of them escapes the [`SourceProcessor`](crate::processor::SourceProcessor):
//! they are logged and folded into an [`Outcome`](crate::models::Outcome).
//! Only [`AggregateError`] and [`ConfigError`] reach `main`.

use crate::models::SourceType;
use thiserror::Error;

/// Failure while fetching or decoding items from one external source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("feed parse error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0} requires a query")]
    MissingQuery(SourceType),

    #[error("no credentials configured for {0}")]
    MissingCredentials(SourceType),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("upstream API error: {0}")]
    Api(String),
}

/// Failure talking to the text-summarization service.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference service answered with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("inference service returned no summary")]
    EmptyResponse,
}

/// Failure while summarizing a batch of items.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("chunk {index} of {total} failed: {source}")]
    Chunk {
        index: usize,
        total: usize,
        #[source]
        source: InferenceError,
    },
}

/// A source tag outside the closed set of known source types.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown source type: {0}")]
pub struct UnknownSourceType(pub String);

/// Fatal failure of an aggregation run.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure loading the YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
