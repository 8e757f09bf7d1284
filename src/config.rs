//! Run configuration loaded from an optional YAML file.
//!
//! Every key is optional; anything left out falls back to [`Config::default`],
//! which reproduces the stock tech-watch setup (seven topics, six
//! subreddits, BART summaries of 100 to 300 tokens).
//!
//! ```yaml
//! queries: ["Rust", "WebAssembly"]
//! subreddits: ["rust"]
//! limits:
//!   hackernews: 5
//! summary:
//!   chunk_size: 800
//! concurrency: 2
//! ```

use crate::error::ConfigError;
use crate::models::SourceType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

/// How many items each adapter asks its upstream for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLimits {
    pub google_news: usize,
    pub reddit: usize,
    pub hackernews: usize,
    pub arxiv: usize,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            google_news: 5,
            reddit: 10,
            hackernews: 10,
            arxiv: 10,
        }
    }
}

impl SourceLimits {
    pub fn for_kind(&self, kind: SourceType) -> usize {
        match kind {
            SourceType::GoogleNews => self.google_news,
            SourceType::Reddit => self.reddit,
            SourceType::HackerNews => self.hackernews,
            SourceType::Arxiv => self.arxiv,
        }
    }
}

/// Summarization model and batching parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Base URL of the inference API; the model id is appended.
    pub endpoint: String,
    pub model: String,
    pub max_length: u32,
    pub min_length: u32,
    /// Characters per chunk sent to the model.
    pub chunk_size: usize,
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model: "facebook/bart-large-cnn".to_string(),
            max_length: 300,
            min_length: 100,
            chunk_size: 1000,
            max_retries: 2,
            retry_base_delay_ms: 1000,
        }
    }
}

/// Locale parameters appended to the Google News search URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsLocale {
    pub hl: String,
    pub gl: String,
    pub ceid: String,
}

impl Default for NewsLocale {
    fn default() -> Self {
        Self {
            hl: "fr".to_string(),
            gl: "FR".to_string(),
            ceid: "FR:fr".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("tech_watch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search terms used for Google News and arXiv.
    pub queries: Vec<String>,
    /// Community names used for Reddit.
    pub subreddits: Vec<String>,
    pub limits: SourceLimits,
    pub summary: SummaryConfig,
    pub news_locale: NewsLocale,
    pub http: HttpConfig,
    /// Maximum number of (source, query) pairs processed at once.
    pub concurrency: usize,
    /// Run the text cleaner on every source instead of Google News only.
    pub clean_all_sources: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queries: [
                "Machine Learning",
                "MLOps",
                "Technology",
                "Data Engineering",
                "Data Science",
                "Python",
                "Artificial Intelligence",
            ]
            .map(String::from)
            .to_vec(),
            subreddits: [
                "MachineLearning",
                "MLOps",
                "technology",
                "dataengineering",
                "datascience",
                "Python",
            ]
            .map(String::from)
            .to_vec(),
            limits: SourceLimits::default(),
            summary: SummaryConfig::default(),
            news_locale: NewsLocale::default(),
            http: HttpConfig::default(),
            concurrency: 4,
            clean_all_sources: false,
        }
    }
}

impl Config {
    /// Read and validate a YAML config file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        info!(
            queries = config.queries.len(),
            subreddits = config.subreddits.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.summary.chunk_size == 0 {
            return Err(ConfigError::Invalid("summary.chunk_size must be positive".into()));
        }
        if self.summary.min_length > self.summary.max_length {
            return Err(ConfigError::Invalid(format!(
                "summary.min_length ({}) exceeds summary.max_length ({})",
                self.summary.min_length, self.summary.max_length
            )));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be positive".into()));
        }
        Ok(())
    }
}
