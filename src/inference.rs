//! Text-summarization model access with exponential backoff retry logic.
//!
//! # Architecture
//!
//! - [`SummaryModel`]: core trait, one chunk of text in, one summary out
//! - [`HuggingFaceModel`]: hosted inference API (BART by default)
//! - [`RetryModel`]: decorator that adds retry logic to any `SummaryModel`
//!
//! # Retry Strategy
//!
//! - Configurable number of retries
//! - Exponential backoff from a base delay, capped at 30 seconds
//! - Random jitter (0-250ms) added to every delay

use crate::error::InferenceError;
use async_trait::async_trait;
use rand::{Rng, rng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Generation bounds passed to the model for every chunk.
///
/// Decoding is always deterministic (no sampling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryParams {
    pub max_length: u32,
    pub min_length: u32,
}

/// An abstractive summarization model.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    /// Summarize one chunk of text.
    async fn summarize(&self, text: &str, params: SummaryParams) -> Result<String, InferenceError>;
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct InferenceSummary {
    summary_text: String,
}

/// Summarization through the Hugging Face Inference API.
///
/// Sends `POST {endpoint}/{model}` with the chunk as `inputs` and reads the
/// first `summary_text` of the response array.
pub struct HuggingFaceModel {
    http: Client,
    url: String,
    token: Option<String>,
}

impl HuggingFaceModel {
    pub fn new(http: Client, endpoint: &str, model: &str, token: Option<String>) -> Self {
        Self {
            http,
            url: format!("{}/{}", endpoint.trim_end_matches('/'), model),
            token,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for HuggingFaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceModel")
            .field("url", &self.url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

#[async_trait]
impl SummaryModel for HuggingFaceModel {
    #[instrument(level = "debug", skip_all, fields(url = %self.url, chars = text.chars().count()))]
    async fn summarize(&self, text: &str, params: SummaryParams) -> Result<String, InferenceError> {
        let t0 = Instant::now();
        let body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                max_length: params.max_length,
                min_length: params.min_length,
                do_sample: false,
            },
            options: InferenceOptions { wait_for_model: true },
        };

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), elapsed_ms = t0.elapsed().as_millis(), "Inference call failed");
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let summaries: Vec<InferenceSummary> = response.json().await?;
        debug!(elapsed_ms = t0.elapsed().as_millis(), "Inference call succeeded");
        summaries
            .into_iter()
            .next()
            .map(|s| s.summary_text)
            .ok_or(InferenceError::EmptyResponse)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`SummaryModel`].
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryModel<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryModel<T>
where
    T: SummaryModel,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryModel")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

#[async_trait]
impl<T> SummaryModel for RetryModel<T>
where
    T: SummaryModel,
{
    #[instrument(level = "debug", skip_all)]
    async fn summarize(&self, text: &str, params: SummaryParams) -> Result<String, InferenceError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.summarize(text, params).await {
                Ok(summary) => return Ok(summary),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "summarize() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "summarize() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
