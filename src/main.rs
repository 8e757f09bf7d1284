//! tech_watch binary: full aggregation run, or a single source with `--source`.
//!
//! ```sh
//! REDDIT_CLIENT_ID=... REDDIT_CLIENT_SECRET=... HF_API_TOKEN=... tech_watch -m veille_tech.md
//! ```

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tech_watch::aggregator::Aggregator;
use tech_watch::cli::Cli;
use tech_watch::config::Config;
use tech_watch::inference::{HuggingFaceModel, RetryModel};
use tech_watch::models::Outcome;
use tech_watch::outputs::markdown;
use tech_watch::processor::SourceProcessor;
use tech_watch::sources::arxiv::Arxiv;
use tech_watch::sources::google_news::GoogleNews;
use tech_watch::sources::hackernews::HackerNews;
use tech_watch::sources::reddit::{Reddit, RedditClient, RedditCredentials};
use tech_watch::sources::{Sources, http_client};
use tech_watch::summarizer::Summarizer;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("tech_watch starting up");

    let args = Cli::parse();
    debug!(output = %args.output.display(), source = ?args.source, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    config.validate()?;

    let processor = build_processor(&config, &args)?;

    if let Some(kind) = args.source {
        return match processor.process(kind, args.query.as_deref()).await {
            Outcome::Found(result) => {
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(())
            }
            Outcome::Empty => {
                warn!(source = %kind, "No items found");
                Ok(())
            }
            Outcome::Failed(reason) => {
                error!(source = %kind, %reason, "Source processing failed");
                Err(reason.into())
            }
        };
    }

    let aggregator = Aggregator::new(processor, config.queries.clone(), config.subreddits.clone())
        .with_concurrency(config.concurrency);
    let document = aggregator.run_all(&args.output).await?;

    if let Some(path) = &args.markdown_output {
        markdown::write_markdown(&document, path).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        elapsed_secs = elapsed.as_secs_f64(),
        status = ?document.metadata.status,
        failures = document.metadata.failures.len(),
        "Execution complete"
    );
    Ok(())
}

/// Wire the shared HTTP client, the four adapters and the summarizer.
fn build_processor(config: &Config, args: &Cli) -> Result<SourceProcessor, Box<dyn Error>> {
    let http = http_client(&config.http)?;

    let credentials = match (&args.reddit_client_id, &args.reddit_client_secret) {
        (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
            user_agent: args.reddit_user_agent.clone(),
        }),
        _ => {
            warn!("Reddit credentials not set; Reddit pairs will fail");
            None
        }
    };

    let sources = Sources {
        google_news: Box::new(GoogleNews::new(http.clone(), config.news_locale.clone())),
        reddit: Box::new(Reddit::new(RedditClient::new(http.clone(), credentials))),
        hackernews: Box::new(HackerNews::new(http.clone())),
        arxiv: Box::new(Arxiv::new(http.clone())),
    };

    if args.hf_api_token.is_none() {
        warn!("HF_API_TOKEN not set; using anonymous inference quota");
    }
    let summary = &config.summary;
    let model = RetryModel::new(
        HuggingFaceModel::new(http, &summary.endpoint, &summary.model, args.hf_api_token.clone()),
        summary.max_retries,
        Duration::from_millis(summary.retry_base_delay_ms),
    );
    info!(model = %summary.model, chunk_size = summary.chunk_size, "Summarizer ready");

    Ok(SourceProcessor::new(
        sources,
        Summarizer::new(Arc::new(model), summary.chunk_size),
        config.limits,
        summary.max_length,
        summary.min_length,
    )
    .with_clean_all_sources(config.clean_all_sources))
}
