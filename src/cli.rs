//! Command-line interface definitions for tech_watch.
//!
//! Credentials can be passed as flags or through the environment.

use crate::models::SourceType;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the tech_watch aggregator.
///
/// # Examples
///
/// ```sh
/// # Full run with the default topics, written to ./veille_tech.json
/// tech_watch
///
/// # Custom config plus a Markdown digest
/// tech_watch -c watch.yaml -o data/veille_tech.json -m data/veille_tech.md
///
/// # Inspect a single source
/// tech_watch --source arxiv --query MLOps
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the aggregate JSON document
    #[arg(short, long, default_value = "veille_tech.json")]
    pub output: PathBuf,

    /// Also write a Markdown digest to this path
    #[arg(short, long)]
    pub markdown_output: Option<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Process one source type and print its result instead of running everything
    #[arg(long)]
    pub source: Option<SourceType>,

    /// Query or community name for --source
    #[arg(long, requires = "source")]
    pub query: Option<String>,

    /// Maximum number of (source, query) pairs processed at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Reddit app client id
    #[arg(long, env = "REDDIT_CLIENT_ID")]
    pub reddit_client_id: Option<String>,

    /// Reddit app client secret
    #[arg(long, env = "REDDIT_CLIENT_SECRET", hide_env_values = true)]
    pub reddit_client_secret: Option<String>,

    /// User agent sent to the Reddit API
    #[arg(long, env = "REDDIT_USER_AGENT", default_value = "tech_watch/0.1 (news aggregator)")]
    pub reddit_user_agent: String,

    /// Hugging Face Inference API token
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    pub hf_api_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tech_watch"]);
        assert_eq!(cli.output, PathBuf::from("veille_tech.json"));
        assert_eq!(cli.markdown_output, None);
        assert_eq!(cli.source, None);
        assert_eq!(cli.concurrency, None);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["tech_watch", "-o", "/tmp/out.json", "-m", "/tmp/out.md", "-c", "watch.yaml"]);
        assert_eq!(cli.output, PathBuf::from("/tmp/out.json"));
        assert_eq!(cli.markdown_output, Some(PathBuf::from("/tmp/out.md")));
        assert_eq!(cli.config, Some(PathBuf::from("watch.yaml")));
    }

    #[test]
    fn test_cli_single_source() {
        let cli = Cli::parse_from(["tech_watch", "--source", "reddit", "--query", "rust", "--concurrency", "2"]);
        assert_eq!(cli.source, Some(SourceType::Reddit));
        assert_eq!(cli.query.as_deref(), Some("rust"));
        assert_eq!(cli.concurrency, Some(2));
    }

    #[test]
    fn test_cli_rejects_unknown_source() {
        assert!(Cli::try_parse_from(["tech_watch", "--source", "twitter"]).is_err());
    }

    #[test]
    fn test_cli_query_needs_source() {
        assert!(Cli::try_parse_from(["tech_watch", "--query", "rust"]).is_err());
    }
}
