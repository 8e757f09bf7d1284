//! Reddit adapter: the "hot" listing of one community.
//!
//! Uses app-only OAuth (`client_credentials`). The [`RedditClient`] is built
//! once from explicit credentials and handed to the adapter, so tests and
//! alternative deployments can inject their own.

use super::{SourceAdapter, ensure_success, require_query};
use crate::error::SourceError;
use crate::models::{ContentItem, SourceType, reddit_label};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Script-app credentials for the Reddit API.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expiry")]
    expires_in: u64,
}

fn default_expiry() -> u64 {
    3600
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    selftext: String,
}

/// Authenticated Reddit API client with a cached bearer token.
pub struct RedditClient {
    http: Client,
    credentials: Option<RedditCredentials>,
    token: Mutex<Option<CachedToken>>,
}

impl RedditClient {
    /// A client without credentials fails every call with
    /// [`SourceError::MissingCredentials`].
    pub fn new(http: Client, credentials: Option<RedditCredentials>) -> Self {
        Self {
            http,
            credentials,
            token: Mutex::new(None),
        }
    }

    fn credentials(&self) -> Result<&RedditCredentials, SourceError> {
        self.credentials
            .as_ref()
            .ok_or(SourceError::MissingCredentials(SourceType::Reddit))
    }

    /// Current bearer token, fetching a fresh one when missing or expired.
    #[instrument(level = "debug", skip_all)]
    async fn bearer(&self) -> Result<String, SourceError> {
        let creds = self.credentials()?;
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .header(reqwest::header::USER_AGENT, &creds.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Auth(format!("token endpoint answered HTTP {status}")));
        }
        let token: TokenResponse = response.json().await?;
        info!(expires_in = token.expires_in, "Obtained Reddit access token");

        // Refresh a minute early so a token never expires mid-request.
        let lifetime = Duration::from_secs(token.expires_in.saturating_sub(60));
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    /// The `limit` hottest posts of `community`, in listing order.
    #[instrument(level = "info", skip(self))]
    pub async fn hot(&self, community: &str, limit: usize) -> Result<Vec<ContentItem>, SourceError> {
        let token = self.bearer().await?;
        let creds = self.credentials()?;
        let url = hot_url(community, limit);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, &creds.user_agent)
            .send()
            .await?;
        let body = ensure_success(&url, response)?.text().await?;
        debug!(bytes = body.len(), "Downloaded listing");
        parse_listing(&body, community, limit)
    }
}

pub fn hot_url(community: &str, limit: usize) -> String {
    format!("{API_BASE}/r/{}/hot?limit={limit}", urlencoding::encode(community))
}

/// Map a listing JSON document to content items.
///
/// # Arguments
///
/// * `body` - Raw JSON of a `/r/{community}/hot` listing
/// * `community` - Community name, used for each item's `source` label
/// * `limit` - Maximum number of posts to keep
///
/// # Returns
///
/// Posts in listing order, or [`SourceError::Json`] when `body` is not a
/// listing.
pub fn parse_listing(body: &str, community: &str, limit: usize) -> Result<Vec<ContentItem>, SourceError> {
    let listing: Listing = serde_json::from_str(body)?;
    let label = reddit_label(community);
    Ok(listing
        .data
        .children
        .into_iter()
        .take(limit)
        .map(|child| {
            let post = child.data;
            let mut item = ContentItem::new(post.title, post.url, label.clone());
            item.score = Some(post.score);
            item.comments = Some(post.num_comments);
            item.published = DateTime::<Utc>::from_timestamp(post.created_utc as i64, 0);
            item.selftext = Some(post.selftext);
            item
        })
        .collect())
}

/// Adapter over an injected [`RedditClient`]; the query is the community name.
pub struct Reddit {
    client: RedditClient,
}

impl Reddit {
    pub fn new(client: RedditClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for Reddit {
    fn kind(&self) -> SourceType {
        SourceType::Reddit
    }

    async fn fetch(&self, query: Option<&str>, limit: usize) -> Result<Vec<ContentItem>, SourceError> {
        let community = require_query(self.kind(), query)?;
        self.client.hot(community, limit).await
    }
}
