//! Text normalization, log helpers and filesystem checks.
//!
//! - [`clean_text`]: strips markup and stray punctuation from feed text
//! - [`collapse_whitespace`]: folds line-wrapped API text onto one line
//! - [`truncate_for_log`]: keeps long summaries out of log lines
//! - [`ensure_parent_dir`]: prepares the directory of an output file

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,!?-]").expect("valid character-class regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Clean free text from a feed.
///
/// Decodes HTML entities, removes markup tags, drops every character outside
/// word characters, whitespace and `.,!?-`, collapses whitespace runs to a
/// single space and trims the ends.
///
/// Whitespace is collapsed after characters are dropped, so the function is
/// idempotent: `clean_text(&clean_text(x)) == clean_text(x)`.
///
/// # Examples
///
/// ```
/// use tech_watch::utils::clean_text;
/// assert_eq!(clean_text("<b>Rust</b> &amp; <i>AI</i>!"), "Rust AI!");
/// ```
pub fn clean_text(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    let untagged = TAG_RE.replace_all(&decoded, "");
    let filtered = DISALLOWED_RE.replace_all(&untagged, "");
    WHITESPACE_RE.replace_all(&filtered, " ").trim().to_string()
}

/// Collapse every whitespace run to one space and trim.
///
/// Used for APIs that hard-wrap their text fields (arXiv titles and
/// abstracts) without otherwise touching the content.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary)
/// with an ellipsis and the number of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Make sure the directory that will hold `path` exists.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).await?;
            debug!(dir = %dir.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}
