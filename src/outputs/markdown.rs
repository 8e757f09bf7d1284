//! Markdown digest of an [`AggregateDocument`].
//!
//! One section per platform, one subsection per query or community with its
//! summary, then every item with its metadata and a link.

use crate::error::AggregateError;
use crate::models::{AggregateDocument, ContentItem, SourceResult, SourceType};
use crate::utils::ensure_parent_dir;
use std::fmt::{self, Write};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Render the whole document as Markdown.
pub fn document_to_markdown(document: &AggregateDocument) -> String {
    let mut md = String::new();
    // Writing into a String cannot fail.
    let _ = render_document(document, &mut md);
    md
}

pub fn render_document<W: Write>(document: &AggregateDocument, out: &mut W) -> fmt::Result {
    writeln!(out, "# Tech Watch\n")?;
    writeln!(
        out,
        "_Last updated: {}_\n",
        document.metadata.generated_at.format("%Y-%m-%d %H:%M UTC")
    )?;

    for kind in SourceType::ALL {
        writeln!(out, "## {}\n", kind.display_name())?;
        match document.data.keyed(kind) {
            Some(map) if map.is_empty() => writeln!(out, "_No results._\n")?,
            Some(map) => {
                for (query, result) in map {
                    let heading = match kind {
                        SourceType::Reddit => format!("r/{query}"),
                        _ => query.clone(),
                    };
                    render_result(out, &heading, result)?;
                }
            }
            None => match &document.data.hackernews {
                Some(result) => render_result(out, "Top Stories", result)?,
                None => writeln!(out, "_No results._\n")?,
            },
        }
    }

    if !document.metadata.failures.is_empty() {
        writeln!(out, "## Failures\n")?;
        for failure in &document.metadata.failures {
            match &failure.query {
                Some(query) => writeln!(out, "- {} `{}`: {}", failure.source_type.display_name(), query, failure.reason)?,
                None => writeln!(out, "- {}: {}", failure.source_type.display_name(), failure.reason)?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_result<W: Write>(out: &mut W, heading: &str, result: &SourceResult) -> fmt::Result {
    writeln!(out, "### {heading}\n")?;
    writeln!(out, "**Summary:** {}\n", result.summary)?;
    for item in &result.content {
        render_item(out, item)?;
    }
    Ok(())
}

fn render_item<W: Write>(out: &mut W, item: &ContentItem) -> fmt::Result {
    writeln!(out, "#### {}\n", item.title)?;
    writeln!(out, "- Source: {}", item.source)?;
    if let Some(published) = item.published {
        writeln!(out, "- Published: {}", published.to_rfc3339())?;
    }
    if let Some(authors) = item.authors.as_ref().filter(|a| !a.is_empty()) {
        writeln!(out, "- Authors: {}", authors.join(", "))?;
    }
    if let Some(score) = item.score {
        writeln!(out, "- Score: {} | Comments: {}", score, item.comments.unwrap_or_default())?;
    }
    if let Some(summary) = item.summary.as_deref().filter(|s| !s.is_empty()) {
        writeln!(out, "- Summary: {summary}")?;
    }
    if let Some(pdf) = &item.pdf_url {
        writeln!(out, "- [PDF]({pdf})")?;
    }
    writeln!(out, "\n[Read More]({})\n", item.url)
}

/// Write the Markdown digest of `document` to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_markdown(document: &AggregateDocument, path: &Path) -> Result<(), AggregateError> {
    let io_err = |source| AggregateError::Io {
        path: path.display().to_string(),
        source,
    };
    let md = document_to_markdown(document);
    ensure_parent_dir(path).await.map_err(io_err)?;
    fs::write(path, &md).await.map_err(io_err)?;
    info!(bytes = md.len(), "Wrote Markdown digest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn result(summary: &str, item: ContentItem) -> SourceResult {
        SourceResult {
            summary: summary.to_string(),
            content: vec![item],
        }
    }

    fn sample() -> AggregateDocument {
        let mut doc = AggregateDocument::new(Utc.with_ymd_and_hms(2025, 5, 6, 8, 0, 0).unwrap());

        let mut post = ContentItem::new("[R] New paper", "https://reddit.com/1", "Reddit - r/MachineLearning");
        post.score = Some(310);
        post.comments = Some(55);
        doc.insert(SourceType::Reddit, Some("MachineLearning"), result("Reddit digest", post));

        let news = ContentItem::new("AI breakthrough", "https://news.example/ai", "Google News");
        doc.insert(SourceType::GoogleNews, Some("AI"), result("News digest", news));

        let mut paper = ContentItem::new("Pipelines", "http://arxiv.org/abs/1", "arXiv");
        paper.authors = Some(vec!["Ada Lovelace".into(), "Alan Turing".into()]);
        paper.pdf_url = Some("http://arxiv.org/pdf/1".into());
        doc.insert(SourceType::Arxiv, Some("MLOps"), result("Paper digest", paper));

        doc.record_failure(SourceType::Arxiv, Some("Python"), "HTTP 503");
        doc
    }

    #[test]
    fn test_lists_every_query_with_its_summary() {
        let md = document_to_markdown(&sample());
        assert!(md.starts_with("# Tech Watch\n\n_Last updated: 2025-05-06 08:00 UTC_"));
        assert!(md.contains("### AI\n\n**Summary:** News digest"));
        assert!(md.contains("### r/MachineLearning\n\n**Summary:** Reddit digest"));
        assert!(md.contains("### MLOps\n\n**Summary:** Paper digest"));
        assert!(md.contains("[Read More](https://news.example/ai)"));
    }

    #[test]
    fn test_item_metadata() {
        let md = document_to_markdown(&sample());
        assert!(md.contains("- Score: 310 | Comments: 55"));
        assert!(md.contains("- Authors: Ada Lovelace, Alan Turing"));
        assert!(md.contains("- [PDF](http://arxiv.org/pdf/1)"));
    }

    #[test]
    fn test_sections_follow_platform_order() {
        let md = document_to_markdown(&sample());
        let positions: Vec<usize> = ["## Google News", "## Reddit", "## Hacker News", "## arXiv", "## Failures"]
            .iter()
            .map(|h| md.find(h).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(md.contains("## Hacker News\n\n_No results._"));
        assert!(md.contains("- arXiv `Python`: HTTP 503"));
    }

    #[tokio::test]
    async fn test_write_markdown_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digest").join("veille_tech.md");
        write_markdown(&sample(), &path).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("News digest"));
    }
}
