//! JSON persistence of the [`AggregateDocument`].
//!
//! The document is pretty-printed with four-space indentation and non-ASCII
//! text kept verbatim. Each run replaces the whole file.

use crate::error::AggregateError;
use crate::models::AggregateDocument;
use crate::utils::ensure_parent_dir;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Serialize `document` with four-space indentation.
pub fn to_pretty_json(document: &AggregateDocument) -> Result<Vec<u8>, AggregateError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    document.serialize(&mut serializer)?;
    Ok(buf)
}

/// Overwrite `path` with `document`, creating parent directories as needed.
///
/// # Arguments
///
/// * `document` - The aggregate document to persist
/// * `path` - Destination file
///
/// # Returns
///
/// `Ok(())` on success, or [`AggregateError::Io`] naming the path when the
/// directory or the file cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_document(document: &AggregateDocument, path: &Path) -> Result<(), AggregateError> {
    let io_err = |source| AggregateError::Io {
        path: path.display().to_string(),
        source,
    };
    let json = to_pretty_json(document)?;

    ensure_parent_dir(path).await.map_err(io_err)?;
    fs::write(path, &json).await.map_err(io_err)?;
    info!(bytes = json.len(), "Wrote aggregate document");
    Ok(())
}

/// Load a previously written document; `Ok(None)` when the file does not exist.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_document(path: &Path) -> Result<Option<AggregateDocument>, AggregateError> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("No aggregate document yet");
            return Ok(None);
        }
        Err(source) => {
            return Err(AggregateError::Io {
                path: path.display().to_string(),
                source,
            });
        }
    };
    Ok(Some(serde_json::from_slice(&raw)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentItem, SourceResult, SourceType};
    use chrono::Utc;

    fn sample() -> AggregateDocument {
        let mut doc = AggregateDocument::new(Utc::now());
        doc.insert(
            SourceType::GoogleNews,
            Some("Machine Learning"),
            SourceResult {
                summary: "Résumé des actualités".into(),
                content: vec![ContentItem::new("Apprentissage é", "https://example.com", "Google News")],
            },
        );
        doc
    }

    #[test]
    fn test_pretty_json_uses_four_spaces_and_raw_unicode() {
        let text = String::from_utf8(to_pretty_json(&sample()).unwrap()).unwrap();
        assert!(text.starts_with("{\n    \"metadata\": {\n        \"generated_at\""));
        assert!(text.contains("Résumé des actualités"));
        assert!(!text.contains("\\u00e9"));
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("veille_tech.json");
        let doc = sample();

        write_document(&doc, &path).await.unwrap();
        let loaded = load_document(&path).await.unwrap();
        assert_eq!(loaded, Some(doc));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_document(&dir.path().join("absent.json")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_document(&path).await, Err(AggregateError::Serialize(_))));
    }
}
