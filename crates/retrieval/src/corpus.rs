//! Corpus pack loading.
//!
//! The pack is a JSON document with per-language source docs, each
//! split into citable chunks. It is immutable once loaded.

use palisade_core::error::RetrievalError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The static collection of passages available to the retrieval engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusPack {
    #[serde(default)]
    pub docs: Vec<CorpusDoc>,
}

/// One source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDoc {
    /// Language tag; untagged docs match every query language.
    #[serde(default)]
    pub lang: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub chunks: Vec<CorpusChunk>,
}

/// One citable passage within a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusChunk {
    pub id: String,
    pub text: String,
}

impl CorpusPack {
    /// Load and parse the pack from `path`.
    pub async fn load(path: &Path) -> Result<Self, RetrievalError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RetrievalError::CorpusUnavailable(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw).map_err(|e| RetrievalError::MalformedPack(e.to_string()))
    }

    /// Total passage count across all docs.
    pub fn passage_count(&self) -> usize {
        self.docs.iter().map(|d| d.chunks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_minimal_pack() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"docs":[{{"title":"Pricing","chunks":[{{"id":"p1","text":"Plans start at $5."}}]}}]}}"#
        )
        .unwrap();

        let pack = CorpusPack::load(file.path()).await.unwrap();
        assert_eq!(pack.passage_count(), 1);
        assert!(pack.docs[0].lang.is_none());
        assert_eq!(pack.docs[0].chunks[0].id, "p1");
    }

    #[tokio::test]
    async fn malformed_pack_is_distinguished() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = CorpusPack::load(file.path()).await.unwrap_err();
        assert!(matches!(err, RetrievalError::MalformedPack(_)));
    }
}
