//! Lexical passage retrieval for Palisade.
//!
//! A corpus pack of passages is indexed once per process with BM25
//! statistics; queries are answered either with full BM25 ranking (the
//! extractive tier) or a cheaper term-overlap ranking (grounding for
//! the local generative tier). Answers are extractive only: verbatim
//! passages plus citation markers, never paraphrase.

pub mod corpus;
pub mod drafter;
pub mod index;

pub use corpus::{CorpusChunk, CorpusDoc, CorpusPack};
pub use drafter::{DraftOptions, Drafter};
pub use index::{Passage, RankMode, RetrievalIndex, ScoredPassage};

use palisade_core::error::RetrievalError;
use std::path::PathBuf;
use tokio::sync::OnceCell;

/// A lazily-built, process-lifetime retrieval index.
///
/// The corpus file is read and indexed on the first retrieval request
/// and cached afterwards; it is never partially rebuilt.
pub struct SharedIndex {
    corpus_path: PathBuf,
    cell: OnceCell<RetrievalIndex>,
}

impl SharedIndex {
    pub fn new(corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            cell: OnceCell::new(),
        }
    }

    /// Wrap an already-built index (in-memory corpora, tests).
    pub fn preloaded(index: RetrievalIndex) -> Self {
        Self {
            corpus_path: PathBuf::new(),
            cell: OnceCell::new_with(Some(index)),
        }
    }

    /// Get the index, building it on first use.
    pub async fn get(&self) -> Result<&RetrievalIndex, RetrievalError> {
        self.cell
            .get_or_try_init(|| async {
                let pack = CorpusPack::load(&self.corpus_path).await?;
                tracing::info!(
                    path = %self.corpus_path.display(),
                    docs = pack.docs.len(),
                    "corpus pack loaded"
                );
                Ok(RetrievalIndex::build(&pack))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn shared_index_builds_once_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"docs":[{{"lang":"en","title":"T","url":"u","chunks":[{{"id":"a1","text":"hello world"}}]}}]}}"#
        )
        .unwrap();

        let shared = SharedIndex::new(file.path());
        let first = shared.get().await.unwrap() as *const RetrievalIndex;
        let second = shared.get().await.unwrap() as *const RetrievalIndex;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_corpus_is_unavailable() {
        let shared = SharedIndex::new("/definitely/not/here.json");
        let err = shared.get().await.unwrap_err();
        assert!(matches!(err, RetrievalError::CorpusUnavailable(_)));
    }
}
