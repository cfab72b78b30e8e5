//! Extractive answer drafting.
//!
//! Composes answers exclusively from verbatim passages plus citation
//! markers. When the ranking does not clear the quality gate the
//! drafter returns nothing and the orchestrator falls through to the
//! next tier.

use crate::index::{RankMode, RetrievalIndex, ScoredPassage};
use serde::{Deserialize, Serialize};

/// Ranked passages considered for an answer.
const TOP_K: usize = 5;
/// At most this many passages are cited in one answer.
const MAX_CITED: usize = 4;

/// Quality gate for drafting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftOptions {
    /// Minimum BM25 score a passage must clear.
    pub bm25_min: f64,
    /// How many passages must clear `bm25_min` for an answer to exist.
    pub coverage_needed: usize,
}

impl Default for DraftOptions {
    fn default() -> Self {
        Self {
            bm25_min: 0.6,
            coverage_needed: 2,
        }
    }
}

/// Drafts extractive answers from an index.
pub struct Drafter<'a> {
    index: &'a RetrievalIndex,
}

impl<'a> Drafter<'a> {
    pub fn new(index: &'a RetrievalIndex) -> Self {
        Self { index }
    }

    /// Try to draft an extractive answer. `None` means the quality
    /// gate failed and the next tier should be attempted.
    pub fn draft(&self, query: &str, language: &str, options: &DraftOptions) -> Option<String> {
        let ranked = self.index.rank(query, language, RankMode::Bm25);
        let top: Vec<ScoredPassage<'_>> = ranked.into_iter().take(TOP_K).collect();

        let top_score = top.first().map(|s| s.score).unwrap_or(0.0);
        let coverage = top.iter().filter(|s| s.score >= options.bm25_min).count();
        if top_score < options.bm25_min || coverage < options.coverage_needed {
            tracing::debug!(top_score, coverage, "extractive draft below quality gate");
            return None;
        }

        let lines: Vec<String> = top
            .iter()
            .filter(|s| s.score >= options.bm25_min)
            .take(MAX_CITED)
            .map(|s| format!("{} [#{}]", s.passage.text, s.passage.id))
            .collect();

        Some(format!("{}\n\n{}", lead_in(language), lines.join("\n\n")))
    }

    /// Up to `MAX_CITED` strongly matching passages for grounding the
    /// local generative tier. Uses the cheap overlap scorer.
    pub fn strong_passages(&self, query: &str, language: &str) -> Vec<ScoredPassage<'_>> {
        self.index
            .rank(query, language, RankMode::Overlap)
            .into_iter()
            .take(MAX_CITED)
            .collect()
    }
}

fn lead_in(language: &str) -> &'static str {
    match language {
        "es" => "Basado en el contenido recuperado:",
        _ => "Based on retrieved content:",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusChunk, CorpusDoc, CorpusPack};

    fn index() -> RetrievalIndex {
        RetrievalIndex::build(&CorpusPack {
            docs: vec![CorpusDoc {
                lang: Some("en".into()),
                title: "Help".into(),
                url: "https://example.com/help".into(),
                chunks: vec![
                    CorpusChunk {
                        id: "h1".into(),
                        text: "Shipping takes three business days.".into(),
                    },
                    CorpusChunk {
                        id: "h2".into(),
                        text: "Express shipping arrives in one business day.".into(),
                    },
                    CorpusChunk {
                        id: "h3".into(),
                        text: "Gift cards never expire.".into(),
                    },
                ],
            }],
        })
    }

    #[test]
    fn draft_cites_qualifying_passages() {
        let index = index();
        let drafter = Drafter::new(&index);
        let answer = drafter
            .draft("shipping business days", "en", &DraftOptions::default())
            .expect("should draft");
        assert!(answer.starts_with("Based on retrieved content:"));
        assert!(answer.contains("[#h1]"));
        assert!(answer.contains("[#h2]"));
        // verbatim text, not paraphrase
        assert!(answer.contains("Shipping takes three business days."));
    }

    #[test]
    fn spanish_lead_in() {
        assert_eq!(lead_in("es"), "Basado en el contenido recuperado:");
        assert_eq!(lead_in("fr"), "Based on retrieved content:");
    }

    #[test]
    fn coverage_gate_fails_with_single_match() {
        let index = index();
        let drafter = Drafter::new(&index);
        // only h3 mentions gift cards; coverage_needed = 2 cannot be met
        let answer = drafter.draft("gift cards expire", "en", &DraftOptions::default());
        assert!(answer.is_none());
    }

    #[test]
    fn min_score_gate_fails_when_set_high() {
        let index = index();
        let drafter = Drafter::new(&index);
        let options = DraftOptions {
            bm25_min: 1_000.0,
            coverage_needed: 1,
        };
        assert!(drafter.draft("shipping", "en", &options).is_none());
    }

    #[test]
    fn no_match_means_no_answer() {
        let index = index();
        let drafter = Drafter::new(&index);
        assert!(drafter
            .draft("weather forecast", "en", &DraftOptions::default())
            .is_none());
    }

    #[test]
    fn strong_passages_capped_at_four() {
        let index = RetrievalIndex::build(&CorpusPack {
            docs: vec![CorpusDoc {
                lang: None,
                title: String::new(),
                url: String::new(),
                chunks: (0..6)
                    .map(|i| CorpusChunk {
                        id: format!("c{i}"),
                        text: "common term".into(),
                    })
                    .collect(),
            }],
        });
        let drafter = Drafter::new(&index);
        assert_eq!(drafter.strong_passages("common term", "en").len(), 4);
    }
}
