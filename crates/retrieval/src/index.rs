//! BM25 index over the corpus pack.
//!
//! The index snapshot is derived from exactly one corpus version:
//! per-passage token counts, a corpus-wide document-frequency table,
//! the average passage length, and the inverse-document-frequency
//! table. Scoring offers two modes behind one entry point: full BM25
//! for the extractive tier, and a cheap distinct-term-overlap count
//! used only to ground the local model's system instruction.

use crate::corpus::CorpusPack;
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// An immutable passage with its source attribution.
#[derive(Debug, Clone)]
pub struct Passage {
    pub id: String,
    pub text: String,
    /// None means untagged: matches every query language.
    pub language: Option<String>,
    pub source_title: String,
    pub source_url: String,
}

/// Which scorer to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    /// Full BM25 (k1 = 1.2, b = 0.75).
    Bm25,
    /// Distinct-term overlap count. Cheaper, used for local-tier grounding.
    Overlap,
}

/// A passage with its relevance score for one query.
#[derive(Debug, Clone)]
pub struct ScoredPassage<'a> {
    pub passage: &'a Passage,
    pub score: f64,
}

#[derive(Debug)]
struct IndexedPassage {
    passage: Passage,
    /// Token multiset.
    term_counts: HashMap<String, u32>,
    /// Token count including duplicates.
    len: usize,
}

/// The read-only retrieval index, built once per corpus load.
#[derive(Debug)]
pub struct RetrievalIndex {
    passages: Vec<IndexedPassage>,
    idf: HashMap<String, f64>,
    avgdl: f64,
}

/// Lowercase alphanumeric runs (extended to accented Latin letters)
/// after NFKC normalization.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text.nfkc().flat_map(char::to_lowercase).collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in normalized.chars() {
        if is_token_char(c) {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ü' | 'ñ')
}

impl RetrievalIndex {
    /// Build the index snapshot from one corpus version. Pure.
    pub fn build(pack: &CorpusPack) -> Self {
        let mut passages = Vec::new();

        for doc in &pack.docs {
            for chunk in &doc.chunks {
                let tokens = tokenize(&chunk.text);
                let len = tokens.len();
                let mut term_counts: HashMap<String, u32> = HashMap::new();
                for token in tokens {
                    *term_counts.entry(token).or_insert(0) += 1;
                }
                passages.push(IndexedPassage {
                    passage: Passage {
                        id: chunk.id.clone(),
                        text: chunk.text.clone(),
                        language: doc.lang.clone(),
                        source_title: doc.title.clone(),
                        source_url: doc.url.clone(),
                    },
                    term_counts,
                    len,
                });
            }
        }

        let n = passages.len().max(1) as f64;
        let total_len: usize = passages.iter().map(|p| p.len).sum();
        let avgdl = total_len as f64 / n;

        let mut df: HashMap<&str, u32> = HashMap::new();
        for indexed in &passages {
            for term in indexed.term_counts.keys() {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let idf = df
            .into_iter()
            .map(|(term, count)| {
                let count = count as f64;
                (term.to_string(), (1.0 + (n - count + 0.5) / (count + 0.5)).ln())
            })
            .collect();

        Self {
            passages,
            idf,
            avgdl,
        }
    }

    pub fn passage_count(&self) -> usize {
        self.passages.len()
    }

    /// Rank passages against `query`, filtered to `language` (untagged
    /// passages always qualify). Only strictly positive scores are
    /// returned; ties keep corpus order.
    pub fn rank(&self, query: &str, language: &str, mode: RankMode) -> Vec<ScoredPassage<'_>> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredPassage<'_>> = self
            .passages
            .iter()
            .filter(|p| {
                p.passage
                    .language
                    .as_deref()
                    .is_none_or(|lang| lang == language)
            })
            .filter_map(|p| {
                let score = match mode {
                    RankMode::Bm25 => self.bm25(&terms, p),
                    RankMode::Overlap => overlap(&terms, p),
                };
                (score > 0.0).then_some(ScoredPassage {
                    passage: &p.passage,
                    score,
                })
            })
            .collect();

        // stable: equal scores stay in corpus order
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }

    fn bm25(&self, terms: &[String], indexed: &IndexedPassage) -> f64 {
        let dl = indexed.len.max(1) as f64;
        let mut score = 0.0;
        for term in terms {
            let Some(idf) = self.idf.get(term) else {
                continue;
            };
            let tf = indexed.term_counts.get(term).copied().unwrap_or(0) as f64;
            if tf == 0.0 {
                continue;
            }
            score += idf * (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * (dl / self.avgdl)));
        }
        score
    }
}

/// Distinct query terms present in the passage.
fn overlap(terms: &[String], indexed: &IndexedPassage) -> f64 {
    let distinct: HashSet<&str> = terms.iter().map(String::as_str).collect();
    distinct
        .into_iter()
        .filter(|term| indexed.term_counts.contains_key(*term))
        .count() as f64
}
