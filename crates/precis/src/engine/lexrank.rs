//! Threshold LexRank: graph-centrality sentence extraction.
//!
//! Sentences are nodes; two sentences are linked when their IDF-modified
//! cosine similarity exceeds the relevance threshold. Centrality comes from
//! a damped power iteration over the degree-normalized graph, and the
//! highest-ranked sentences are returned in document order.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use super::SummaryEngine;
use crate::error::{Result, SummaryError};

/// Words carrying no topical signal. Kept short on purpose: similarity is
/// IDF-weighted, so frequent words are already discounted.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "can", "this", "that", "these",
    "those", "it", "its", "as", "if", "then", "than", "so", "such", "no", "not", "there", "here",
    "he", "she", "they", "we", "you", "me", "my", "your", "his", "her", "their", "our", "which",
    "who", "what",
];

/// Tuning for the centrality iteration.
#[derive(Debug, Clone)]
pub struct LexRankConfig {
    /// Probability of following a graph edge rather than jumping to a
    /// random sentence. Default: `0.85`.
    pub damping: f64,
    /// L1 change between iterations below which the scores are final.
    /// Default: `1e-6`.
    pub tolerance: f64,
    /// Hard cap on power-iteration rounds. Default: `100`.
    pub max_iterations: usize,
}

impl Default for LexRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// A sentence with its centrality score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSentence {
    /// Position in the document (0-indexed).
    pub position: usize,
    pub text: String,
    pub score: f64,
}

/// The built-in extractive engine.
#[derive(Debug, Clone, Default)]
pub struct LexRankEngine {
    config: LexRankConfig,
}

impl LexRankEngine {
    pub fn new(config: LexRankConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LexRankConfig {
        &self.config
    }

    /// Score every sentence of `text`, in document order.
    pub fn rank(&self, text: &str, threshold: f64) -> Result<Vec<RankedSentence>> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Err(SummaryError::Engine(
                "document contains no sentences".to_string(),
            ));
        }

        let vectors = weighted_vectors(&sentences);
        let scores = self.centrality(&vectors, threshold);

        Ok(sentences
            .into_iter()
            .zip(scores)
            .enumerate()
            .map(|(position, (text, score))| RankedSentence {
                position,
                text,
                score,
            })
            .collect())
    }

    fn centrality(&self, vectors: &[BTreeMap<String, f64>], threshold: f64) -> Vec<f64> {
        let n = vectors.len();
        let norms: Vec<f64> = vectors
            .iter()
            .map(|v| v.values().map(|w| w * w).sum::<f64>().sqrt())
            .collect();

        let links: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| {
                        j != i && cosine(&vectors[i], &vectors[j], norms[i], norms[j]) > threshold
                    })
                    .collect()
            })
            .collect();

        let damping = self.config.damping;
        let teleport = (1.0 - damping) / n as f64;
        let mut scores = vec![1.0 / n as f64; n];
        for iteration in 0..self.config.max_iterations {
            let mut next = vec![teleport; n];
            // Sentences without links spread their score evenly.
            let mut dangling = 0.0;
            for (i, targets) in links.iter().enumerate() {
                if targets.is_empty() {
                    dangling += scores[i];
                    continue;
                }
                let share = damping * scores[i] / targets.len() as f64;
                for &j in targets {
                    next[j] += share;
                }
            }
            let spread = damping * dangling / n as f64;
            next.iter_mut().for_each(|score| *score += spread);

            let delta: f64 = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).sum();
            scores = next;
            if delta < self.config.tolerance {
                trace!("LexRank converged after {} iteration(s)", iteration + 1);
                break;
            }
        }
        scores
    }
}

impl SummaryEngine for LexRankEngine {
    fn summary(&self, text: &str, sentences: usize, threshold: f64) -> Result<String> {
        let mut ranked = self.rank(text, threshold)?;
        if sentences == 0 {
            return Ok(String::new());
        }

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.position.cmp(&b.position))
        });
        ranked.truncate(sentences);
        ranked.sort_by_key(|s| s.position);

        Ok(ranked
            .into_iter()
            .map(|s| s.text)
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// Split text into sentences ending in `.`, `!`, or `?` followed by
/// whitespace or the end of the text. Terminators stay attached.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') && chars.peek().is_none_or(|next| next.is_whitespace()) {
            push_trimmed(&mut sentences, &mut current);
        }
    }
    push_trimmed(&mut sentences, &mut current);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

fn tokenize(sentence: &str) -> Vec<String> {
    sentence
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2 && !STOPWORDS.contains(w))
        .map(String::from)
        .collect()
}

/// Term-frequency vectors scaled by smoothed IDF, one per sentence.
fn weighted_vectors(sentences: &[String]) -> Vec<BTreeMap<String, f64>> {
    let counts: Vec<BTreeMap<String, f64>> = sentences
        .iter()
        .map(|s| {
            let mut tf = BTreeMap::new();
            for token in tokenize(s) {
                *tf.entry(token).or_insert(0.0) += 1.0;
            }
            tf
        })
        .collect();

    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for tf in &counts {
        for term in tf.keys() {
            *document_frequency.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    let n = sentences.len() as f64;
    let idf: HashMap<&str, f64> = document_frequency
        .into_iter()
        .map(|(term, df)| (term, (1.0 + n / df as f64).ln()))
        .collect();

    counts
        .iter()
        .map(|tf| {
            tf.iter()
                .map(|(term, count)| {
                    let weight = idf.get(term.as_str()).copied().unwrap_or(0.0);
                    (term.clone(), count * weight)
                })
                .collect()
        })
        .collect()
}

fn cosine(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
        .sum();
    dot / (norm_a * norm_b)
}
