//! The summarization engine boundary.
//!
//! The search and the dispatcher only ever talk to a [`SummaryEngine`]: a
//! deterministic function from `(text, sentence count, threshold)` to a
//! summary. How sentences are ranked is the engine's own business.
//!
//! | Engine | Use case |
//! |--------|----------|
//! | [`LexRankEngine`] | Built-in graph-centrality extractive summarizer |
//! | [`FnEngine`] | Closures, mostly for tests and adapters |
//! | Custom `impl SummaryEngine` | Any other extractive backend |

pub mod lexrank;

pub use lexrank::{LexRankConfig, LexRankEngine};

use std::sync::Arc;

use crate::error::Result;

/// An extractive summarizer.
///
/// Implementations must be deterministic for fixed inputs. Callers never
/// request zero sentences; they treat that case as an empty summary
/// without calling the engine.
pub trait SummaryEngine: Send + Sync {
    /// Summarize `text` into at most `sentences` sentences, using
    /// `threshold` as the relevance cutoff.
    fn summary(&self, text: &str, sentences: usize, threshold: f64) -> Result<String>;
}

impl<E: SummaryEngine + ?Sized> SummaryEngine for &E {
    fn summary(&self, text: &str, sentences: usize, threshold: f64) -> Result<String> {
        (**self).summary(text, sentences, threshold)
    }
}

impl<E: SummaryEngine + ?Sized> SummaryEngine for Box<E> {
    fn summary(&self, text: &str, sentences: usize, threshold: f64) -> Result<String> {
        (**self).summary(text, sentences, threshold)
    }
}

impl<E: SummaryEngine + ?Sized> SummaryEngine for Arc<E> {
    fn summary(&self, text: &str, sentences: usize, threshold: f64) -> Result<String> {
        (**self).summary(text, sentences, threshold)
    }
}

/// An engine backed by a closure.
///
/// ```
/// use precis::engine::{FnEngine, SummaryEngine};
///
/// let engine = FnEngine::new(|_text, n, _threshold| Ok("x".repeat(n)));
/// assert_eq!(engine.summary("ignored", 3, 0.2).unwrap(), "xxx");
/// ```
pub struct FnEngine<F>(F)
where
    F: Fn(&str, usize, f64) -> Result<String> + Send + Sync;

impl<F> FnEngine<F>
where
    F: Fn(&str, usize, f64) -> Result<String> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> SummaryEngine for FnEngine<F>
where
    F: Fn(&str, usize, f64) -> Result<String> + Send + Sync,
{
    fn summary(&self, text: &str, sentences: usize, threshold: f64) -> Result<String> {
        (self.0)(text, sentences, threshold)
    }
}
