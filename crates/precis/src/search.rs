//! Percentage-constrained search over sentence counts.
//!
//! The length of an engine summary grows with the number of sentences
//! requested, but not linearly and not invertibly, so the target count
//! cannot be computed up front. The search starts from an estimate and
//! walks the count one sentence at a time:
//!
//! - if the first summary is too long, it shrinks until the summary fits
//!   (or the count would reach zero) and returns the last summary computed;
//! - otherwise it grows while the summary still fits and returns the
//!   summary from one step before the last expansion.
//!
//! A summary is "too long" when `len(summary) / len(text) > ratio`. An empty
//! engine result ends the walk and the last non-empty summary is kept.

use tracing::debug;

use crate::engine::SummaryEngine;
use crate::error::{Result, SummaryError};
use crate::text::{char_len, sentence_count};

/// Which way the sentence count moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The first summary was too long; remove sentences.
    Shrink,
    /// The first summary fit; add sentences.
    Grow,
}

impl Direction {
    fn step(self) -> isize {
        match self {
            Direction::Shrink => -1,
            Direction::Grow => 1,
        }
    }
}

/// Result of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// The chosen summary.
    pub summary: String,
    /// Sentence count `summary` was requested with (0 for the empty
    /// summary of a zero estimate).
    pub sentences: usize,
    pub direction: Direction,
    /// Number of engine calls made, including the initial estimate.
    pub engine_calls: usize,
}

/// Mutable state of a single search. Lives on the stack of [`search`].
///
/// Each summary is kept with the sentence count it was requested for.
#[derive(Debug)]
struct SearchState {
    current: (String, usize),
    previous: Option<(String, usize)>,
    direction: Direction,
    engine_calls: usize,
}

struct Search<'a, E: SummaryEngine + ?Sized> {
    engine: &'a E,
    text: &'a str,
    text_len: usize,
    ratio: f64,
    threshold: f64,
    /// Growth never requests more sentences than the text has.
    max_sentences: usize,
}

impl<E: SummaryEngine + ?Sized> Search<'_, E> {
    fn too_long(&self, summary: &str) -> bool {
        char_len(summary) as f64 / self.text_len as f64 > self.ratio
    }

    fn summarize(&self, sentences: usize, state_calls: &mut usize) -> Result<String> {
        if sentences == 0 {
            return Ok(String::new());
        }
        *state_calls += 1;
        self.engine.summary(self.text, sentences, self.threshold)
    }

    /// Whether the walk should take another step in `direction`.
    fn keep_going(&self, state: &SearchState) -> bool {
        match state.direction {
            Direction::Shrink => self.too_long(&state.current.0),
            Direction::Grow => !self.too_long(&state.current.0),
        }
    }

    fn run(&self, initial_sentences: usize) -> Result<SearchOutcome> {
        let mut engine_calls = 0;
        let current = self.summarize(initial_sentences, &mut engine_calls)?;
        let direction = if self.too_long(&current) {
            Direction::Shrink
        } else {
            Direction::Grow
        };
        debug!(
            "Search start: {initial_sentences} sentence(s), {} of {} chars, direction {direction:?}",
            char_len(&current),
            self.text_len
        );

        let mut state = SearchState {
            current: (current, initial_sentences),
            previous: None,
            direction,
            engine_calls,
        };

        let mut sentences = initial_sentences;
        while self.keep_going(&state) {
            let Some(next) = sentences.checked_add_signed(state.direction.step()) else {
                break;
            };
            sentences = next;
            if next == 0 {
                break;
            }
            if state.direction == Direction::Grow && next > self.max_sentences {
                debug!("Search stopped at the text's {} sentence(s)", self.max_sentences);
                break;
            }

            let candidate = self.summarize(next, &mut state.engine_calls)?;
            debug!(
                "Search step: {next} sentence(s) -> {} chars",
                char_len(&candidate)
            );
            let previous = std::mem::replace(&mut state.current, (candidate, next));
            if state.current.0.is_empty() {
                debug!("Engine returned an empty summary at {next} sentence(s); stopping");
                state.current = previous.clone();
                state.previous = Some(previous);
                break;
            }
            state.previous = Some(previous);
        }

        let (summary, sentences) = match state.direction {
            Direction::Shrink => state.current,
            Direction::Grow => state.previous.unwrap_or(state.current),
        };
        Ok(SearchOutcome {
            summary,
            sentences,
            direction: state.direction,
            engine_calls: state.engine_calls,
        })
    }
}

/// Find the summary whose length, as a fraction of `text`, best matches
/// `ratio` by walking sentence counts from `initial_sentences`.
///
/// `ratio` must be in `(0, 1]`; the dispatcher validates it. Engine errors
/// propagate unchanged.
pub fn search<E: SummaryEngine + ?Sized>(
    engine: &E,
    text: &str,
    initial_sentences: usize,
    ratio: f64,
    threshold: f64,
) -> Result<SearchOutcome> {
    let text_len = char_len(text);
    if text_len == 0 {
        return Err(SummaryError::EmptyText);
    }

    Search {
        engine,
        text,
        text_len,
        ratio,
        threshold,
        max_sentences: sentence_count(text),
    }
    .run(initial_sentences)
}

/// Initial sentence estimate for `ratio`: the derived sentence count scaled
/// and rounded half away from zero.
pub fn initial_estimate(text: &str, ratio: f64) -> usize {
    (sentence_count(text) as f64 * ratio).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FnEngine;
    use std::sync::Mutex;

    /// `count` sentences of exactly 50 characters, joined by '.'.
    fn fifty_char_text(count: usize) -> String {
        vec!["x".repeat(49); count].join(".") + "."
    }

    /// Fake engine returning `n` blocks of 50 characters and logging each
    /// requested count.
    struct Blocks {
        calls: Mutex<Vec<usize>>,
        empty_at: Option<usize>,
    }

    impl Blocks {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                empty_at: None,
            }
        }

        fn empty_at(n: usize) -> Self {
            Self {
                empty_at: Some(n),
                ..Self::new()
            }
        }

        fn calls(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SummaryEngine for Blocks {
        fn summary(&self, _text: &str, sentences: usize, _threshold: f64) -> Result<String> {
            self.calls.lock().unwrap().push(sentences);
            if self.empty_at == Some(sentences) {
                return Ok(String::new());
            }
            Ok("y".repeat(50 * sentences))
        }
    }

    #[test]
    fn six_sentences_at_thirty_percent() {
        let text = fifty_char_text(6);
        assert_eq!(char_len(&text), 300);
        assert_eq!(initial_estimate(&text, 0.3), 2);

        let engine = Blocks::new();
        let outcome = search(&engine, &text, 2, 0.3, 0.2).unwrap();

        assert_eq!(outcome.direction, Direction::Shrink);
        assert_eq!(char_len(&outcome.summary), 50);
        assert_eq!(outcome.sentences, 1);
        assert_eq!(engine.calls(), vec![2, 1]);
    }

    #[test]
    fn shrinking_stops_at_zero_floor() {
        let text = fifty_char_text(10);
        let engine = Blocks::new();
        // Even one sentence (10%) exceeds 5%.
        let outcome = search(&engine, &text, 3, 0.05, 0.2).unwrap();

        assert_eq!(outcome.direction, Direction::Shrink);
        assert_eq!(char_len(&outcome.summary), 50);
        assert_eq!(outcome.sentences, 1);
        assert_eq!(engine.calls(), vec![3, 2, 1]);
    }

    #[test]
    fn growing_returns_summary_one_step_behind() {
        let text = fifty_char_text(10);
        let engine = Blocks::new();
        let outcome = search(&engine, &text, 3, 0.3, 0.2).unwrap();

        // 3 sentences fit exactly (30%), so the walk grows to 4 (40%), which
        // no longer fits, and hands back the 3-sentence summary.
        assert_eq!(outcome.direction, Direction::Grow);
        assert_eq!(engine.calls(), vec![3, 4]);
        assert_eq!(char_len(&outcome.summary), 150);
        assert_eq!(outcome.sentences, 3);
    }

    #[test]
    fn growing_from_a_short_estimate_overshoots_then_steps_back() {
        let text = fifty_char_text(10);
        let engine = Blocks::new();
        let outcome = search(&engine, &text, 1, 0.45, 0.2).unwrap();

        assert_eq!(engine.calls(), vec![1, 2, 3, 4, 5]);
        assert_eq!(char_len(&outcome.summary), 200);
        assert!(outcome.summary.len() as f64 / text.len() as f64 <= 0.45);
    }

    #[test]
    fn growing_is_bounded_by_sentence_count() {
        let text = fifty_char_text(4);
        // Saturating engine: never returns more than the whole text.
        let engine = FnEngine::new(|text, _, _| Ok(text.to_string()));
        let outcome = search(&engine, &text, 4, 1.0, 0.2).unwrap();

        assert_eq!(outcome.direction, Direction::Grow);
        assert_eq!(outcome.summary, text);
        assert_eq!(outcome.sentences, 4);
        assert_eq!(outcome.engine_calls, 1);
    }

    #[test]
    fn terminates_within_sentence_count_steps() {
        let text = fifty_char_text(8);
        for ratio in [0.01, 0.1, 0.25, 0.5, 0.75, 1.0] {
            let engine = Blocks::new();
            let initial = initial_estimate(&text, ratio);
            search(&engine, &text, initial, ratio, 0.2).unwrap();
            assert!(engine.calls().len() <= 8 + 1, "ratio {ratio}");
        }
    }

    #[test]
    fn empty_result_returns_last_non_empty_summary() {
        let text = fifty_char_text(10);
        let engine = Blocks::empty_at(2);
        let outcome = search(&engine, &text, 4, 0.05, 0.2).unwrap();

        assert_eq!(engine.calls(), vec![4, 3, 2]);
        assert_eq!(char_len(&outcome.summary), 150);
        assert_eq!(outcome.sentences, 3);
    }

    #[test]
    fn empty_result_while_growing_keeps_previous() {
        let text = fifty_char_text(10);
        let engine = Blocks::empty_at(3);
        let outcome = search(&engine, &text, 1, 0.9, 0.2).unwrap();

        assert_eq!(engine.calls(), vec![1, 2, 3]);
        assert_eq!(char_len(&outcome.summary), 100);
        assert_eq!(outcome.sentences, 2);
    }

    #[test]
    fn zero_estimate_skips_the_engine() {
        let text = fifty_char_text(10);
        let engine = Blocks::new();
        let outcome = search(&engine, &text, 0, 0.04, 0.2).unwrap();

        // 0 sentences fits, 1 sentence (10%) does not: the empty summary
        // from before the expansion is returned.
        assert_eq!(engine.calls(), vec![1]);
        assert_eq!(outcome.summary, "");
        assert_eq!(outcome.sentences, 0);
    }

    #[test]
    fn reported_count_matches_the_returned_summary() {
        let text = fifty_char_text(10);
        for (initial, ratio) in [(3, 0.3), (1, 0.45), (6, 0.2), (3, 0.05), (9, 1.0)] {
            let engine = Blocks::new();
            let outcome = search(&engine, &text, initial, ratio, 0.2).unwrap();
            assert_eq!(
                char_len(&outcome.summary) / 50,
                outcome.sentences,
                "initial {initial}, ratio {ratio}"
            );
        }
    }

    #[test]
    fn engine_errors_propagate() {
        let engine = FnEngine::new(|_, _, _| Err(SummaryError::Engine("boom".into())));
        let err = search(&engine, "One. Two.", 1, 0.5, 0.2).unwrap_err();
        assert!(matches!(err, SummaryError::Engine(msg) if msg == "boom"));
    }

    #[test]
    fn empty_text_is_rejected_before_the_engine() {
        let engine = Blocks::new();
        let err = search(&engine, "", 1, 0.5, 0.2).unwrap_err();
        assert!(matches!(err, SummaryError::EmptyText));
        assert!(engine.calls().is_empty());
    }
}
