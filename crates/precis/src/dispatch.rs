//! Mode dispatch: percentage search or a literal sentence count.
//!
//! [`SummaryRequest::parse`] turns the string-typed `mode`, `length`, and
//! `threshold` options into a typed request once, before any engine call.
//! [`Summarizer`] then runs it against an engine.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::SummaryEngine;
use crate::error::{Result, SummaryError};
use crate::search::{SearchOutcome, initial_estimate, search};

/// How `length` is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// `length` is a ratio of the original text length.
    #[default]
    Percentage,
    /// `length` is a number of sentences.
    Sentences,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Percentage => "percentage",
            Mode::Sentences => "sentences",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SummaryError;

    /// A blank mode selects the default, [`Mode::Percentage`].
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "percentage" => Ok(Mode::Percentage),
            "sentences" => Ok(Mode::Sentences),
            other => Err(SummaryError::invalid(
                "mode",
                other,
                "expected 'percentage' or 'sentences'",
            )),
        }
    }
}

/// Target size of a summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthTarget {
    /// Maximum summary length as a fraction of the original, in `(0, 1]`.
    Ratio(f64),
    /// Exact number of sentences to request.
    Sentences(usize),
}

impl LengthTarget {
    pub fn mode(&self) -> Mode {
        match self {
            LengthTarget::Ratio(_) => Mode::Percentage,
            LengthTarget::Sentences(_) => Mode::Sentences,
        }
    }
}

/// A fully parsed summarization request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRequest {
    pub target: LengthTarget,
    pub threshold: f64,
}

impl SummaryRequest {
    /// Parse the string-typed options into a request.
    pub fn parse(mode: &str, length: &str, threshold: &str) -> Result<Self> {
        let mode: Mode = mode.parse()?;
        let target = match mode {
            Mode::Percentage => LengthTarget::Ratio(parse_ratio(length)?),
            Mode::Sentences => LengthTarget::Sentences(parse_sentences(length)?),
        };
        Ok(Self {
            target,
            threshold: parse_threshold(threshold)?,
        })
    }
}

fn parse_ratio(length: &str) -> Result<f64> {
    let value = length.trim();
    let ratio: f64 = value
        .parse()
        .map_err(|_| SummaryError::invalid("length", value, "expected a decimal ratio"))?;
    if !(ratio > 0.0 && ratio <= 1.0) {
        return Err(SummaryError::invalid(
            "length",
            value,
            "ratio must be greater than 0 and at most 1",
        ));
    }
    Ok(ratio)
}

fn parse_sentences(length: &str) -> Result<usize> {
    let value = length.trim();
    value.parse().map_err(|_| {
        SummaryError::invalid("length", value, "expected a non-negative sentence count")
    })
}

fn parse_threshold(threshold: &str) -> Result<f64> {
    let value = threshold.trim();
    let parsed: f64 = value
        .parse()
        .map_err(|_| SummaryError::invalid("threshold", value, "expected a decimal number"))?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(SummaryError::invalid(
            "threshold",
            value,
            "threshold must be between 0 and 1",
        ));
    }
    Ok(parsed)
}

/// Runs summary requests against an engine.
#[derive(Debug, Clone)]
pub struct Summarizer<E> {
    engine: E,
}

impl<E: SummaryEngine> Summarizer<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Summarize with string-typed options, as they arrive from
    /// configuration.
    ///
    /// ```
    /// use precis::Summarizer;
    /// use precis::engine::FnEngine;
    ///
    /// let engine = FnEngine::new(|_, n, _| Ok(vec!["Short."; n].join(" ")));
    /// let summary = Summarizer::new(engine)
    ///     .summarize("One. Two. Three.", "sentences", "2", "0.2")
    ///     .unwrap();
    /// assert_eq!(summary, "Short. Short.");
    /// ```
    pub fn summarize(&self, text: &str, mode: &str, length: &str, threshold: &str) -> Result<String> {
        let request = SummaryRequest::parse(mode, length, threshold)?;
        self.summarize_request(text, &request)
    }

    /// Summarize with an already parsed request.
    pub fn summarize_request(&self, text: &str, request: &SummaryRequest) -> Result<String> {
        match request.target {
            LengthTarget::Sentences(0) => {
                debug!("Sentence mode with 0 sentences; skipping the engine");
                Ok(String::new())
            }
            LengthTarget::Sentences(n) => {
                debug!("Sentence mode: requesting {n} sentence(s)");
                self.engine.summary(text, n, request.threshold)
            }
            LengthTarget::Ratio(ratio) => self
                .shorten_to_ratio(text, ratio, request.threshold)
                .map(|outcome| outcome.summary),
        }
    }

    /// Percentage mode with the full search outcome.
    pub fn shorten_to_ratio(&self, text: &str, ratio: f64, threshold: f64) -> Result<SearchOutcome> {
        let initial = initial_estimate(text, ratio);
        debug!("Percentage mode: ratio {ratio}, initial estimate {initial} sentence(s)");
        let outcome = search(&self.engine, text, initial, ratio, threshold)?;
        debug!(
            "Search finished at {} sentence(s) after {} engine call(s)",
            outcome.sentences, outcome.engine_calls
        );
        Ok(outcome)
    }
}
