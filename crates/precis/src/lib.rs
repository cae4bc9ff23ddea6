//! Length-constrained extractive summarization.
//!
//! `precis` shortens a text by asking an extractive [`SummaryEngine`] for
//! summaries of different sentence counts until the result fits a target:
//!
//! - **percentage mode** walks the sentence count from an estimate until the
//!   summary is at most a given fraction of the original length
//!   (see [`search`]);
//! - **sentences mode** asks the engine once for a literal sentence count.
//!
//! On top of that core sits an event-driven agent ([`TextSummaryAgent`])
//! that reads options, interpolates them against each incoming JSON event,
//! and emits a new event carrying the summary.
//!
//! # Getting started
//!
//! ```
//! use precis::{LexRankEngine, Summarizer};
//!
//! let text = "Rust guarantees memory safety. The borrow checker gives Rust memory safety. \
//!             Cats sleep for most of the day. Ownership lets Rust keep memory safety.";
//!
//! let summarizer = Summarizer::new(LexRankEngine::default());
//! let summary = summarizer.summarize(text, "percentage", "0.5", "0.2").unwrap();
//! assert!(summary.chars().count() * 2 <= text.chars().count());
//! ```
//!
//! # Where to find things
//!
//! - **Plug in a different summarizer:** implement
//!   [`SummaryEngine`](engine::SummaryEngine), or wrap a closure in
//!   [`FnEngine`](engine::FnEngine). The built-in engine is
//!   [`LexRankEngine`](engine::LexRankEngine).
//! - **Run the search directly:** [`search::search`] returns a
//!   [`SearchOutcome`](search::SearchOutcome) with the walk's direction and
//!   engine call count.
//! - **Configure an agent:** [`AgentOptions`](options::AgentOptions) holds the
//!   string options with their defaults; [`AgentOptions::schema`](options::AgentOptions::schema)
//!   describes them as JSON Schema.
//! - **Process events:** [`TextSummaryAgent::receive`](agent::TextSummaryAgent::receive)
//!   for sequential batches, [`agent::receive_concurrently`] for parallel
//!   ones. Observe progress with an [`EventHandler`](agent::EventHandler).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`engine`] | [`SummaryEngine`](engine::SummaryEngine) trait, closure adapter, LexRank engine |
//! | [`search`] | Percentage-constrained sentence-count search |
//! | [`dispatch`] | Mode parsing, [`SummaryRequest`](dispatch::SummaryRequest), [`Summarizer`] |
//! | [`options`] | Agent options, validation, schema, per-event resolution |
//! | [`agent`] | Events, interpolation, the agent, handlers, concurrent batches |
//! | [`text`] | Character lengths, derived sentence count, compression ratio |
//! | [`error`] | [`SummaryError`] |

pub mod agent;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod options;
pub mod prelude;
pub mod search;
pub mod text;

use schemars::JsonSchema;

pub use agent::{Event, TextSummaryAgent};
pub use dispatch::{LengthTarget, Mode, Summarizer, SummaryRequest};
pub use engine::{FnEngine, LexRankEngine, SummaryEngine};
pub use error::{Result, SummaryError};

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`.
///
/// ```
/// use precis::json_schema_for;
/// use precis::options::AgentOptions;
///
/// let schema = json_schema_for::<AgentOptions>();
/// assert_eq!(schema["type"], "object");
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}
