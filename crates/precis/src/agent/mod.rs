//! The text summary agent: receives events, summarizes, emits events.
//!
//! For each incoming [`Event`] the agent interpolates its
//! [`AgentOptions`] against the payload, summarizes the resolved `data`
//! option, and emits a new event. With `merge` on, the new payload is the
//! incoming payload plus the summary under `result_key`; with `merge` off it
//! contains only the summary.
//!
//! Options are validated when the agent is built, so a blank `data`,
//! `length`, or `threshold` is reported before any event is processed.
//! Failures of individual events are reported in the [`ReceiveReport`] and
//! do not stop the batch.
//!
//! ```
//! use precis::agent::{Event, TextSummaryAgent};
//! use precis::engine::LexRankEngine;
//! use precis::options::AgentOptions;
//! use serde_json::json;
//!
//! let options = AgentOptions {
//!     mode: "sentences".into(),
//!     length: "1".into(),
//!     ..Default::default()
//! };
//! let agent = TextSummaryAgent::new(options, LexRankEngine::default()).unwrap();
//!
//! let event = Event::from_value(json!({"data": "Rust is fast. Rust is safe."})).unwrap();
//! let report = agent.receive(&[event]);
//! assert!(report.failures.is_empty());
//! assert!(report.emitted[0].payload.contains_key("summary"));
//! assert!(agent.is_working());
//! ```

pub mod batch;
pub mod event;
pub mod handler;
pub mod interpolate;

pub use batch::receive_concurrently;
pub use event::Event;
pub use handler::{
    AgentEvent, CompositeEventHandler, EventHandler, FnEventHandler, LoggingHandler, NoopHandler,
};

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::dispatch::Summarizer;
use crate::engine::SummaryEngine;
use crate::error::{Result, SummaryError};
use crate::options::AgentOptions;
use crate::text::char_len;

/// Health bookkeeping, updated as events are received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentStatus {
    /// Start of the most recent batch.
    pub last_receive_at: Option<DateTime<Utc>>,
    /// Time of the most recent failure.
    pub last_error_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub events_received: usize,
    pub events_emitted: usize,
    pub events_failed: usize,
    last_batch_failed: bool,
}

impl AgentStatus {
    /// True once a batch has been received and the latest batch had no
    /// failures.
    pub fn is_working(&self) -> bool {
        self.last_receive_at.is_some() && !self.last_batch_failed
    }
}

/// A failed event and why it failed.
#[derive(Debug)]
pub struct EventFailure {
    /// Position of the event in the batch.
    pub index: usize,
    pub error: SummaryError,
}

/// Outcome of receiving a batch.
#[derive(Debug, Default)]
pub struct ReceiveReport {
    /// Emitted events, in input order.
    pub emitted: Vec<Event>,
    pub failures: Vec<EventFailure>,
}

impl ReceiveReport {
    fn from_results(results: impl IntoIterator<Item = (usize, Result<Event>)>) -> Self {
        let mut report = Self::default();
        for (index, result) in results {
            match result {
                Ok(event) => report.emitted.push(event),
                Err(error) => report.failures.push(EventFailure { index, error }),
            }
        }
        report
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct TextSummaryAgent<E> {
    options: AgentOptions,
    summarizer: Summarizer<E>,
    handler: Box<dyn EventHandler>,
    status: Mutex<AgentStatus>,
}

impl<E: SummaryEngine> TextSummaryAgent<E> {
    /// Build an agent, validating `options` up front.
    pub fn new(options: AgentOptions, engine: E) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            summarizer: Summarizer::new(engine),
            handler: Box::new(NoopHandler),
            status: Mutex::new(AgentStatus::default()),
        })
    }

    /// Replace the event handler (default: [`NoopHandler`]).
    pub fn with_event_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    /// Snapshot of the health bookkeeping.
    pub fn status(&self) -> AgentStatus {
        self.lock_status().clone()
    }

    pub fn is_working(&self) -> bool {
        self.lock_status().is_working()
    }

    /// Process a batch one event at a time.
    pub fn receive(&self, events: &[Event]) -> ReceiveReport {
        self.begin_batch(events.len());
        let report = ReceiveReport::from_results(
            events
                .iter()
                .enumerate()
                .map(|(index, event)| (index, self.handle(index, event))),
        );
        self.finish_batch(&report);
        report
    }

    /// Process a single event as a batch of one.
    pub fn process(&self, event: &Event) -> Result<Event> {
        self.begin_batch(1);
        self.handle(0, event)
    }

    /// Summarize one event without touching the agent status or notifying
    /// the event handler.
    pub fn dry_run(&self, event: &Event) -> Result<Event> {
        self.summarize_event(event).map(|processed| processed.event)
    }

    /// [`dry_run`](Self::dry_run) every event of a batch. Failures are
    /// reported and logged; status and handler stay untouched.
    pub fn dry_run_batch(&self, events: &[Event]) -> ReceiveReport {
        ReceiveReport::from_results(events.iter().enumerate().map(|(index, event)| {
            let result = self.dry_run(event);
            if let Err(error) = &result {
                warn!("[event {index}] dry run failed: {error}");
            }
            (index, result)
        }))
    }

    pub(crate) fn begin_batch(&self, count: usize) {
        let mut status = self.lock_status();
        status.last_receive_at = Some(Utc::now());
        status.events_received += count;
        status.last_batch_failed = false;
    }

    pub(crate) fn finish_batch(&self, report: &ReceiveReport) {
        info!(
            "Batch finished: {} emitted, {} failed",
            report.emitted.len(),
            report.failures.len()
        );
    }

    /// Process one event of a batch, updating status and notifying the
    /// handler.
    pub(crate) fn handle(&self, index: usize, event: &Event) -> Result<Event> {
        self.handler.on_event(&AgentEvent::Received { index, event });
        match self.summarize_event(event) {
            Ok(processed) => {
                self.handler.on_event(&AgentEvent::Summarized {
                    index,
                    mode: processed.mode,
                    input_chars: processed.input_chars,
                    output_chars: processed.output_chars,
                });
                self.handler.on_event(&AgentEvent::Emitted {
                    index,
                    event: &processed.event,
                });
                self.lock_status().events_emitted += 1;
                Ok(processed.event)
            }
            Err(error) => {
                self.record_failure(index, &error);
                Err(error)
            }
        }
    }

    pub(crate) fn record_failure(&self, index: usize, error: &SummaryError) {
        self.handler.on_event(&AgentEvent::Failed { index, error });
        let mut status = self.lock_status();
        status.last_error_at = Some(Utc::now());
        status.last_error = Some(error.to_string());
        status.events_failed += 1;
        status.last_batch_failed = true;
    }

    fn summarize_event(&self, event: &Event) -> Result<Processed> {
        let settings = self.options.resolve(&event.payload)?.settings()?;
        let summary = self
            .summarizer
            .summarize_request(&settings.text, &settings.request)?;

        let processed = Processed {
            mode: settings.request.target.mode(),
            input_chars: char_len(&settings.text),
            output_chars: char_len(&summary),
            event: Event::new(build_payload(
                &event.payload,
                settings.merge,
                settings.result_key,
                summary,
            )),
        };
        Ok(processed)
    }

    fn lock_status(&self) -> MutexGuard<'_, AgentStatus> {
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct Processed {
    event: Event,
    mode: crate::dispatch::Mode,
    input_chars: usize,
    output_chars: usize,
}

/// Merge the summary into a copy of the incoming payload, or start from an
/// empty payload when not merging.
fn build_payload(
    incoming: &Map<String, Value>,
    merge: bool,
    result_key: String,
    summary: String,
) -> Map<String, Value> {
    let mut payload = if merge { incoming.clone() } else { Map::new() };
    payload.insert(result_key, Value::String(summary));
    payload
}
