//! Lifecycle notifications from the [`TextSummaryAgent`](super::TextSummaryAgent).
//!
//! # Choosing an event handler
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget runs |
//! | [`LoggingHandler`] | Logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures for simple callbacks |
//! | [`CompositeEventHandler`] | Compose multiple handlers in order |

use tracing::{debug, info, warn};

use super::Event;
use crate::dispatch::Mode;
use crate::error::SummaryError;

/// Things that happen while the agent processes a batch.
#[derive(Debug)]
pub enum AgentEvent<'a> {
    /// An incoming event is about to be processed.
    Received { index: usize, event: &'a Event },
    /// A summary was produced for the event at `index`.
    Summarized {
        index: usize,
        mode: Mode,
        input_chars: usize,
        output_chars: usize,
    },
    /// A new event was emitted.
    Emitted { index: usize, event: &'a Event },
    /// Processing the event at `index` failed; the batch continues.
    Failed {
        index: usize,
        error: &'a SummaryError,
    },
}

/// Observer for [`AgentEvent`]s. The default implementation ignores them.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &AgentEvent<'_>) {
        let _ = event;
    }
}

/// A handler that ignores everything.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// A handler backed by a closure.
///
/// ```
/// use precis::agent::{AgentEvent, FnEventHandler};
///
/// let handler = FnEventHandler::new(|event| {
///     if let AgentEvent::Failed { index, error } = event {
///         eprintln!("event {index} failed: {error}");
///     }
/// });
/// # let _ = handler;
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&AgentEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&AgentEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&AgentEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &AgentEvent<'_>) {
        (self.0)(event)
    }
}

/// Dispatches every event to each inner handler, in registration order.
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler to the chain.
    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Conditionally add a handler to the chain.
    pub fn with_if(self, condition: bool, handler: impl EventHandler + 'static) -> Self {
        if condition { self.with(handler) } else { self }
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &AgentEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// Logs agent events through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &AgentEvent<'_>) {
        match event {
            AgentEvent::Received { index, event } => {
                debug!("[event {index}] received ({} key(s))", event.payload.len());
            }
            AgentEvent::Summarized {
                index,
                mode,
                input_chars,
                output_chars,
            } => {
                let ratio = if *input_chars == 0 {
                    0.0
                } else {
                    *output_chars as f64 / *input_chars as f64
                };
                info!(
                    "[event {index}] {mode} summary: {output_chars}/{input_chars} chars ({:.1}%)",
                    ratio * 100.0
                );
            }
            AgentEvent::Emitted { index, event } => {
                debug!(
                    "[event {index}] emitted at {} ({} key(s))",
                    event.created_at.to_rfc3339(),
                    event.payload.len()
                );
            }
            AgentEvent::Failed { index, error } => {
                warn!("[event {index}] failed: {error}");
            }
        }
    }
}
