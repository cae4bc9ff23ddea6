//! Convenience re-exports for common `precis` types.
//!
//! ```ignore
//! use precis::prelude::*;
//! ```

pub use crate::agent::{
    AgentEvent, CompositeEventHandler, Event, EventHandler, FnEventHandler, LoggingHandler,
    NoopHandler, ReceiveReport, TextSummaryAgent, receive_concurrently,
};
pub use crate::dispatch::{LengthTarget, Mode, Summarizer, SummaryRequest};
pub use crate::engine::{FnEngine, LexRankEngine, SummaryEngine};
pub use crate::error::{Result, SummaryError};
pub use crate::options::{AgentOptions, SummarySettings};
pub use crate::search::{Direction, SearchOutcome};
