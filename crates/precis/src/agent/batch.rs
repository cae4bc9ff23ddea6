//! Concurrent batch processing.
//!
//! Summarization is synchronous and CPU-bound, so each event runs on tokio's
//! blocking pool. Events are independent; results are collected in input
//! order regardless of which finishes first.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;

use super::{Event, ReceiveReport, TextSummaryAgent};
use crate::engine::SummaryEngine;
use crate::error::SummaryError;

/// Receive a batch with up to `concurrency` events in flight at once.
///
/// Behaves like [`TextSummaryAgent::receive`]: failures are reported in the
/// returned report and the rest of the batch still runs.
pub async fn receive_concurrently<E>(
    agent: Arc<TextSummaryAgent<E>>,
    events: Vec<Event>,
    concurrency: usize,
) -> ReceiveReport
where
    E: SummaryEngine + 'static,
{
    agent.begin_batch(events.len());

    let results: Vec<_> = stream::iter(events.into_iter().enumerate())
        .map(|(index, event)| {
            let agent = Arc::clone(&agent);
            async move {
                let worker = Arc::clone(&agent);
                let result = match tokio::task::spawn_blocking(move || worker.handle(index, &event))
                    .await
                {
                    Ok(result) => result,
                    Err(e) => {
                        let error = SummaryError::Worker(e.to_string());
                        agent.record_failure(index, &error);
                        Err(error)
                    }
                };
                (index, result)
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let report = ReceiveReport::from_results(results);
    agent.finish_batch(&report);
    report
}
