//! Batch execution for fan-out / fan-in completion calls.
//!
//! A batch is a set of futures polled by the calling task (`FuturesUnordered`), capped by a
//! semaphore. Outcomes land in a slot vector keyed by input position, so callers always see
//! results in input order no matter which call finished first. Cancellation drops every
//! pending call and returns `BatchCancelled`; partial outcomes are discarded.

use std::future::Future;
use std::time::Duration;

use futures::{stream::FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("batch cancelled before all calls settled")]
pub struct BatchCancelled;

/// Per-batch execution limits, threaded explicitly through every engine call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOptions {
    /// Maximum completion calls in flight at once (≥ 1).
    pub concurrency: usize,
    /// Deadline applied to each completion call.
    pub call_timeout: Option<Duration>,
}

impl BatchOptions {
    pub fn new(concurrency: usize, call_timeout: Option<Duration>) -> Self {
        Self {
            concurrency: concurrency.max(1),
            call_timeout,
        }
    }
}

/// Runs `task` over every item with at most `concurrency` in flight and joins them all.
///
/// Returns outcomes in input order. `task` receives the slot index and the item; it should
/// capture failures in its output type rather than short-circuit, the batch always waits for
/// every member unless cancelled.
pub async fn run_batch<I, T, F, Fut>(
    label: &str,
    items: Vec<I>,
    concurrency: usize,
    cancel: &CancellationToken,
    task: F,
) -> Result<Vec<T>, BatchCancelled>
where
    F: Fn(usize, I) -> Fut,
    Fut: Future<Output = T>,
{
    if cancel.is_cancelled() {
        return Err(BatchCancelled);
    }

    let total = items.len();
    let permits = Semaphore::new(concurrency.max(1));
    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut pending = FuturesUnordered::new();

    for (slot, item) in items.into_iter().enumerate() {
        let permits = &permits;
        let call = task(slot, item);
        pending.push(async move {
            // Held until the call settles; the semaphore is never closed.
            let _permit = permits.acquire().await;
            (slot, call.await)
        });
    }

    let mut settled = 0usize;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(batch = label, settled, total, "batch cancelled, discarding partial results");
                return Err(BatchCancelled);
            }
            next = pending.next() => match next {
                Some((slot, outcome)) => {
                    settled += 1;
                    debug!(batch = label, slot, settled, total, "batch member settled");
                    slots[slot] = Some(outcome);
                }
                None => break,
            },
        }
    }

    Ok(slots.into_iter().flatten().collect())
}
