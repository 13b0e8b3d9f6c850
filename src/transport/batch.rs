//! Bounded-concurrency batch execution.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Default number of requests in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 15;

/// Run `op` over every item with at most `limit` futures in flight.
///
/// Results come back in input order, one per item, whatever order the
/// futures complete in. A `limit` of zero is treated as one.
pub async fn run_batch<I, F, Fut>(items: I, limit: usize, op: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    stream::iter(items)
        .map(op)
        .buffered(limit.max(1))
        .collect()
        .await
}
