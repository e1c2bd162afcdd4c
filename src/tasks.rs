//! Bounded concurrent task runner.
//!
//! Every sync flow in this crate fans out over many independent units of
//! work (one per user, per artist, per album) against a rate-limited API.
//! The runner here keeps at most `queue_size` units in flight at a time,
//! admits candidates through an optional filter, and tops the in-flight set
//! back up as soon as any single unit completes. Waiting on the *first*
//! completion rather than the whole batch is deliberate: one slow unit must
//! not stall the throughput of the remaining slots.
//!
//! The budget is a strict ceiling, not a target average. Note that nested
//! runners multiply: a unit dispatched by an outer runner may drive its own
//! inner runner, so total in-flight work is the product of the budgets.
//! Size them with the HTTP connection pool in mind - a pool smaller than the
//! combined budget silently serializes "concurrent" calls at the transport
//! layer.

use std::collections::VecDeque;
use std::future::Future;

use tokio::task::JoinSet;

/// Runs `worker` over every item with bounded concurrency.
///
/// Equivalent to [`run_filtered_tasks`] with an always-admit filter.
pub async fn run_tasks<A, T, W, Fut>(queue_size: usize, items: Vec<A>, worker: W) -> Vec<T>
where
    A: Send + 'static,
    T: Send + 'static,
    W: Fn(A) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    run_filtered_tasks(queue_size, items, worker, |_| true).await
}

/// Runs `worker` over the admitted items with bounded concurrency.
///
/// Candidates are scanned in their original order; items rejected by
/// `filter` are discarded on the spot and never re-queued. Up to
/// `queue_size` admitted items run concurrently; whenever one completes its
/// result is collected and the in-flight set is refilled from the remaining
/// candidates. Returns one result per admitted item, in completion order -
/// callers must not assume any relation between admission order and result
/// order.
///
/// The runner never cancels an admitted unit and has no deadline of its
/// own; timeout behavior belongs to the unit of work (see
/// [`crate::spotify::client`]). Units are expected to be fallible values
/// (`Result`-shaped) when per-item failure isolation is wanted; a panicking
/// unit is treated as a bug and resumed on the caller.
pub async fn run_filtered_tasks<A, T, W, Fut, P>(
    queue_size: usize,
    items: Vec<A>,
    worker: W,
    filter: P,
) -> Vec<T>
where
    A: Send + 'static,
    T: Send + 'static,
    W: Fn(A) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    P: Fn(&A) -> bool,
{
    let mut candidates = VecDeque::from(items);
    let mut in_flight: JoinSet<T> = JoinSet::new();
    let mut results: Vec<T> = Vec::new();

    loop {
        // Top up to the budget, skipping (and dropping) rejected candidates.
        while in_flight.len() < queue_size {
            match candidates.pop_front() {
                Some(args) if filter(&args) => {
                    in_flight.spawn(worker(args));
                }
                Some(_) => continue,
                None => break,
            }
        }

        // First-completed-wins: collect exactly one result, then refill.
        match in_flight.join_next().await {
            Some(Ok(result)) => results.push(result),
            Some(Err(err)) => {
                if err.is_panic() {
                    std::panic::resume_unwind(err.into_panic());
                }
                // A non-panic join error means runtime shutdown; nothing
                // sensible to collect for that unit.
            }
            None => break,
        }
    }

    results
}
