//! Sequential batched upsert driver.
//!
//! Rows are split into contiguous batches of at most `batch_size` in input
//! order, and each batch is sent as one statement execution. Batches never
//! overlap: a failure in batch `k` leaves batches `0..k` committed and the
//! rest unsent. Statements are merges, so re-running the whole input after
//! a failure is safe.

use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::{ImportError, ImportResult};
use crate::graph::{GraphStore, MutationCounters, Statement};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Totals for one statement applied over a whole table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub batches: usize,
    pub counters: MutationCounters,
    pub elapsed: Duration,
}

/// Apply `statement` to every row, `batch_size` rows at a time.
pub async fn apply_in_batches<S>(
    store: &S,
    statement: &Statement,
    rows: Vec<Value>,
    batch_size: usize,
) -> ImportResult<BatchOutcome>
where
    S: GraphStore + ?Sized,
{
    if batch_size == 0 {
        return Err(ImportError::InvalidBatchSize(batch_size));
    }

    let start = Instant::now();
    let total_rows = rows.len();
    let mut outcome = BatchOutcome::default();
    let mut remaining = rows.into_iter();

    loop {
        let batch: Vec<Value> = remaining.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }

        let counters = store
            .execute_batch(statement, batch)
            .await
            .map_err(|source| ImportError::Batch {
                statement: statement.name.clone(),
                batch: outcome.batches,
                committed: outcome.batches,
                source,
            })?;

        debug!(
            statement = %statement.name,
            batch = outcome.batches,
            "{}",
            counters
        );
        outcome.counters += counters;
        outcome.batches += 1;
    }

    outcome.elapsed = start.elapsed();
    info!(
        "{}: {} rows in {:.3} s ({} batches, {} nodes created, {} edges created)",
        statement.name,
        total_rows,
        outcome.elapsed.as_secs_f64(),
        outcome.batches,
        outcome.counters.nodes_created,
        outcome.counters.edges_created
    );

    Ok(outcome)
}
