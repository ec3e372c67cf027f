use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::fetch::{ItemId, PriceSource};

use super::coordinator::{GatherOutcome, ScatterGather};
use super::pool::WorkerPool;
use super::results::ResultCollection;

/// When the driver reads totals relative to background work still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPolicy {
    /// Read as soon as the last item's wait returns; late answers are missed.
    #[default]
    BestEffort,
    /// Shut the pool down and wait for every task before reading.
    Drain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub results: usize,
    pub total: u128,
    pub failures: usize,
    pub timed_out_items: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

/// Drives items through one shared coordinator, one item at a time.
pub struct BatchDriver {
    gather: ScatterGather,
    pool: Arc<WorkerPool>,
    results: Arc<ResultCollection>,
    read_policy: ReadPolicy,
}

impl BatchDriver {
    /// Construct the pool and result collection for a single run.
    pub fn new(
        endpoints: Vec<String>,
        pool_size: usize,
        timeout: Duration,
        source: Arc<dyn PriceSource>,
    ) -> Result<Self> {
        let pool = Arc::new(WorkerPool::new(pool_size)?);
        let results = Arc::new(ResultCollection::new());
        let gather = ScatterGather::new(
            endpoints,
            timeout,
            Arc::clone(&pool),
            source,
            Arc::clone(&results),
        )?;

        Ok(Self {
            gather,
            pool,
            results,
            read_policy: ReadPolicy::default(),
        })
    }

    pub fn with_read_policy(mut self, read_policy: ReadPolicy) -> Self {
        self.read_policy = read_policy;
        self
    }

    pub fn results(&self) -> &Arc<ResultCollection> {
        &self.results
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Scatter every item in order, then report. The pool is shut down on
    /// return; with `ReadPolicy::BestEffort` tasks may still be finishing.
    /// A driver runs once: later calls fail with `AppError::PoolShutDown`.
    pub fn run(&self, items: &[ItemId]) -> Result<BatchReport> {
        if self.pool.is_shut_down() {
            return Err(AppError::PoolShutDown);
        }

        let started = Instant::now();
        let mut timed_out_items = 0;

        for item in items {
            match self.gather.scatter(item) {
                GatherOutcome::Completed => {}
                GatherOutcome::TimedOut { .. } | GatherOutcome::Interrupted => {
                    timed_out_items += 1
                }
                GatherOutcome::Undispatched { rejected } => {
                    log::error!("Pool rejected {rejected} fetches for item:{item}, aborting batch");
                    self.pool.shutdown();
                    return Err(AppError::PoolShutDown);
                }
            }
        }

        if self.read_policy == ReadPolicy::Drain {
            self.pool.join();
        }

        let report = BatchReport {
            results: self.results.len(),
            total: self.results.total(),
            failures: self.results.failures(),
            timed_out_items,
            elapsed: started.elapsed(),
        };

        self.pool.shutdown();
        log::info!(
            "Batch of {} items finished: {} results, total {}, {} failures, {} timed out",
            items.len(),
            report.results,
            report.total,
            report.failures,
            report.timed_out_items
        );

        Ok(report)
    }
}
