use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::fetch::{FetchFailure, FetchOutcome, ItemId, PriceSource};

use super::latch::{CountdownLatch, LatchGuard, LatchWait};
use super::pool::WorkerPool;
use super::results::ResultCollection;

/// Default bound on how long one item waits for its backends.
pub const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(1);

/// How the wait for one item's fan-out ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherOutcome {
    Completed,
    TimedOut { pending: usize },
    Interrupted,
    /// The pool refused `rejected` of the item's fetches; they never ran.
    Undispatched { rejected: usize },
}

/// Fans each item out to every endpoint on a shared pool and waits, bounded
/// by `timeout`, for the answers to land in the shared result collection.
pub struct ScatterGather {
    endpoints: Arc<[String]>,
    timeout: Duration,
    pool: Arc<WorkerPool>,
    source: Arc<dyn PriceSource>,
    results: Arc<ResultCollection>,
}

impl ScatterGather {
    pub fn new(
        endpoints: Vec<String>,
        timeout: Duration,
        pool: Arc<WorkerPool>,
        source: Arc<dyn PriceSource>,
        results: Arc<ResultCollection>,
    ) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(AppError::message(
                "scatter-gather needs at least one endpoint",
            ));
        }

        Ok(Self {
            endpoints: endpoints.into(),
            timeout,
            pool,
            source,
            results,
        })
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn results(&self) -> &Arc<ResultCollection> {
        &self.results
    }

    /// Scatter `item` to every endpoint and gather until all answer or the
    /// timeout elapses. Tasks still running afterwards keep appending.
    pub fn scatter(&self, item: &ItemId) -> GatherOutcome {
        let latch = CountdownLatch::new(self.endpoints.len());
        let mut rejected = 0;

        for endpoint in self.endpoints.iter() {
            let task = FetchTask {
                endpoint: endpoint.clone(),
                item: item.clone(),
                source: Arc::clone(&self.source),
                results: Arc::clone(&self.results),
                guard: latch.guard(),
            };

            // A rejected task is dropped here, and its guard with it.
            if let Err(err) = self.pool.submit(move || task.run()) {
                log::warn!("Could not dispatch item:{item} to {endpoint}: {err}");
                rejected += 1;
            }
        }

        let outcome = match latch.wait_timeout(self.timeout) {
            _ if rejected > 0 => GatherOutcome::Undispatched { rejected },
            LatchWait::Released => GatherOutcome::Completed,
            LatchWait::TimedOut { remaining } => GatherOutcome::TimedOut { pending: remaining },
            LatchWait::Interrupted => GatherOutcome::Interrupted,
        };

        match outcome {
            GatherOutcome::Completed => {
                log::debug!("Gathered all {} prices for item:{item}", self.endpoints.len())
            }
            GatherOutcome::TimedOut { pending } => log::warn!(
                "Timed out after {}ms waiting on item:{item}, {pending} of {} still pending",
                self.timeout.as_millis(),
                self.endpoints.len()
            ),
            GatherOutcome::Interrupted => {
                log::error!("Wait for item:{item} was interrupted, continuing")
            }
            GatherOutcome::Undispatched { rejected } => log::error!(
                "{rejected} of {} fetches for item:{item} were never dispatched",
                self.endpoints.len()
            ),
        }

        outcome
    }
}

struct FetchTask {
    endpoint: String,
    item: ItemId,
    source: Arc<dyn PriceSource>,
    results: Arc<ResultCollection>,
    guard: LatchGuard,
}

impl FetchTask {
    fn run(self) {
        let FetchTask {
            endpoint,
            item,
            source,
            results,
            guard,
        } = self;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| source.fetch(&endpoint, &item)))
            .unwrap_or_else(|_| {
                log::error!("Price source panicked for item:{item} in url:{endpoint}");
                FetchOutcome::Failed(FetchFailure::Panicked)
            });

        let size = results.append_outcome(&outcome);
        drop(guard);
        log::debug!("Results size:{size} after item:{item} from {endpoint}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::thread;
    use std::time::Instant;

    /// Answers from a fixed table, optionally sleeping first.
    struct TableSource {
        prices: HashMap<String, FetchOutcome>,
        delay: Duration,
    }

    impl TableSource {
        fn new(entries: &[(&str, FetchOutcome)]) -> Self {
            Self {
                prices: entries
                    .iter()
                    .map(|(endpoint, outcome)| (endpoint.to_string(), outcome.clone()))
                    .collect(),
                delay: Duration::ZERO,
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl PriceSource for TableSource {
        fn fetch(&self, endpoint: &str, _item: &ItemId) -> FetchOutcome {
            if endpoint == "panic" {
                panic!("backend exploded");
            }
            thread::sleep(self.delay);
            self.prices
                .get(endpoint)
                .cloned()
                .unwrap_or(FetchOutcome::Failed(FetchFailure::Transport("unknown".into())))
        }
    }

    fn coordinator(
        endpoints: &[&str],
        timeout: Duration,
        source: TableSource,
    ) -> (ScatterGather, Arc<WorkerPool>) {
        let pool = Arc::new(WorkerPool::new(4).expect("pool"));
        let gather = ScatterGather::new(
            endpoints.iter().map(|e| e.to_string()).collect(),
            timeout,
            Arc::clone(&pool),
            Arc::new(source),
            Arc::new(ResultCollection::new()),
        )
        .expect("coordinator");
        (gather, pool)
    }

    #[test]
    fn completes_when_every_backend_answers() {
        let source = TableSource::new(&[
            ("a", FetchOutcome::Price(10)),
            ("b", FetchOutcome::Price(20)),
            ("c", FetchOutcome::Price(30)),
        ]);
        let (gather, _pool) = coordinator(&["a", "b", "c"], Duration::from_secs(5), source);

        assert_eq!(gather.scatter(&ItemId::from(1)), GatherOutcome::Completed);
        assert_eq!(gather.results().len(), 3);
        assert_eq!(gather.results().total(), 60);
    }

    #[test]
    fn failing_backend_still_releases_the_latch() {
        let source = TableSource::new(&[
            ("down", FetchOutcome::Failed(FetchFailure::Transport("refused".into()))),
            ("a", FetchOutcome::Price(100)),
            ("b", FetchOutcome::Price(100)),
        ]);
        let (gather, _pool) = coordinator(&["down", "a", "b"], Duration::from_secs(10), source);

        let started = Instant::now();
        let outcome = gather.scatter(&ItemId::from(1));

        assert_eq!(outcome, GatherOutcome::Completed);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(gather.results().snapshot().iter().filter(|v| **v == 0).count(), 1);
        assert_eq!(gather.results().failures(), 1);
    }

    #[test]
    fn panicking_backend_still_releases_the_latch() {
        let source = TableSource::new(&[("a", FetchOutcome::Price(5))]);
        let (gather, _pool) = coordinator(&["panic", "a"], Duration::from_secs(10), source);

        let started = Instant::now();
        assert_eq!(gather.scatter(&ItemId::from(1)), GatherOutcome::Completed);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(gather.results().len(), 2);
        assert_eq!(gather.results().total(), 5);
    }

    #[test]
    fn returns_after_timeout_and_results_arrive_later() {
        let source = TableSource::new(&[
            ("a", FetchOutcome::Price(1)),
            ("b", FetchOutcome::Price(2)),
        ])
        .delayed(Duration::from_millis(300));
        let (gather, pool) = coordinator(&["a", "b"], Duration::from_millis(50), source);

        let started = Instant::now();
        let outcome = gather.scatter(&ItemId::from(1));

        assert_eq!(outcome, GatherOutcome::TimedOut { pending: 2 });
        assert!(started.elapsed() < Duration::from_millis(250));

        pool.join();
        assert_eq!(gather.results().len(), 2);
        assert_eq!(gather.results().total(), 3);
    }

    #[test]
    fn shut_down_pool_reports_undispatched_fetches() {
        let source = TableSource::new(&[("a", FetchOutcome::Price(1))]);
        let (gather, pool) = coordinator(&["a", "b"], Duration::from_secs(10), source);
        pool.shutdown();

        let started = Instant::now();
        assert_eq!(
            gather.scatter(&ItemId::from(1)),
            GatherOutcome::Undispatched { rejected: 2 }
        );
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(gather.results().is_empty());
    }

    #[test]
    fn rejects_empty_endpoint_list() {
        let pool = Arc::new(WorkerPool::new(1).expect("pool"));
        let result = ScatterGather::new(
            Vec::new(),
            DEFAULT_ITEM_TIMEOUT,
            pool,
            Arc::new(TableSource::new(&[])),
            Arc::new(ResultCollection::new()),
        );
        assert!(result.is_err());
    }
}
