//! Scatter-gather over a shared worker pool: one countdown latch per item,
//! a bounded wait, and a shared append-only result collection.

pub mod coordinator;
pub mod driver;
pub mod latch;
pub mod pool;
pub mod results;

pub use coordinator::{GatherOutcome, ScatterGather, DEFAULT_ITEM_TIMEOUT};
pub use driver::{BatchDriver, BatchReport, ReadPolicy};
pub use latch::{CountdownLatch, LatchGuard, LatchWait};
pub use pool::{ensure_pool_size, WorkerPool, DEFAULT_POOL_SIZE};
pub use results::ResultCollection;
