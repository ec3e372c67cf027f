use std::sync::{Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{self as channel, Receiver, Sender};

use crate::error::{AppError, Context, Result};

/// Default number of worker threads shared by a batch run.
pub const DEFAULT_POOL_SIZE: usize = 4;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[inline]
pub fn ensure_pool_size(size: usize) -> usize {
    size.max(1)
}

/// Fixed set of OS threads pulling fire-and-forget jobs from a shared FIFO queue.
///
/// Jobs beyond `capacity` wait in the queue. The pool never catches or retries
/// job failures: a panicking job takes its worker thread down with it.
pub struct WorkerPool {
    capacity: usize,
    sender: RwLock<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = ensure_pool_size(capacity);
        let (sender, receiver) = channel::unbounded::<Job>();

        let mut workers = Vec::with_capacity(capacity);
        for index in 0..capacity {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("gather-worker-{index}"))
                .spawn(move || run_worker(receiver))
                .with_context(|| format!("Failed to spawn worker thread {index}"))?;
            workers.push(handle);
        }

        Ok(Self {
            capacity,
            sender: RwLock::new(Some(sender)),
            workers: Mutex::new(workers),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue `job` and return immediately.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(sender) => sender
                .send(Box::new(job))
                .map_err(|_| AppError::PoolShutDown),
            None => Err(AppError::PoolShutDown),
        }
    }

    /// Stop accepting jobs. Already queued and running jobs still complete.
    pub fn shutdown(&self) {
        let mut sender = self.sender.write().unwrap_or_else(PoisonError::into_inner);
        if sender.take().is_some() {
            log::debug!("Worker pool shutting down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Shut down and block until every worker has drained the queue and exited.
    pub fn join(&self) {
        self.shutdown();

        let handles: Vec<_> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for handle in handles {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                log::error!("{name} exited after a job panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join();
    }
}

fn run_worker(receiver: Receiver<Job>) {
    // `recv` fails once the sender is gone and the queue is empty.
    while let Ok(job) = receiver.recv() {
        job();
    }
}
