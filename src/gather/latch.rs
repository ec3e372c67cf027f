use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// How a wait on a [`CountdownLatch`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchWait {
    Released,
    TimedOut { remaining: usize },
    /// The latch mutex was poisoned by a panicking holder.
    Interrupted,
}

/// One-shot countdown barrier. Arms with `count`, releases waiters at zero.
#[derive(Debug)]
pub struct CountdownLatch {
    count: Mutex<usize>,
    released: Condvar,
}

impl CountdownLatch {
    pub fn new(count: usize) -> Arc<Self> {
        Arc::new(Self {
            count: Mutex::new(count),
            released: Condvar::new(),
        })
    }

    /// Hand out a guard that counts the latch down once when dropped.
    pub fn guard(self: &Arc<Self>) -> LatchGuard {
        LatchGuard {
            latch: Arc::clone(self),
        }
    }

    pub fn count_down(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        if *count > 0 {
            *count -= 1;
            if *count == 0 {
                self.released.notify_all();
            }
        }
    }

    pub fn count(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the count reaches zero or `timeout` elapses.
    /// A timeout leaves the count untouched.
    pub fn wait_timeout(&self, timeout: Duration) -> LatchWait {
        let guard = match self.count.lock() {
            Ok(guard) => guard,
            Err(_) => return LatchWait::Interrupted,
        };

        match self
            .released
            .wait_timeout_while(guard, timeout, |count| *count > 0)
        {
            Ok((count, result)) if result.timed_out() && *count > 0 => {
                LatchWait::TimedOut { remaining: *count }
            }
            Ok(_) => LatchWait::Released,
            Err(_) => LatchWait::Interrupted,
        }
    }
}

/// Scoped completion signal. Every exit path of the holder, including panics
/// and never being run at all, counts the latch down exactly once.
#[derive(Debug)]
pub struct LatchGuard {
    latch: Arc<CountdownLatch>,
}

impl Drop for LatchGuard {
    fn drop(&mut self) {
        self.latch.count_down();
    }
}
