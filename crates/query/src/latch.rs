//! Completion latch for scan tasks

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counts outstanding tasks down to zero
pub(crate) struct Latch {
    remaining: Mutex<usize>,
    done: Condvar,
    panicked: AtomicBool,
}

impl Latch {
    pub(crate) fn new(tasks: usize) -> Arc<Self> {
        Arc::new(Self {
            remaining: Mutex::new(tasks),
            done: Condvar::new(),
            panicked: AtomicBool::new(false),
        })
    }

    /// Guard that counts down when the task ends, even by unwinding
    pub(crate) fn task(self: &Arc<Self>) -> TaskGuard {
        TaskGuard {
            latch: Arc::clone(self),
        }
    }

    /// Block until every task finished or `bound` elapsed
    ///
    /// Returns false on timeout.
    pub(crate) fn wait_for(&self, bound: Duration) -> bool {
        let deadline = Instant::now() + bound;
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            if self.done.wait_until(&mut remaining, deadline).timed_out() {
                return *remaining == 0;
            }
        }
        true
    }

    pub(crate) fn panicked(&self) -> bool {
        self.panicked.load(Ordering::Acquire)
    }

    fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.done.notify_all();
        }
    }
}

pub(crate) struct TaskGuard {
    latch: Arc<Latch>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.latch.panicked.store(true, Ordering::Release);
        }
        self.latch.count_down();
    }
}
