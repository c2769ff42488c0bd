//! Progress reporting
//!
//! Algorithms report how many cells they have processed through
//! [`Progress`]. Reporting is purely observational: no implementation can
//! change a result. Implementations must tolerate `inc` being called from
//! many threads at once.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Sink for progress updates from a running algorithm.
pub trait Progress: Sync {
    /// Called once before any work, with the number of cells to process
    fn start(&self, total: u64);

    /// Called whenever `n` more cells are done
    fn inc(&self, n: u64);

    /// Called once after the last cell
    fn stop(&self);
}

/// Discards all progress updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&self, _total: u64) {}
    fn inc(&self, _n: u64) {}
    fn stop(&self) {}
}

/// Lock-free counter, mostly useful in tests and for polling from another thread.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    total: AtomicU64,
    done: AtomicU64,
    finished: AtomicBool,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total announced by the last `start`
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Cells reported so far
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    /// Whether `stop` has been called since the last `start`
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

impl Progress for ProgressCounter {
    fn start(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        self.finished.store(false, Ordering::Release);
    }

    fn inc(&self, n: u64) {
        self.done.fetch_add(n, Ordering::Relaxed);
    }

    fn stop(&self) {
        self.finished.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_tracks_concurrent_increments() {
        let counter = ProgressCounter::new();
        counter.start(4000);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..1000 {
                        counter.inc(1);
                    }
                });
            }
        });
        counter.stop();

        assert_eq!(counter.total(), 4000);
        assert_eq!(counter.done(), 4000);
        assert!(counter.is_finished());
    }

    #[test]
    fn test_restart_resets_count() {
        let counter = ProgressCounter::new();
        counter.start(10);
        counter.inc(10);
        counter.stop();
        counter.start(5);
        assert_eq!(counter.done(), 0);
        assert!(!counter.is_finished());
    }
}
