//! Fixed-size worker pool.
//!
//! Workers pull boxed closures from a shared FIFO queue guarded by one
//! mutex and two condition variables: one wakes idle workers when work
//! arrives, the other wakes callers of [`WorkerPool::wait_all`] once the
//! queue is empty and no job is executing.
//!
//! Jobs own everything they touch (`Arc` handles to shared inputs and
//! result sinks), so no job can outlive the data it reads. Dropping the
//! pool drains the queue and joins every worker; queued work is completed,
//! never discarded.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    active: usize,
    shutting_down: bool,
}

impl QueueState {
    fn is_idle(&self) -> bool {
        self.jobs.is_empty() && self.active == 0
    }
}

#[derive(Default)]
struct Shared {
    state: Mutex<QueueState>,
    work_available: Condvar,
    all_done: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Jobs run outside the lock, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish_job(&self) {
        let mut state = self.lock();
        state.active -= 1;
        if state.is_idle() {
            self.all_done.notify_all();
        }
    }
}

/// Thread pool with a blocking completion barrier.
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use u_rescue::pool::WorkerPool;
///
/// let pool = WorkerPool::new(2);
/// let total = Arc::new(Mutex::new(0));
/// for i in 1..=4 {
///     let total = Arc::clone(&total);
///     pool.execute(move || *total.lock().unwrap() += i);
/// }
/// pool.wait_all();
/// assert_eq!(*total.lock().unwrap(), 10);
/// ```
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `threads` workers (at least one).
    pub fn new(threads: usize) -> Self {
        let threads = threads.max(1);
        let shared = Arc::new(Shared::default());
        let mut workers = Vec::with_capacity(threads);

        for id in 0..threads {
            let shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("rescue-worker-{id}"))
                .spawn(move || worker_loop(&shared));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => error!("failed to spawn worker {id}: {e}"),
            }
        }

        debug!("worker pool started with {} threads", workers.len());
        Self { shared, workers }
    }

    /// Starts one worker per available hardware thread.
    pub fn with_available_parallelism() -> Self {
        let n = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(n)
    }

    /// Number of worker threads.
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues a job and wakes one idle worker.
    ///
    /// If no worker could be spawned the job runs on the calling thread.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.workers.is_empty() {
            job();
            return;
        }
        self.shared.lock().jobs.push_back(Box::new(job));
        self.shared.work_available.notify_one();
    }

    /// Blocks until the queue is empty and no job is running.
    pub fn wait_all(&self) {
        let mut state = self.shared.lock();
        while !state.is_idle() {
            state = self
                .shared
                .all_done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::with_available_parallelism()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.lock().shutting_down = true;
        self.shared.work_available.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread terminated abnormally");
            }
        }
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut state = shared.lock();
            loop {
                if let Some(job) = state.jobs.pop_front() {
                    state.active += 1;
                    break job;
                }
                if state.shutting_down {
                    return;
                }
                state = shared
                    .work_available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!("pool job panicked; its result is lost");
        }
        shared.finish_job();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_wait_all_sees_every_job() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait_all();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_wait_all_on_idle_pool_returns() {
        let pool = WorkerPool::new(2);
        pool.wait_all();
        assert_eq!(pool.thread_count(), 2);
    }

    #[test]
    fn test_zero_threads_still_runs() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.thread_count(), 1);
        let flag = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&flag);
        pool.execute(move || {
            f.store(1, Ordering::SeqCst);
        });
        pool.wait_all();
        assert_eq!(flag.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_drains_queue() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(1);
            for _ in 0..20 {
                let counter = Arc::clone(&counter);
                pool.execute(move || {
                    thread::sleep(Duration::from_millis(1));
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_panicking_job_does_not_block_barrier() {
        let pool = WorkerPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        pool.execute(|| panic!("boom"));
        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait_all();
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(pool.thread_count(), 2);
    }

    #[test]
    fn test_pool_is_reusable_after_barrier() {
        let pool = WorkerPool::new(3);
        let counter = Arc::new(AtomicUsize::new(0));
        for round in 1..=3 {
            for _ in 0..10 {
                let counter = Arc::clone(&counter);
                pool.execute(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
            pool.wait_all();
            assert_eq!(counter.load(Ordering::SeqCst), round * 10);
        }
    }
}
