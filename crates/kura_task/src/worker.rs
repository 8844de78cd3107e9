use std::{any::Any, sync::Arc};

use parking_lot::{Condvar, Mutex};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{AsyncResult, IntoAsyncResult, Promise, TaskError};

#[derive(Default)]
struct PendingTasks {
    count: Mutex<usize>,
    idle: Condvar,
}
impl PendingTasks {
    fn increment(&self) {
        *self.count.lock() += 1;
    }
    fn decrement(&self) {
        let mut count = self.count.lock();
        *count -= 1;
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

// Decrements on drop so a panicking task still counts as finished
struct TaskGuard(Arc<PendingTasks>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

/// Runs closures off the calling thread on a shared thread pool and keeps
/// track of how many are still queued or running.
#[derive(Clone)]
pub struct Worker {
    pool: Arc<ThreadPool>,
    pending: Arc<PendingTasks>,
}

impl Worker {
    /// `threads == 0` lets rayon pick the number of threads
    pub fn new(threads: usize, thread_name: &str) -> anyhow::Result<Self> {
        let thread_name = thread_name.to_owned();
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |index| format!("{}-{}", thread_name, index))
            .panic_handler(|payload| {
                log::error!("Worker task panicked: {}", panic_message(&*payload));
            })
            .build()?;

        Ok(Self::with_threadpool(Arc::new(pool)))
    }
    pub fn with_threadpool(pool: Arc<ThreadPool>) -> Self {
        Self {
            pool,
            pending: Default::default(),
        }
    }
    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }
    pub fn spawn(&self, task: impl FnOnce() + Send + 'static) {
        self.pending.increment();
        let guard = TaskGuard(self.pending.clone());

        self.pool.spawn(move || {
            let _guard = guard;
            task();
        });
    }
    /// Runs `work` on the pool. If `work` hands back another `AsyncResult`
    /// the returned result completes only once that one does.
    pub fn schedule<T, E, R, F>(&self, work: F) -> AsyncResult<T, E>
    where
        T: Clone + Send + 'static,
        E: TaskError,
        R: IntoAsyncResult<T, E>,
        F: FnOnce() -> R + Send + 'static,
    {
        let (promise, result) = Promise::new();
        self.spawn(move || promise.resolve_with(work().into_async_result()));

        result
    }
    /// Number of spawned tasks that have not finished yet
    pub fn pending_tasks(&self) -> usize {
        *self.pending.count.lock()
    }
    /// Blocks until no task is queued or running, including tasks spawned by
    /// other tasks while waiting. Must not be called from a worker thread.
    pub fn wait_all(&self) {
        let mut count = self.pending.count.lock();
        while *count != 0 {
            self.pending.idle.wait(&mut count);
        }
    }
}
