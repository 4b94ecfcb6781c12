//! Bounded worker pool
//!
//! Every submitted future runs as its own tokio task, but at most `size` of
//! them hold a permit at once. Results are handed back in completion order,
//! never submission order.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

pub struct WorkerPool<T> {
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<T>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Creates a pool running at most `size` tasks concurrently (minimum 1)
    pub fn new(size: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(size.max(1))),
            tasks: JoinSet::new(),
        }
    }

    /// Submits a task; it starts as soon as a worker slot is free
    pub fn submit<Fut>(&mut self, task: Fut)
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        self.tasks.spawn(async move {
            // The pool never closes its semaphore, so this only waits
            let _permit = semaphore.acquire_owned().await;
            task.await
        });
    }

    /// Waits for the next task to finish, whichever it is
    ///
    /// Returns `None` once every submitted task has been collected.
    pub async fn next_completed(&mut self) -> Option<Result<T, JoinError>> {
        self.tasks.join_next().await
    }

    /// Tasks submitted but not yet collected
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}
