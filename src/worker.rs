//! The shared worker pool for long translator work.
//!
//! Translators run to completion on the session task and must never
//! block it; anything slow (skin blob decoding, lookups against the
//! auth server) is submitted here and re-enters the session through a
//! mailbox message delivered by the completion closure.

use std::sync::Arc;
use tokio::sync::Semaphore;

pub struct Workers {
    permits: Arc<Semaphore>,
}

impl Workers {
    /// A pool admitting `limit` concurrent jobs.
    pub fn new(limit: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.max(1))),
        }
    }

    /// Runs `job` on a blocking thread once a permit is available, then
    /// invokes `complete` with its output. `complete` should only post
    /// a message; it runs outside any session task.
    pub fn submit<T, J, C>(&self, job: J, complete: C)
    where
        T: Send + 'static,
        J: FnOnce() -> T + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            match tokio::task::spawn_blocking(job).await {
                Ok(value) => complete(value),
                Err(e) => tracing::warn!("worker job panicked: {e}"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submit_delivers_completion() {
        let workers = Workers::new(2);
        let (tx, rx) = flume::bounded(1);
        workers.submit(|| 21 * 2, move |value| {
            tx.send(value).unwrap();
        });
        assert_eq!(rx.recv_async().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn jobs_queue_behind_the_permit_limit() {
        let workers = Workers::new(1);
        let (tx, rx) = flume::unbounded();
        for i in 0..4 {
            let tx = tx.clone();
            workers.submit(move || i, move |value| {
                tx.send(value).unwrap();
            });
        }
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(rx.recv_async().await.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }
}
