//! Periodic sweep tasks
//!
//! In-memory stores (rate-limit records, CSRF tokens) grow with every new
//! client. A sweeper task removes expired entries on a fixed period. The
//! owner starts it with [`spawn_sweeper`] and stops it with
//! [`SweeperHandle::stop`] during shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at};

/// A store with expirable entries.
pub trait Sweep: Send + Sync {
    /// Remove expired entries. Returns how many were removed.
    fn sweep(&self) -> usize;
}

/// Handle to a running sweep task
pub struct SweeperHandle {
    name: &'static str,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the task to exit and wait for it.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(sweeper = self.name, error = %e, "Sweeper task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a task that calls `target.sweep()` every `period`.
///
/// The first sweep runs one `period` after spawning. Must be called from
/// within a tokio runtime.
pub fn spawn_sweeper<T>(name: &'static str, target: Arc<T>, period: Duration) -> SweeperHandle
where
    T: Sweep + ?Sized + 'static,
{
    let (tx, mut rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = target.sweep();
                    if removed > 0 {
                        tracing::debug!(sweeper = name, removed, "Swept expired entries");
                    }
                }
                _ = &mut rx => {
                    tracing::debug!(sweeper = name, "Sweeper stopped");
                    break;
                }
            }
        }
    });

    tracing::info!(sweeper = name, period_secs = period.as_secs(), "Sweeper started");

    SweeperHandle {
        name,
        shutdown: Some(tx),
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        sweeps: AtomicUsize,
    }

    impl Sweep for CountingStore {
        fn sweep(&self) -> usize {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            1
        }
    }

    #[tokio::test]
    async fn test_sweeper_runs_periodically_and_stops() {
        let store = Arc::new(CountingStore::default());
        let handle = spawn_sweeper("test", store.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(store.sweeps.load(Ordering::SeqCst) >= 2);

        handle.stop().await;
        let after_stop = store.sweeps.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.sweeps.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn test_sweeper_accepts_trait_objects() {
        let store: Arc<dyn Sweep> = Arc::new(CountingStore::default());
        let handle = spawn_sweeper("dyn", store, Duration::from_secs(3600));
        assert!(!handle.is_finished());
        handle.stop().await;
    }
}
