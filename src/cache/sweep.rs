//! Background eviction task
//!
//! Runs one sweep pass per interval on the tokio runtime until the owning
//! cache is shut down or dropped.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use super::store::Shared;

/// Handle for stopping the background sweep task
pub(crate) struct SweepHandle {
    /// Dropping the sender also stops the task
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Spawns the sweep loop on `runtime`
    ///
    /// The first pass runs one full interval after spawning; an entry can
    /// not be stale before then.
    pub(crate) fn spawn(runtime: &Handle, shared: Arc<Shared>) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let period = shared.interval;

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the first tick (immediate)
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = shared.sweep_expired();
                        if evicted > 0 {
                            debug!(evicted, remaining = shared.len(), "cache sweep");
                        } else {
                            trace!("cache sweep: nothing to evict");
                        }
                    }
                    _ = &mut shutdown_rx => {
                        debug!("cache sweep stopped");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    /// Asks the task to stop without waiting for it
    pub(crate) fn signal(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Stops the task and waits until it has exited
    pub(crate) async fn stop(mut self) {
        self.signal();
        let _ = self.task.await;
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
