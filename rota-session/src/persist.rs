//! Background persistence of the session state.
//!
//! Saves run one at a time on the blocking pool. Snapshots queued while a
//! save is running collapse into the newest one. Failures are logged and
//! swallowed; the in-memory state stays authoritative.

use std::sync::Arc;

use rota_core::{PersistedState, PersistedStateStore};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Load the persisted state, logging and discarding failures.
pub(crate) async fn load(store: Arc<dyn PersistedStateStore>) -> Option<PersistedState> {
    match tokio::task::spawn_blocking(move || store.load()).await {
        Ok(Ok(state)) => state,
        Ok(Err(err)) => {
            log::warn!("failed to load saved route state: {err}");
            None
        }
        Err(err) => {
            log::warn!("route state load task failed: {err}");
            None
        }
    }
}

/// Serial writer for state snapshots.
pub(crate) struct PersistWorker {
    queue: mpsc::UnboundedSender<PersistedState>,
    task: JoinHandle<()>,
}

impl PersistWorker {
    pub(crate) fn spawn(store: Arc<dyn PersistedStateStore>) -> Self {
        let (queue, mut pending) = mpsc::unbounded_channel::<PersistedState>();
        let task = tokio::spawn(async move {
            while let Some(mut state) = pending.recv().await {
                while let Ok(newer) = pending.try_recv() {
                    state = newer;
                }
                let store = Arc::clone(&store);
                match tokio::task::spawn_blocking(move || store.save(&state)).await {
                    Ok(Ok(())) => log::trace!("route state saved"),
                    Ok(Err(err)) => log::warn!("failed to save route state: {err}"),
                    Err(err) => log::warn!("route state save task failed: {err}"),
                }
            }
        });
        Self { queue, task }
    }

    /// Queue `state` for saving.
    pub(crate) fn save(&self, state: PersistedState) {
        if self.queue.send(state).is_err() {
            log::warn!("persistence worker stopped; dropping state snapshot");
        }
    }

    /// Wait for every queued snapshot to be written.
    pub(crate) async fn flush(self) {
        drop(self.queue);
        if let Err(err) = self.task.await {
            log::warn!("persistence worker failed: {err}");
        }
    }
}
