use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use flowctl_core::config::Config;
use flowctl_core::{ActionRequestHandler, AdmissionController, DagActionStore};

use crate::leadership::{LeadershipHandle, LeadershipSignal};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub replica_id: String,
    pub handler: ActionRequestHandler,
    pub leadership: Arc<dyn LeadershipSignal>,
    pub store_timeout: Duration,
}

impl AppState {
    pub fn new(
        replica_id: impl Into<String>,
        store: Arc<dyn DagActionStore>,
        leadership: Arc<dyn LeadershipSignal>,
        store_timeout: Duration,
    ) -> Self {
        let state = Self {
            replica_id: replica_id.into(),
            handler: ActionRequestHandler::new(AdmissionController::new(store)),
            leadership,
            store_timeout,
        };

        // Log leadership transitions for this replica.
        // Guard: only spawn if inside a Tokio runtime (skipped in sync unit tests).
        if tokio::runtime::Handle::try_current().is_ok() {
            let mut rx = state.leadership.subscribe();
            let replica_id = state.replica_id.clone();
            tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let is_leader = *rx.borrow_and_update();
                    tracing::info!(replica_id = %replica_id, is_leader, "leadership changed");
                }
            });
        }

        state
    }

    /// Open the configured store and build state for this replica.
    ///
    /// Returns the leadership handle so the caller can wire it to an election
    /// mechanism.
    pub fn from_config(
        config: &Config,
        root: &Path,
        force_leader: bool,
    ) -> flowctl_core::Result<(Self, LeadershipHandle)> {
        let store = flowctl_core::store::open(config, root)?;
        let leadership = LeadershipHandle::new(force_leader || config.leadership.force_leader);
        let state = Self::new(
            config.replica_id.clone(),
            store,
            Arc::new(leadership.clone()),
            config.store_timeout(),
        );
        Ok((state, leadership))
    }

    pub fn store(&self) -> &Arc<dyn DagActionStore> {
        self.handler.controller().store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowctl_core::config::StoreBackend;
    use flowctl_core::store::InMemoryDagActionStore;

    #[test]
    fn new_state_stores_replica_id() {
        let state = AppState::new(
            "replica-a",
            Arc::new(InMemoryDagActionStore::new()),
            Arc::new(LeadershipHandle::new(false)),
            Duration::from_secs(1),
        );
        assert_eq!(state.replica_id, "replica-a");
        assert!(!state.leadership.is_leader());
    }

    #[test]
    fn from_config_honours_force_leader() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::new("replica-b");
        config.store.backend = StoreBackend::Memory;
        config.leadership.force_leader = true;

        let (state, handle) = AppState::from_config(&config, dir.path(), false).unwrap();
        assert!(state.leadership.is_leader());
        handle.set_leader(false);
        assert!(!state.leadership.is_leader());
    }
}
