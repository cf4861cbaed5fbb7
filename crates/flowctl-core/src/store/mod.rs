//! Durable storage for pending DAG actions.
//!
//! A [`DagActionStore`] holds at most one record per `(flow, action type)` key.
//! `add_dag_action` must refuse a second insert for a live key with
//! [`FlowctlError::DuplicateDagAction`]; the admission controller relies on
//! that refusal, not on `exists`, to stay correct when several replicas admit
//! the same action at once.
//!
//! Every method is a blocking call against the backing medium.

pub mod memory;
pub mod redb_store;
pub mod sqlite;

use std::path::Path;
use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::error::{FlowctlError, Result};
use crate::types::{ActionType, DagAction, FlowIdentity};

pub use memory::InMemoryDagActionStore;
pub use redb_store::RedbDagActionStore;
pub use sqlite::SqliteDagActionStore;

pub trait DagActionStore: Send + Sync {
    /// Whether a pending action exists for the key.
    fn exists(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<bool>;

    /// Insert a new pending action, failing with `DuplicateDagAction` if the
    /// key is already present.
    fn add_dag_action(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<DagAction>;

    /// Remove a processed action. Returns `false` if nothing was stored.
    fn delete_dag_action(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<bool>;

    /// All pending actions, oldest first.
    fn list_dag_actions(&self) -> Result<Vec<DagAction>>;
}

/// Open the store selected by `config`, rooted at `root`.
pub fn open(config: &Config, root: &Path) -> Result<Arc<dyn DagActionStore>> {
    let path = config.store_path(root);
    let store: Arc<dyn DagActionStore> = match config.store.backend {
        StoreBackend::Redb => {
            ensure_parent(&path)?;
            Arc::new(RedbDagActionStore::open(&path)?)
        }
        StoreBackend::Sqlite => {
            ensure_parent(&path)?;
            Arc::new(SqliteDagActionStore::open(&path)?)
        }
        StoreBackend::Memory => Arc::new(InMemoryDagActionStore::new()),
    };
    tracing::debug!(
        backend = ?config.store.backend,
        path = %path.display(),
        "opened dag action store"
    );
    Ok(store)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        crate::io::ensure_dir(parent)?;
    }
    Ok(())
}

pub(crate) fn store_err(e: impl std::fmt::Display) -> FlowctlError {
    FlowctlError::ActionStore(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_backend_is_shared_by_two_replicas() {
        let dir = TempDir::new().unwrap();
        let replica_a = open(&Config::new("a"), dir.path()).unwrap();
        let replica_b = open(&Config::new("b"), dir.path()).unwrap();
        let flow = FlowIdentity::new("g", "f", 100).unwrap();

        replica_a.add_dag_action(&flow, ActionType::Resume).unwrap();
        assert!(replica_b.exists(&flow, ActionType::Resume).unwrap());

        // A consumer on another handle can drain while the first stays open.
        assert!(replica_b.delete_dag_action(&flow, ActionType::Resume).unwrap());
        assert!(!replica_a.exists(&flow, ActionType::Resume).unwrap());
        replica_a.add_dag_action(&flow, ActionType::Resume).unwrap();
    }

    #[test]
    fn redb_backend_is_single_process() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new("a");
        config.store.backend = StoreBackend::Redb;
        let _held = open(&config, dir.path()).unwrap();

        assert!(matches!(
            open(&config, dir.path()),
            Err(FlowctlError::ActionStore(_))
        ));
    }
}
