//! Embedded dag action store backed by redb.
//!
//! # Table design
//!
//! A single `DAG_ACTIONS` table keyed by a deterministic byte encoding of the
//! action key:
//! ```text
//! [ len(group): u32 BE | group | len(name): u32 BE | name | exec_id: u64 BE | action tag: u8 ]
//! ```
//!
//! The value is the JSON-encoded `DagAction`. redb admits one write
//! transaction at a time, so the presence check and the insert inside
//! `add_dag_action` are atomic with respect to every other handle on the same
//! database.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::{FlowctlError, Result};
use crate::types::{ActionType, DagAction, FlowIdentity};

use super::{store_err, DagActionStore};

// ---------------------------------------------------------------------------
// Table definition
// ---------------------------------------------------------------------------

const DAG_ACTIONS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("dag_actions");

// ---------------------------------------------------------------------------
// Key helpers
// ---------------------------------------------------------------------------

fn action_key(flow: &FlowIdentity, action_type: ActionType) -> Vec<u8> {
    let group = flow.flow_group().as_bytes();
    let name = flow.flow_name().as_bytes();
    let mut key = Vec::with_capacity(4 + group.len() + 4 + name.len() + 8 + 1);
    push_segment(&mut key, group);
    push_segment(&mut key, name);
    // FlowIdentity guarantees a non-negative id.
    key.extend_from_slice(&(flow.flow_execution_id() as u64).to_be_bytes());
    key.push(action_type.tag());
    key
}

fn push_segment(key: &mut Vec<u8>, segment: &[u8]) {
    key.extend_from_slice(&(segment.len() as u32).to_be_bytes());
    key.extend_from_slice(segment);
}

// ---------------------------------------------------------------------------
// RedbDagActionStore
// ---------------------------------------------------------------------------

/// redb holds an exclusive file lock, so one process owns the database.
/// Share the store between threads with an `Arc`.
pub struct RedbDagActionStore {
    db: Database,
}

impl RedbDagActionStore {
    /// Open or create the redb database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(store_err)?;
        // Ensure the table exists before any reads
        let wt = db.begin_write().map_err(store_err)?;
        wt.open_table(DAG_ACTIONS).map_err(store_err)?;
        wt.commit().map_err(store_err)?;
        Ok(Self { db })
    }
}

impl DagActionStore for RedbDagActionStore {
    fn exists(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<bool> {
        let key = action_key(flow, action_type);
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(DAG_ACTIONS).map_err(store_err)?;
        let found = table.get(key.as_slice()).map_err(store_err)?.is_some();
        Ok(found)
    }

    fn add_dag_action(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<DagAction> {
        let action = DagAction::new(flow.clone(), action_type);
        let key = action_key(flow, action_type);
        let value = serde_json::to_vec(&action)?;

        let wt = self.db.begin_write().map_err(store_err)?;
        let duplicate = {
            let mut table = wt.open_table(DAG_ACTIONS).map_err(store_err)?;
            let present = table.get(key.as_slice()).map_err(store_err)?.is_some();
            if !present {
                table
                    .insert(key.as_slice(), value.as_slice())
                    .map_err(store_err)?;
            }
            present
        };

        if duplicate {
            wt.abort().map_err(store_err)?;
            return Err(FlowctlError::DuplicateDagAction {
                flow: flow.clone(),
                action_type,
            });
        }
        wt.commit().map_err(store_err)?;
        Ok(action)
    }

    fn delete_dag_action(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<bool> {
        let key = action_key(flow, action_type);
        let wt = self.db.begin_write().map_err(store_err)?;
        let removed = {
            let mut table = wt.open_table(DAG_ACTIONS).map_err(store_err)?;
            let old = table.remove(key.as_slice()).map_err(store_err)?;
            old.is_some()
        };
        wt.commit().map_err(store_err)?;
        Ok(removed)
    }

    fn list_dag_actions(&self) -> Result<Vec<DagAction>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(DAG_ACTIONS).map_err(store_err)?;

        let mut result = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, v) = entry.map_err(store_err)?;
            let action: DagAction = serde_json::from_slice(v.value()).map_err(store_err)?;
            result.push(action);
        }
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
