//! In-memory dag action store for testing and development.
//!
//! Not durable and not shared across processes. Faults can be injected to
//! simulate an unreachable backing medium.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::error::{FlowctlError, Result};
use crate::types::{ActionType, DagAction, FlowIdentity};

use super::DagActionStore;

type ActionKey = (FlowIdentity, ActionType);

#[derive(Debug, Default)]
pub struct InMemoryDagActionStore {
    actions: RwLock<BTreeMap<ActionKey, DagAction>>,
    fail_exists: AtomicBool,
    fail_inserts: AtomicBool,
}

fn poison_err<T>(_: PoisonError<T>) -> FlowctlError {
    FlowctlError::ActionStore("lock poisoned".into())
}

impl InMemoryDagActionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `exists` call fail until reset.
    pub fn fail_exists(&self, fail: bool) {
        self.fail_exists.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `add_dag_action` call fail until reset.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of stored actions. A poisoned lock still reports the entries
    /// it guards; a panicking writer never leaves the map half-updated.
    pub fn len(&self) -> usize {
        self.actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DagActionStore for InMemoryDagActionStore {
    fn exists(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<bool> {
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(FlowctlError::ActionStore(
                "injected fault: store unreachable".into(),
            ));
        }
        let actions = self.actions.read().map_err(poison_err)?;
        Ok(actions.contains_key(&(flow.clone(), action_type)))
    }

    fn add_dag_action(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<DagAction> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(FlowctlError::ActionStore(
                "injected fault: insert failed".into(),
            ));
        }
        let mut actions = self.actions.write().map_err(poison_err)?;
        match actions.entry((flow.clone(), action_type)) {
            Entry::Occupied(_) => Err(FlowctlError::DuplicateDagAction {
                flow: flow.clone(),
                action_type,
            }),
            Entry::Vacant(slot) => {
                let action = DagAction::new(flow.clone(), action_type);
                slot.insert(action.clone());
                Ok(action)
            }
        }
    }

    fn delete_dag_action(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<bool> {
        let mut actions = self.actions.write().map_err(poison_err)?;
        Ok(actions.remove(&(flow.clone(), action_type)).is_some())
    }

    fn list_dag_actions(&self) -> Result<Vec<DagAction>> {
        let actions = self.actions.read().map_err(poison_err)?;
        let mut result: Vec<DagAction> = actions.values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }
}
