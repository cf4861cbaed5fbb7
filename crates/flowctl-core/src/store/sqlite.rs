//! Relational dag action store backed by SQLite.
//!
//! Several processes may open the same database file; the primary key on
//! `(flow_group, flow_name, flow_execution_id, dag_action)` is what rejects a
//! second pending action for a key, whichever replica issued it.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{FlowctlError, Result};
use crate::types::{ActionType, DagAction, FlowIdentity};

use super::{store_err, DagActionStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS dag_action_store (
    flow_group        TEXT NOT NULL,
    flow_name         TEXT NOT NULL,
    flow_execution_id TEXT NOT NULL,
    dag_action        TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    PRIMARY KEY (flow_group, flow_name, flow_execution_id, dag_action)
);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteDagActionStore {
    conn: Mutex<Connection>,
}

impl SqliteDagActionStore {
    /// Open or create the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(store_err)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(store_err)?;
        // WAL lets readers on other replicas proceed while one writes.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))
            .map_err(store_err)?;
        Self::init(conn)
    }

    /// Private, non-durable database. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(store_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(store_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| FlowctlError::ActionStore("sqlite connection lock poisoned".into()))?;
        f(&conn)
    }
}

/// Only the primary key identifies a duplicate action; NOT NULL or CHECK
/// failures are store errors.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn row_to_action(
    group: String,
    name: String,
    execution_id: String,
    action: String,
    created_at: String,
) -> Result<DagAction> {
    let execution_id: i64 = execution_id
        .parse()
        .map_err(|e| store_err(format!("bad flow_execution_id '{execution_id}': {e}")))?;
    let flow = FlowIdentity::new(group, name, execution_id).map_err(store_err)?;
    let action_type: ActionType = action.parse().map_err(store_err)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| store_err(format!("bad created_at '{created_at}': {e}")))?
        .with_timezone(&Utc);
    Ok(DagAction {
        flow,
        action_type,
        created_at,
    })
}

impl DagActionStore for SqliteDagActionStore {
    fn exists(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM dag_action_store \
                     WHERE flow_group = ?1 AND flow_name = ?2 \
                     AND flow_execution_id = ?3 AND dag_action = ?4",
                    params![
                        flow.flow_group(),
                        flow.flow_name(),
                        flow.execution_id_str(),
                        action_type.as_str()
                    ],
                    |row| row.get(0),
                )
                .optional()
                .map_err(store_err)?;
            Ok(found.is_some())
        })
    }

    fn add_dag_action(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<DagAction> {
        let action = DagAction::new(flow.clone(), action_type);
        let created_at = action
            .created_at
            .to_rfc3339_opts(SecondsFormat::Micros, true);
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO dag_action_store \
                 (flow_group, flow_name, flow_execution_id, dag_action, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    flow.flow_group(),
                    flow.flow_name(),
                    flow.execution_id_str(),
                    action_type.as_str(),
                    created_at
                ],
            );
            match inserted {
                Ok(_) => Ok(()),
                Err(e) if is_unique_violation(&e) => Err(FlowctlError::DuplicateDagAction {
                    flow: flow.clone(),
                    action_type,
                }),
                Err(e) => Err(store_err(e)),
            }
        })?;
        Ok(action)
    }

    fn delete_dag_action(&self, flow: &FlowIdentity, action_type: ActionType) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn
                .execute(
                    "DELETE FROM dag_action_store \
                     WHERE flow_group = ?1 AND flow_name = ?2 \
                     AND flow_execution_id = ?3 AND dag_action = ?4",
                    params![
                        flow.flow_group(),
                        flow.flow_name(),
                        flow.execution_id_str(),
                        action_type.as_str()
                    ],
                )
                .map_err(store_err)?;
            Ok(removed > 0)
        })
    }

    fn list_dag_actions(&self) -> Result<Vec<DagAction>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT flow_group, flow_name, flow_execution_id, dag_action, created_at \
                     FROM dag_action_store ORDER BY created_at, rowid",
                )
                .map_err(store_err)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                })
                .map_err(store_err)?;

            let mut result = Vec::new();
            for row in rows {
                let (group, name, execution_id, action, created_at) = row.map_err(store_err)?;
                result.push(row_to_action(group, name, execution_id, action, created_at)?);
            }
            Ok(result)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
