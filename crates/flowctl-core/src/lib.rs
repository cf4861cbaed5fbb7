//! Action coordination for flow executions: a durable, deduplicating store of
//! pending DAG actions and the admission protocol in front of it.

pub mod admission;
pub mod config;
pub mod error;
pub mod handler;
pub mod io;
pub mod paths;
pub mod store;
pub mod types;

pub use admission::{AdmissionController, AdmissionOutcome};
pub use error::{FlowctlError, Result};
pub use handler::{ActionError, ActionRequestHandler, FlowStatusId, KillStatus};
pub use store::DagActionStore;
pub use types::{ActionType, DagAction, FlowIdentity};
