use std::path::{Path, PathBuf};

use crate::config::StoreBackend;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const FLOWCTL_DIR: &str = ".flowctl";
pub const CONFIG_FILE: &str = ".flowctl/config.yaml";
pub const REDB_FILE: &str = ".flowctl/dag_actions.redb";
pub const SQLITE_FILE: &str = ".flowctl/dag_actions.sqlite";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn flowctl_dir(root: &Path) -> PathBuf {
    root.join(FLOWCTL_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Default location of the store file for `backend`.
pub fn default_store_path(root: &Path, backend: StoreBackend) -> PathBuf {
    match backend {
        StoreBackend::Redb | StoreBackend::Memory => root.join(REDB_FILE),
        StoreBackend::Sqlite => root.join(SQLITE_FILE),
    }
}
