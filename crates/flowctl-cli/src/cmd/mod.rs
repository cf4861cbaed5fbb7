pub mod actions;
pub mod config;
pub mod init;
pub mod serve;
pub mod submit;

use anyhow::Context;
use flowctl_core::config::Config;
use flowctl_core::store::DagActionStore;
use std::path::Path;
use std::sync::Arc;

/// Load the config and open the store it names.
pub(crate) fn open_store(root: &Path) -> anyhow::Result<(Config, Arc<dyn DagActionStore>)> {
    let config = Config::load(root).context("failed to load config")?;
    let store = flowctl_core::store::open(&config, root).with_context(|| {
        format!(
            "failed to open {:?} store at {}",
            config.store.backend,
            config.store_path(root).display()
        )
    })?;
    Ok((config, store))
}
