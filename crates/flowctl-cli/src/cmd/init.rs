use anyhow::Context;
use flowctl_core::{
    config::{Config, StoreBackend},
    io, paths,
};
use std::path::Path;

use crate::output::print_json;

pub fn run(
    root: &Path,
    backend: StoreBackend,
    replica_id: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let dir = paths::flowctl_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let created = !config_path.exists();
    let config = if created {
        let mut cfg = Config::new(replica_id.unwrap_or_else(Config::default_replica_id));
        cfg.store.backend = backend;
        cfg.save(root).context("failed to write config.yaml")?;
        cfg
    } else {
        Config::load(root).context("failed to load existing config")?
    };

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "config": paths::CONFIG_FILE,
            "created": created,
            "replica_id": config.replica_id,
            "backend": config.store.backend,
        }))?;
        return Ok(());
    }

    println!("Initializing flowctl in: {}", root.display());
    if created {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }
    println!("  replica: {}", config.replica_id);
    println!(
        "  store:   {:?} ({})",
        config.store.backend,
        config.store_path(root).display()
    );
    Ok(())
}
