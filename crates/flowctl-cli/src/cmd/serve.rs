use anyhow::Context;
use flowctl_core::config::Config;
use flowctl_server::leadership::follow_config;
use flowctl_server::AppState;
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>, leader: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    for w in config.validate() {
        tracing::warn!(level = ?w.level, "{}", w.message);
    }
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        // The leadership watcher is spawned inside AppState::new, so state
        // must be built on the runtime.
        let (state, leadership) = AppState::from_config(&config, root, leader)
            .context("failed to open dag action store")?;
        let follower = tokio::spawn(follow_config(root.to_path_buf(), leadership, leader));
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;

        let result = tokio::select! {
            res = flowctl_server::serve_on(state, listener) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        };
        follower.abort();
        result
    })
}
