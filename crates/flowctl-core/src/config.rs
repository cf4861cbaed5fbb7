use crate::error::{FlowctlError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Embedded database file. Locked by one process at a time, so other
    /// replicas and `flowctl actions` cannot open it while a server runs.
    Redb,
    /// SQLite database file; several replicas may share it.
    #[default]
    Sqlite,
    /// Non-durable. Development and tests only.
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Overrides the default file under `.flowctl/`. Relative paths resolve
    /// against the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8475
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// LeadershipConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadershipConfig {
    /// Make this replica the active leader instead of a standby. A running
    /// server re-reads it every `poll_interval_ms`.
    #[serde(default)]
    pub force_leader: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

const MIN_POLL_INTERVAL_MS: u64 = 100;

impl Default for LeadershipConfig {
    fn default() -> Self {
        Self {
            force_leader: false,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl LeadershipConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub replica_id: String,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub leadership: LeadershipConfig,
    /// Upper bound on one store call made on behalf of a request.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_version() -> u32 {
    1
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

impl Config {
    pub fn new(replica_id: impl Into<String>) -> Self {
        Self {
            version: 1,
            replica_id: replica_id.into(),
            store: StoreConfig::default(),
            server: ServerConfig::default(),
            leadership: LeadershipConfig::default(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }

    /// `$HOSTNAME` when set, otherwise a random `replica-xxxxxxxx` name.
    pub fn default_replica_id() -> String {
        match std::env::var("HOSTNAME") {
            Ok(host) if !host.trim().is_empty() => host,
            _ => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                format!("replica-{}", &id[..8])
            }
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(FlowctlError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn store_path(&self, root: &Path) -> PathBuf {
        match &self.store.path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => paths::default_store_path(root, self.store.backend),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.replica_id.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "replica_id is empty".to_string(),
            });
        }

        if self.store_timeout_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "store_timeout_ms is 0: every request would time out".to_string(),
            });
        }

        if self.store.backend == StoreBackend::Redb {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "store backend 'redb' is locked by a single process: standby \
                          replicas and 'flowctl actions delete' cannot open it while a \
                          server is running"
                    .to_string(),
            });
        }

        if self.store.backend == StoreBackend::Memory {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "store backend 'memory' is not durable: pending actions are lost \
                          on restart and invisible to other replicas"
                    .to_string(),
            });
            if self.store.path.is_some() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "store.path is ignored by the memory backend".to_string(),
                });
            }
        }

        if self.leadership.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "leadership.poll_interval_ms {} is below {MIN_POLL_INTERVAL_MS}; using {MIN_POLL_INTERVAL_MS}",
                    self.leadership.poll_interval_ms
                ),
            });
        }

        if self.version != 1 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("unknown config version {}", self.version),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("replica-a");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.replica_id, "replica-a");
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.store.backend, StoreBackend::Sqlite);
        assert_eq!(parsed.server.port, 8475);
        assert!(!parsed.leadership.force_leader);
    }

    #[test]
    fn minimal_yaml_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("replica_id: r1\nstore:\n  backend: sqlite\n").unwrap();
        assert_eq!(cfg.store.backend, StoreBackend::Sqlite);
        assert_eq!(cfg.store_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(FlowctlError::NotInitialized)
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("replica-b");
        cfg.leadership.force_leader = true;
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.replica_id, "replica-b");
        assert!(loaded.leadership.force_leader);
    }

    #[test]
    fn store_path_resolution() {
        let root = Path::new("/srv/o");
        let mut cfg = Config::new("r");
        assert_eq!(cfg.store_path(root), root.join(".flowctl/dag_actions.sqlite"));

        cfg.store.path = Some(PathBuf::from("data/actions.db"));
        assert_eq!(cfg.store_path(root), root.join("data/actions.db"));

        cfg.store.path = Some(PathBuf::from("/var/lib/actions.db"));
        assert_eq!(cfg.store_path(root), PathBuf::from("/var/lib/actions.db"));
    }

    #[test]
    fn default_config_has_no_warnings() {
        assert!(Config::new("r").validate().is_empty());
    }

    #[test]
    fn validate_flags_zero_timeout_and_blank_replica() {
        let mut cfg = Config::new(" ");
        cfg.store_timeout_ms = 0;
        let warnings = cfg.validate();
        assert_eq!(
            warnings.iter().filter(|w| w.level == WarnLevel::Error).count(),
            2
        );
    }

    #[test]
    fn validate_warns_on_memory_backend() {
        let mut cfg = Config::new("r");
        cfg.store.backend = StoreBackend::Memory;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.message.contains("not durable")));
    }

    #[test]
    fn validate_warns_on_single_process_redb() {
        let mut cfg = Config::new("r");
        cfg.store.backend = StoreBackend::Redb;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
        assert!(warnings[0].message.contains("single process"));
    }

    #[test]
    fn poll_interval_has_a_floor() {
        let mut cfg = Config::new("r");
        assert_eq!(cfg.leadership.poll_interval(), Duration::from_secs(2));

        cfg.leadership.poll_interval_ms = 0;
        assert_eq!(cfg.leadership.poll_interval(), Duration::from_millis(100));
        assert!(cfg
            .validate()
            .iter()
            .any(|w| w.message.contains("poll_interval_ms")));
    }
}
