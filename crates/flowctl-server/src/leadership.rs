//! Leadership signal consumed by this replica.
//!
//! The election mechanism lives elsewhere; it reports the outcome through
//! [`LeadershipHandle::set_leader`]. Without one, [`follow_config`] lets an
//! operator move leadership by editing `leadership.force_leader`. Admission never consults this signal:
//! standbys accept and record actions exactly like the leader. It exists for
//! leader-only duties such as draining pending actions, and for observability.

use std::path::PathBuf;
use std::sync::Arc;

use flowctl_core::config::Config;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;

pub trait LeadershipSignal: Send + Sync {
    /// Whether this replica is currently the active leader.
    fn is_leader(&self) -> bool;

    /// Receiver that is notified on every leadership transition.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// `watch`-backed leadership flag. Clones share the same flag.
#[derive(Clone)]
pub struct LeadershipHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl LeadershipHandle {
    pub fn new(is_leader: bool) -> Self {
        let (tx, _) = watch::channel(is_leader);
        Self { tx: Arc::new(tx) }
    }

    /// Record the election outcome. Returns `true` if leadership changed.
    pub fn set_leader(&self, is_leader: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == is_leader {
                false
            } else {
                *current = is_leader;
                true
            }
        })
    }
}

impl LeadershipSignal for LeadershipHandle {
    fn is_leader(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Stream yielding the current leadership state, then every change.
pub fn leadership_stream(signal: &dyn LeadershipSignal) -> WatchStream<bool> {
    WatchStream::new(signal.subscribe())
}

/// Apply `leadership.force_leader` from the config under `root` to `handle`,
/// re-reading it every `leadership.poll_interval_ms`. A `pinned` replica stays
/// leader whatever the file says. Runs until the task is dropped.
pub async fn follow_config(root: PathBuf, handle: LeadershipHandle, pinned: bool) {
    let mut interval = match Config::load(&root) {
        Ok(config) => config.leadership.poll_interval(),
        Err(_) => flowctl_core::config::LeadershipConfig::default().poll_interval(),
    };
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let path = root.clone();
        match tokio::task::spawn_blocking(move || Config::load(&path)).await {
            Ok(Ok(config)) => {
                handle.set_leader(pinned || config.leadership.force_leader);
                let next = config.leadership.poll_interval();
                if next != interval {
                    interval = next;
                    ticker = tokio::time::interval_at(tokio::time::Instant::now() + next, next);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                }
            }
            Ok(Err(e)) => tracing::warn!(error = %e, "failed to re-read leadership config"),
            Err(e) => tracing::warn!(error = %e, "leadership config reader panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt as _;

    #[test]
    fn set_leader_reports_changes_only() {
        let handle = LeadershipHandle::new(false);
        assert!(!handle.is_leader());
        assert!(handle.set_leader(true));
        assert!(handle.is_leader());
        assert!(!handle.set_leader(true));
    }

    #[test]
    fn clones_share_state() {
        let handle = LeadershipHandle::new(false);
        let other = handle.clone();
        other.set_leader(true);
        assert!(handle.is_leader());
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let handle = LeadershipHandle::new(false);
        let mut rx = handle.subscribe();

        handle.set_leader(true);
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());

        handle.set_leader(false);
        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn stream_starts_with_current_state() {
        let handle = LeadershipHandle::new(true);
        let mut stream = leadership_stream(&handle);
        assert_eq!(stream.next().await, Some(true));

        handle.set_leader(false);
        assert_eq!(stream.next().await, Some(false));
    }

    fn write_config(root: &std::path::Path, force_leader: bool) {
        let mut config = Config::new("replica-test");
        config.leadership.force_leader = force_leader;
        config.leadership.poll_interval_ms = 100;
        config.save(root).unwrap();
    }

    async fn wait_for(handle: &LeadershipHandle, want: bool) -> bool {
        let mut rx = handle.subscribe();
        let ok = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            rx.wait_for(|is_leader| *is_leader == want),
        )
        .await
        .is_ok();
        ok
    }

    #[tokio::test]
    async fn config_edits_move_leadership() {
        let dir = tempfile::TempDir::new().unwrap();
        write_config(dir.path(), false);
        let handle = LeadershipHandle::new(false);
        let task = tokio::spawn(follow_config(
            dir.path().to_path_buf(),
            handle.clone(),
            false,
        ));

        write_config(dir.path(), true);
        assert!(wait_for(&handle, true).await, "never became leader");

        write_config(dir.path(), false);
        assert!(wait_for(&handle, false).await, "never stepped down");
        task.abort();
    }

    #[tokio::test]
    async fn pinned_replica_ignores_config() {
        let dir = tempfile::TempDir::new().unwrap();
        write_config(dir.path(), false);
        let handle = LeadershipHandle::new(true);
        let task = tokio::spawn(follow_config(
            dir.path().to_path_buf(),
            handle.clone(),
            true,
        ));

        tokio::time::sleep(std::time::Duration::from_millis(350)).await;
        assert!(handle.is_leader());
        task.abort();
    }
}
