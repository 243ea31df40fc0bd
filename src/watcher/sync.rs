//! Watch and deploy-on-save loop

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

use crate::application::Session;
use crate::error::{SyncError, SyncResult};

use super::event::{WatchEvent, WatchOptions, WatcherState, IGNORED_DIRS};

/// Watch the workspace roots and deploy saved files until `running` clears.
pub fn watch(
    session: &Session,
    options: WatchOptions,
    running: Arc<AtomicBool>,
    event_callback: impl Fn(WatchEvent),
) -> SyncResult<()> {
    event_callback(WatchEvent::WatchStarted {
        roots: options
            .roots
            .iter()
            .map(|root| root.display().to_string())
            .collect(),
    });

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
            }
        },
        Config::default(),
    )
    .map_err(|e| SyncError::Io(std::io::Error::other(e.to_string())))?;

    for root in &options.roots {
        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| SyncError::Io(std::io::Error::other(e.to_string())))?;
    }

    let mut state = WatcherState::new();
    let mut content_hashes: HashMap<PathBuf, u64> = HashMap::new();

    // Startup cooldown: notify may report existing files when a watch is registered
    let cooldown_end = Instant::now() + Duration::from_millis(500);
    while Instant::now() < cooldown_end {
        let _ = rx.recv_timeout(Duration::from_millis(50));
    }

    while running.load(Ordering::SeqCst) {
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(50)) {
            if is_watched_path(&path) {
                if let Ok(content) = std::fs::read(&path) {
                    let hash = content_hash(&content);
                    if content_hashes.get(&path) != Some(&hash) {
                        content_hashes.insert(path.clone(), hash);
                        state.add_change(path);
                    }
                }
            }
        }

        if state.should_sync() {
            let changes = state.take_changes();
            deploy_changes(session, &changes, &event_callback);
        }
    }

    event_callback(WatchEvent::Shutdown);
    Ok(())
}

/// Deploy each changed file to its deploy-on-save targets.
pub fn deploy_changes(session: &Session, changes: &[PathBuf], callback: &impl Fn(WatchEvent)) {
    for path in changes {
        let shown = path.display().to_string();
        callback(WatchEvent::FileChanged {
            path: shown.clone(),
        });

        let outcomes = session.deploy_on_save(path);
        if outcomes.is_empty() {
            debug!(file = %shown, "no deploy-on-save target");
        }
        for outcome in outcomes {
            let event = match outcome.result {
                Ok(summary) => WatchEvent::Deployed {
                    path: shown.clone(),
                    target: outcome.target,
                    succeeded: summary.succeeded,
                    failed: summary.failed,
                },
                Err(e) => WatchEvent::DeployFailed {
                    path: shown.clone(),
                    target: outcome.target,
                    message: e.to_string(),
                },
            };
            callback(event);
        }
    }
}

/// Regular files outside VCS and tool directories
pub fn is_watched_path(path: &Path) -> bool {
    let ignored = path.components().any(|component| match component {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name)),
        _ => false,
    });
    !ignored && path.is_file()
}

fn content_hash(content: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}
