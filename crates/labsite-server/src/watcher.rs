//! File watching for rebuilds.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Quiet period that ends a burst of raw notifications.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Longest a burst is held back while notifications keep arriving.
const MAX_BURST: Duration = Duration::from_secs(1);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),

    /// File was modified
    Modified(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(p) | Self::Deleted(p) | Self::Modified(p) => p,
        }
    }
}

/// A path to watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub path: PathBuf,
    pub recursive: bool,
}

impl WatchTarget {
    /// Watch a single directory level, for input files living in it.
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: false,
        }
    }

    /// Watch a whole tree.
    pub fn tree(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
        }
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given targets. Targets that do not
    /// exist are skipped.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(
        targets: &[WatchTarget],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for target in targets {
            if !target.path.exists() {
                tracing::debug!("Not watching missing path {}", target.path.display());
                continue;
            }
            let mode = if target.recursive {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            watcher
                .watch(&target.path, mode)
                .map_err(std::io::Error::other)?;
            tracing::debug!("Watching {}", target.path.display());
        }

        std::thread::spawn(move || {
            while let Ok(first) = sync_rx.recv() {
                for event in collect_burst(&sync_rx, first, DEBOUNCE, MAX_BURST) {
                    for path in &event.paths {
                        if let Some(e) = classify_event(path, &event.kind) {
                            if async_tx.blocking_send(e).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Gather events until `quiet` passes without one, or `max_wait` has
/// elapsed since `first`.
fn collect_burst<T>(
    rx: &mpsc::Receiver<T>,
    first: T,
    quiet: Duration,
    max_wait: Duration,
) -> Vec<T> {
    let deadline = Instant::now() + max_wait;
    let mut burst = vec![first];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match rx.recv_timeout(quiet.min(remaining)) {
            Ok(event) => burst.push(event),
            Err(_) => break,
        }
    }

    burst
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => Some(WatchEvent::Modified(path.to_path_buf())),
        _ => None,
    }
}
