//! Coalescing rebuild loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use labsite_static::SiteBuilder;

use crate::watcher::WatchEvent;
use crate::websocket::{ReloadHub, ReloadMessage};

/// Rebuild the site on every burst of file events until the channel closes.
///
/// This is the only task that runs builds. After an event arrives, every
/// event already queued is drained into the same rebuild, and the build is
/// awaited before the channel is read again, so builds never overlap.
/// Events under `ignore` (the output directory) are dropped.
pub async fn rebuild_loop(
    builder: Arc<SiteBuilder>,
    mut events: mpsc::Receiver<WatchEvent>,
    hub: ReloadHub,
    ignore: PathBuf,
) {
    while let Some(event) = events.recv().await {
        let mut changed: Vec<PathBuf> = Vec::new();
        collect(&mut changed, event, &ignore);
        while let Ok(event) = events.try_recv() {
            collect(&mut changed, event, &ignore);
        }

        if changed.is_empty() {
            continue;
        }

        for path in &changed {
            tracing::debug!("Changed: {}", path.display());
        }
        tracing::info!("Rebuilding after {} change(s)", changed.len());

        let task_builder = Arc::clone(&builder);
        match tokio::task::spawn_blocking(move || task_builder.build()).await {
            Ok(Ok(result)) => {
                tracing::info!(
                    "Rebuilt in {}ms ({} publications)",
                    result.duration_ms,
                    result.publications
                );
                hub.send(ReloadMessage::Reload);
            }
            Ok(Err(e)) => {
                tracing::error!("Rebuild failed: {}", e);
                hub.send(ReloadMessage::BuildFailed {
                    message: e.to_string(),
                });
            }
            Err(e) => {
                tracing::error!("Rebuild task failed: {}", e);
            }
        }
    }

    tracing::debug!("Watch channel closed, stopping rebuilds");
}

fn collect(changed: &mut Vec<PathBuf>, event: WatchEvent, ignore: &Path) {
    let path = event.path();
    if is_ignored(path, ignore) || changed.iter().any(|p| p == path) {
        return;
    }
    changed.push(path.to_path_buf());
}

fn is_ignored(path: &Path, ignore: &Path) -> bool {
    path.starts_with(ignore)
}
