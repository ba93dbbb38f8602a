//! Watch mode: filesystem events become save notifications.
//!
//! - Warms the workspace once through the coordinator
//! - Feeds modified and created source files to `notify_saved`
//! - Reports every refreshed bundle through a callback
//! - Ctrl+C tears the coordinator down

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::config::CoordinatorSettings;
use crate::coordinator::{MetricsCoordinator, SaveOutcome};
use crate::fs_utils::has_extension;
use crate::types::MetricsBundle;

/// Paths in `event` that count as a save of a source file in the
/// workspace rooted at `root`.
pub fn saved_paths(event: &Event, root: &Path, settings: &CoordinatorSettings) -> Vec<PathBuf> {
    let relevant = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    };
    if !relevant {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .filter(|path| has_extension(path, &settings.extension))
        .filter(|path| !in_excluded_dir(path, root, &settings.excluded_dirs))
        .cloned()
        .collect()
}

/// Only components below `root` are checked, so a workspace that itself
/// lives under e.g. `build/` still works.
fn in_excluded_dir(path: &Path, root: &Path, excluded_dirs: &[String]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.parent().is_some_and(|dir| {
        dir.components().any(|c| match c {
            Component::Normal(name) => excluded_dirs.iter().any(|ex| name == ex.as_str()),
            _ => false,
        })
    })
}

/// Watch `root` until Ctrl+C, calling `on_update` for each refreshed
/// bundle. Shuts the coordinator down on exit.
pub async fn watch_workspace<F>(
    coordinator: MetricsCoordinator,
    root: &Path,
    mut on_update: F,
) -> anyhow::Result<()>
where
    F: FnMut(&Path, &MetricsBundle),
{
    let (tx, mut events) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Err(e) = tx.send(res) {
            debug!("watch channel closed: {e}");
        }
    })
    .context("failed to create file watcher")?;
    watcher
        .watch(root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", root.display()))?;

    let mut updates = coordinator.subscribe();
    let scheduled = coordinator.warm_up(root);
    info!("watching {} ({} files warming up)", root.display(), scheduled);

    loop {
        tokio::select! {
            Some(res) = events.recv() => match res {
                Ok(event) => {
                    for path in saved_paths(&event, root, coordinator.settings()) {
                        let outcome = coordinator.notify_saved(&path);
                        debug!("save of {}: {:?}", path.display(), outcome);
                        if outcome == SaveOutcome::ShutDown {
                            return Ok(());
                        }
                    }
                }
                Err(e) => warn!("watch error: {e}"),
            },
            update = updates.recv() => match update {
                Ok(path) => {
                    if let Some(bundle) = coordinator.get_metrics(&path) {
                        on_update(&path, &bundle);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("{missed} metric updates dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            else => break,
        }
    }

    coordinator.shutdown();
    drop(watcher);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};

    fn settings() -> CoordinatorSettings {
        CoordinatorSettings::default()
    }

    #[test]
    fn content_changes_are_saves() {
        let event = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/ws/src/A.java"))
            .add_path(PathBuf::from("/ws/src/notes.md"));
        assert_eq!(
            saved_paths(&event, Path::new("/ws"), &settings()),
            vec![PathBuf::from("/ws/src/A.java")]
        );
    }

    #[test]
    fn created_files_are_saves() {
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/ws/src/New.java"));
        assert_eq!(saved_paths(&event, Path::new("/ws"), &settings()).len(), 1);
    }

    #[test]
    fn removals_and_metadata_are_ignored() {
        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/ws/src/A.java"));
        let touched = Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)))
            .add_path(PathBuf::from("/ws/src/A.java"));
        assert!(saved_paths(&removed, Path::new("/ws"), &settings()).is_empty());
        assert!(saved_paths(&touched, Path::new("/ws"), &settings()).is_empty());
    }

    #[test]
    fn root_above_excluded_name_is_fine() {
        let event = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/home/build/ws/src/A.java"));
        let root = Path::new("/home/build/ws");
        assert_eq!(saved_paths(&event, root, &settings()).len(), 1);
    }

    #[test]
    fn excluded_directories_are_ignored() {
        let event = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/ws/target/generated/Gen.java"))
            .add_path(PathBuf::from("/ws/src/main/Keep.java"));
        assert_eq!(
            saved_paths(&event, Path::new("/ws"), &settings()),
            vec![PathBuf::from("/ws/src/main/Keep.java")]
        );
    }
}
