//! File system watcher with debouncing for development builds.
//!
//! Watches the project root and filters out dependencies, hidden files and
//! everything the build itself writes.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// What the watcher must not react to.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    /// Directory names (`node_modules`) or extension patterns (`*.tsbuildinfo`)
    pub patterns: Vec<String>,
    /// Absolute paths written by the build (output dir, manifest)
    pub paths: Vec<PathBuf>,
}

impl IgnoreRules {
    pub fn should_ignore(&self, path: &Path, root: &Path) -> bool {
        if !path.starts_with(root) {
            return true;
        }

        if self.paths.iter().any(|ignored| path.starts_with(ignored)) {
            return true;
        }

        let Ok(rel_path) = path.strip_prefix(root) else {
            return true;
        };
        let path_str = rel_path.to_string_lossy();

        for pattern in &self.patterns {
            if let Some(ext) = pattern.strip_prefix('*') {
                if path_str.ends_with(ext) {
                    return true;
                }
            } else if rel_path
                .components()
                .any(|component| component.as_os_str() == pattern.as_str())
            {
                return true;
            }
        }

        rel_path.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
        })
    }
}

/// Recursive watcher sending [`FileChange`]s through a channel.
///
/// Repeated events for the same file inside the debounce window are dropped.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// # Errors
    ///
    /// Fails if `root` does not exist or the platform watcher cannot start.
    pub fn new(
        root: PathBuf,
        ignore: IgnoreRules,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !root.exists() {
            return Err(CliError::FileNotFound(root));
        }

        let (tx, rx) = mpsc::channel(100);

        let debounce = Duration::from_millis(debounce_ms);
        let mut last_event: Option<(PathBuf, Instant)> = None;
        let watch_root = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };
            for path in &event.paths {
                if ignore.should_ignore(path, &watch_root) {
                    continue;
                }

                let now = Instant::now();
                if let Some((last_path, last_time)) = &last_event {
                    if last_path == path && now.duration_since(*last_time) < debounce {
                        continue;
                    }
                }
                last_event = Some((path.clone(), now));

                let change = match event.kind {
                    notify::EventKind::Create(_) => FileChange::Created(path.clone()),
                    notify::EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    notify::EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };

                // Receiver gone means the session is shutting down
                let _ = tx.blocking_send(change);
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
