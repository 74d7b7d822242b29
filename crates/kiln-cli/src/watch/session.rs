//! Rebuild loop for development builds.
//!
//! The session owns the build lifecycle after the initial build: it waits for
//! a change, lets the burst settle, drains whatever else is queued, runs
//! exactly one build and only then waits again. Builds never overlap.
//! Ctrl+C ends the loop.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use kiln_bundler::{BundleInvoker, PluginSet};
use kiln_config::BuildConfig;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::watcher::{FileChange, FileWatcher, IgnoreRules};
use crate::commands::build_once;
use crate::error::Result;
use crate::ui;

pub struct WatchSession<'a> {
    config: &'a BuildConfig,
    plugins: &'a PluginSet,
    invoker: &'a BundleInvoker,
    quiet: bool,
}

impl<'a> WatchSession<'a> {
    pub fn new(
        config: &'a BuildConfig,
        plugins: &'a PluginSet,
        invoker: &'a BundleInvoker,
        quiet: bool,
    ) -> Self {
        Self {
            config,
            plugins,
            invoker,
            quiet,
        }
    }

    /// Paths and patterns the watcher skips: configured ignores plus
    /// everything the build writes.
    pub fn ignore_rules(&self) -> IgnoreRules {
        let mut paths = vec![self.config.output_dir().to_path_buf()];
        paths.extend(self.plugins.watch_ignores(self.config));
        IgnoreRules {
            patterns: self.config.watch_options().ignore.clone(),
            paths,
        }
    }

    /// Build once, then rebuild on every batch of changes until Ctrl+C.
    ///
    /// Build failures are reported and the session keeps watching.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = signal::ctrl_c().await {
                warn!(error = %e, "could not listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Like [`run`](Self::run), but stops when `shutdown` completes.
    ///
    /// After the first change of a batch the session waits one debounce
    /// window, then drains everything queued and builds once.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let options = self.config.watch_options();
        let settle = Duration::from_millis(options.debounce_ms);
        let (watcher, mut change_rx) = FileWatcher::new(
            self.config.root().to_path_buf(),
            self.ignore_rules(),
            options.debounce_ms,
        )?;

        self.build().await;

        ui::info(&format!("Watching for changes in {}", watcher.root().display()));
        ui::info("Press Ctrl+C to stop");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                Some(first) = change_rx.recv() => {
                    tokio::time::sleep(settle).await;
                    let changed = drain_pending(first, &mut change_rx);
                    report_changes(&changed);
                    self.build().await;
                }
                _ = &mut shutdown => {
                    ui::info("Stopping watch mode...");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn build(&self) {
        if let Err(err) = build_once(self.config, self.plugins, self.invoker, self.quiet).await {
            ui::error(&err.to_string());
        }
    }
}

/// Collect `first` plus every change already waiting in the channel,
/// deduplicated by path.
pub(crate) fn drain_pending(
    first: FileChange,
    rx: &mut mpsc::Receiver<FileChange>,
) -> BTreeSet<PathBuf> {
    let mut changed = BTreeSet::new();
    changed.insert(first.path().to_path_buf());
    while let Ok(change) = rx.try_recv() {
        changed.insert(change.path().to_path_buf());
    }
    debug!(files = changed.len(), "collected queued changes");
    changed
}

fn report_changes(changed: &BTreeSet<PathBuf>) {
    let mut iter = changed.iter();
    match (iter.next(), changed.len()) {
        (Some(path), 1) => ui::info(&format!("File changed: {}", path.display())),
        (Some(path), n) => ui::info(&format!(
            "{} files changed ({} and {} more)",
            n,
            path.display(),
            n - 1
        )),
        (None, _) => {}
    }
}
