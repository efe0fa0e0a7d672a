//! File watching for follow mode
//!
//! Uses `notify` with debouncing to notice when opened log files or the
//! configuration file change on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind, Debouncer};

use crate::error::Result;

type DebounceResult = std::result::Result<Vec<DebouncedEvent>, notify::Error>;

/// Debounced watcher over a set of files
pub struct FileWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    rx: Receiver<DebounceResult>,
    /// Canonical paths of the watched files
    files: BTreeSet<PathBuf>,
}

impl FileWatcher {
    /// Watch the given files
    ///
    /// Parent directories are watched so files replaced by rename (log
    /// rotation, editors saving atomically) are still seen.
    pub fn new(files: &[PathBuf], debounce: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(debounce, tx)?;

        let files: BTreeSet<PathBuf> = files.iter().map(|f| canonical(f)).collect();
        let dirs: BTreeSet<&Path> = files.iter().filter_map(|f| f.parent()).collect();
        for dir in dirs {
            debouncer.watcher().watch(dir, RecursiveMode::NonRecursive)?;
            tracing::info!("Watching {}", dir.display());
        }

        Ok(Self {
            _debouncer: debouncer,
            rx,
            files,
        })
    }

    /// Wait up to `timeout` for changes to the watched files
    ///
    /// Returns the changed paths, deduplicated. An empty list means the
    /// timeout elapsed.
    pub fn wait(&self, timeout: Duration) -> Vec<PathBuf> {
        let mut changed = BTreeSet::new();
        match self.rx.recv_timeout(timeout) {
            Ok(result) => self.collect(result, &mut changed),
            Err(RecvTimeoutError::Timeout) => return Vec::new(),
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("File watcher stopped");
                return Vec::new();
            }
        }

        // Drain whatever else is pending
        while let Ok(result) = self.rx.try_recv() {
            self.collect(result, &mut changed);
        }

        if !changed.is_empty() {
            tracing::debug!("File watcher detected {} change(s)", changed.len());
        }
        changed.into_iter().collect()
    }

    fn collect(&self, result: DebounceResult, changed: &mut BTreeSet<PathBuf>) {
        match result {
            Ok(events) => {
                for event in events {
                    if matches!(event.kind, DebouncedEventKind::AnyContinuous) {
                        continue;
                    }
                    let path = canonical(&event.path);
                    if self.files.contains(&path) {
                        changed.insert(path);
                    }
                }
            }
            Err(e) => tracing::warn!("File watcher error: {:?}", e),
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
