//! Media index - scan-cycle orchestration over the store and thumbnail engine
//!
//! A scan cycle is: aggregate the library roots, reconcile video thumbnails,
//! persist the whole snapshot, then tell observers what changed. Cycle entry
//! points serialize on one in-process lock, so at most one cycle is in flight
//! and every cache write reflects a complete cycle.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::IndexConfig;
use crate::models::{CacheSnapshot, FileInfo, LibrarySync, MediaSet};
use crate::scanner;
use crate::store::CacheStore;
use crate::sync;
use crate::thumbs::ThumbnailEngine;

/// Observer callback invoked after a completed scan cycle
pub type SyncCallback = Box<dyn Fn(&LibrarySync) + Send + Sync>;

/// What a finished cycle reports to observers
enum Notify {
    /// Nothing; the caller only wants the returned snapshot
    Never,
    /// The diff against the prior cache
    WithDiff,
    /// An empty diff (startup sync announces state without claiming changes)
    EmptyDiff,
}

/// The indexing-and-caching engine
pub struct MediaIndex {
    store: CacheStore,
    engine: ThumbnailEngine,
    cycle_lock: Mutex<()>,
    observers: Mutex<Vec<SyncCallback>>,
}

impl MediaIndex {
    /// Create an index from the given configuration
    pub fn new(config: IndexConfig) -> Self {
        Self {
            store: CacheStore::new(config.cache_file.clone()),
            engine: ThumbnailEngine::new(&config),
            cycle_lock: Mutex::new(()),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Create an index with the default per-user configuration
    pub fn with_defaults() -> Self {
        Self::new(IndexConfig::default())
    }

    /// Return the current cache without scanning
    pub fn cache(&self) -> CacheSnapshot {
        self.store.load()
    }

    /// Register an observer for completed scan cycles
    pub fn on_sync(&self, callback: SyncCallback) {
        self.observers.lock().unwrap().push(callback);
    }

    /// Union new library roots into the cached set and run a scan cycle.
    ///
    /// Roots are only ever added here; removal is an explicit caller decision
    /// expressed by rescanning a reduced set through a fresh cache.
    pub fn add_libraries(&self, dirs: impl IntoIterator<Item = PathBuf>) -> CacheSnapshot {
        let _cycle = self.cycle_lock.lock().unwrap();
        let prior = self.store.load();
        let mut libraries = prior.libraries.clone();
        libraries.extend(dirs);
        self.run_cycle(libraries, prior, Notify::Never)
    }

    /// Rescan the cached library roots and notify observers of the diff
    pub fn rescan(&self) -> CacheSnapshot {
        let _cycle = self.cycle_lock.lock().unwrap();
        let prior = self.store.load();
        let libraries = prior.libraries.clone();
        self.run_cycle(libraries, prior, Notify::WithDiff)
    }

    /// Run the startup scan cycle; observers see the state with an empty diff
    pub fn sync_on_startup(&self) -> CacheSnapshot {
        let _cycle = self.cycle_lock.lock().unwrap();
        let prior = self.store.load();
        let libraries = prior.libraries.clone();
        self.run_cycle(libraries, prior, Notify::EmptyDiff)
    }

    /// Query display metadata for a single file
    pub fn file_info(&self, path: &Path) -> FileInfo {
        FileInfo::for_path(path)
    }

    /// One complete scan cycle. Never fails; per-item faults degrade the
    /// result and are logged by the stages that recover them.
    fn run_cycle(
        &self,
        libraries: BTreeSet<PathBuf>,
        prior: CacheSnapshot,
        notify: Notify,
    ) -> CacheSnapshot {
        let outcome = scanner::scan_libraries(&libraries);
        log::info!(
            "scanned {} roots in {}ms: {} images, {} videos",
            libraries.len(),
            outcome.duration_ms,
            outcome.media.images.len(),
            outcome.media.videos.len()
        );

        let reconciled = self.engine.reconcile(&outcome.media.videos, &prior.thumbnails);

        let saved = self.store.save(CacheSnapshot {
            libraries,
            images: outcome.media.images,
            videos: outcome.media.videos,
            thumbnails: reconciled.thumbnails,
            updated_at: 0,
        });

        match notify {
            Notify::Never => {}
            Notify::WithDiff => {
                let diff = sync::diff(&prior.media(), &saved.media());
                self.notify(&LibrarySync {
                    added: diff.added,
                    removed: diff.removed,
                    current: saved.clone(),
                });
            }
            Notify::EmptyDiff => {
                self.notify(&LibrarySync {
                    added: MediaSet::new(),
                    removed: MediaSet::new(),
                    current: saved.clone(),
                });
            }
        }

        saved
    }

    fn notify(&self, event: &LibrarySync) {
        for observer in self.observers.lock().unwrap().iter() {
            observer(event);
        }
    }
}
