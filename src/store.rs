//! Persistent cache store - one JSON document holding the full index state

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::IndexError;
use crate::models::CacheSnapshot;

/// Durable store for the cache snapshot.
///
/// The snapshot is always read and replaced as a whole document; there is no
/// field-level persistence. Concurrent writers race at the file level and the
/// last completed write wins.
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Create a store backed by the given document path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the document path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted snapshot.
    ///
    /// A missing file, unreadable file, or unparseable document all yield the
    /// empty snapshot; load never fails the caller.
    pub fn load(&self) -> CacheSnapshot {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("cache not readable at {}: {}", self.path.display(), e);
                return CacheSnapshot::empty();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!(
                    "discarding corrupt cache at {}: {}",
                    self.path.display(),
                    e
                );
                CacheSnapshot::empty()
            }
        }
    }

    /// Stamp and persist a snapshot, returning the stamped value.
    ///
    /// The document is replaced wholesale via a temp-file rename. A write
    /// failure is logged and the stamped snapshot is still returned, so a
    /// scan cycle degrades to an unpersisted result instead of failing.
    pub fn save(&self, mut snapshot: CacheSnapshot) -> CacheSnapshot {
        snapshot.updated_at = Utc::now().timestamp_millis();
        if let Err(e) = self.write(&snapshot) {
            log::error!("failed to persist cache to {}: {}", self.path.display(), e);
        }
        snapshot
    }

    fn write(&self, snapshot: &CacheSnapshot) -> Result<(), IndexError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| IndexError::persistence(parent.to_path_buf(), e.to_string()))?;
        }
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| IndexError::persistence(self.path.clone(), e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| IndexError::persistence(tmp.clone(), e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| IndexError::persistence(self.path.clone(), e.to_string()))?;
        Ok(())
    }
}
