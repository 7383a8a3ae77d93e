//! Core data models for the media index

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::IndexError;

/// Media kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Image files (jpg, png, webp, etc.)
    Image,
    /// Video files (mp4, mkv, mov, etc.)
    Video,
    /// Anything else
    Unclassified,
}

impl MediaKind {
    /// Infer media kind from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Self {
        let ext_lower = ext.to_lowercase();
        match ext_lower.as_str() {
            // Image extensions
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "tiff" => MediaKind::Image,
            // Video extensions
            "mp4" | "mov" | "mkv" | "webm" | "avi" | "wmv" | "m4v" => MediaKind::Video,
            _ => MediaKind::Unclassified,
        }
    }

    /// Classify a path by its extension
    pub fn of(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(MediaKind::Unclassified)
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A deduplicated set of classified media paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSet {
    /// Image file paths
    #[serde(default)]
    pub images: BTreeSet<PathBuf>,
    /// Video file paths
    #[serde(default)]
    pub videos: BTreeSet<PathBuf>,
}

impl MediaSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path into the matching partition; unclassified paths are dropped
    pub fn insert(&mut self, path: PathBuf) {
        match MediaKind::of(&path) {
            MediaKind::Image => {
                self.images.insert(path);
            }
            MediaKind::Video => {
                self.videos.insert(path);
            }
            MediaKind::Unclassified => {}
        }
    }

    /// Merge another set into this one, deduplicating by path
    pub fn merge(&mut self, other: MediaSet) {
        self.images.extend(other.images);
        self.videos.extend(other.videos);
    }

    /// Total number of paths across both partitions
    pub fn len(&self) -> usize {
        self.images.len() + self.videos.len()
    }

    /// Check whether both partitions are empty
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty()
    }
}

/// The persisted aggregate state of the index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    /// Library roots designated for scanning
    #[serde(default)]
    pub libraries: BTreeSet<PathBuf>,
    /// Known image paths
    #[serde(default)]
    pub images: BTreeSet<PathBuf>,
    /// Known video paths
    #[serde(default)]
    pub videos: BTreeSet<PathBuf>,
    /// Video path -> generated preview frame path
    #[serde(default)]
    pub thumbnails: BTreeMap<PathBuf, PathBuf>,
    /// Last write time as epoch milliseconds (0 = never written)
    #[serde(default)]
    pub updated_at: i64,
}

impl CacheSnapshot {
    /// Create the well-defined empty snapshot
    pub fn empty() -> Self {
        Self::default()
    }

    /// View the snapshot's image/video partitions as a MediaSet
    pub fn media(&self) -> MediaSet {
        MediaSet {
            images: self.images.clone(),
            videos: self.videos.clone(),
        }
    }
}

/// Added/removed partitions between two scans
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDiff {
    /// Paths present now but not before
    pub added: MediaSet,
    /// Paths present before but gone now
    pub removed: MediaSet,
}

impl SyncDiff {
    /// Check whether nothing changed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Payload delivered to sync observers after a completed scan cycle
#[derive(Debug, Clone, Serialize)]
pub struct LibrarySync {
    /// Paths that appeared since the previous cycle
    pub added: MediaSet,
    /// Paths that disappeared since the previous cycle
    pub removed: MediaSet,
    /// The full snapshot the cycle produced
    pub current: CacheSnapshot,
}

/// Result of walking and aggregating the configured library roots
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Deduplicated media paths across all roots
    pub media: MediaSet,
    /// Per-root faults recovered during the walk
    pub errors: Vec<IndexError>,
    /// Total walk duration in milliseconds
    pub duration_ms: u64,
}

impl ScanOutcome {
    /// Get the number of recovered faults
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Basic file metadata for display purposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileInfo {
    /// Metadata could be read
    Available {
        /// Display name (final path component)
        name: String,
        /// Size in bytes
        size: u64,
    },
    /// The file could not be stat'ed
    Unavailable,
}

impl FileInfo {
    /// Query size and display name for a path; any failure yields `Unavailable`
    pub fn for_path(path: &Path) -> Self {
        let Ok(metadata) = std::fs::metadata(path) else {
            return FileInfo::Unavailable;
        };
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        FileInfo::Available {
            name,
            size: metadata.len(),
        }
    }
}
