//! Incremental media library indexer with cached video thumbnails
//!
//! This library scans user-designated directory trees for image and video
//! files, keeps a durable JSON cache of the index, and maintains a
//! content-addressed JPEG preview frame per video via an external
//! frame-extraction tool.

pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod scanner;
pub mod store;
pub mod sync;
pub mod thumbs;

pub use config::{IndexConfig, IndexConfigBuilder};
pub use error::{IndexError, IndexErrorKind};
pub use index::{MediaIndex, SyncCallback};
pub use models::{
    CacheSnapshot, FileInfo, LibrarySync, MediaKind, MediaSet, ScanOutcome, SyncDiff,
};
pub use scanner::{scan_libraries, walk_root};
pub use store::CacheStore;
pub use sync::diff;
pub use thumbs::{ReconcileOutcome, ThumbnailEngine};
