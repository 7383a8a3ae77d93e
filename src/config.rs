//! Configuration for the media index

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default width cap for generated thumbnails (pixels)
pub const DEFAULT_THUMB_WIDTH: u32 = 512;

/// Default seek offset into the video for the preview frame (seconds)
pub const DEFAULT_THUMB_SEEK_SECS: u32 = 1;

/// Default time budget for one frame-extraction invocation (seconds)
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 30;

/// Default frame-extraction program
pub const DEFAULT_EXTRACTOR: &str = "ffmpeg";

/// Name of the persisted cache document
pub const CACHE_FILE_NAME: &str = "media-cache.json";

/// Name of the thumbnail cache subdirectory
pub const THUMB_DIR_NAME: &str = "video-thumbs";

/// Configuration for the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Path of the persisted cache document
    pub cache_file: PathBuf,

    /// Directory holding generated video thumbnails
    pub thumb_dir: PathBuf,

    /// Frame-extraction program (name resolved via PATH, or an absolute path)
    pub extractor: PathBuf,

    /// Width cap for generated thumbnails; aspect ratio is preserved
    pub thumb_width: u32,

    /// Seek offset into the video for the preview frame (seconds)
    pub thumb_seek_secs: u32,

    /// Time budget for one frame-extraction invocation (seconds)
    pub extraction_timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let data_dir = Self::default_data_dir();
        Self {
            cache_file: data_dir.join(CACHE_FILE_NAME),
            thumb_dir: data_dir.join(THUMB_DIR_NAME),
            extractor: PathBuf::from(DEFAULT_EXTRACTOR),
            thumb_width: DEFAULT_THUMB_WIDTH,
            thumb_seek_secs: DEFAULT_THUMB_SEEK_SECS,
            extraction_timeout_secs: DEFAULT_EXTRACTION_TIMEOUT_SECS,
        }
    }
}

impl IndexConfig {
    /// Create a config rooted at the given data directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            cache_file: dir.join(CACHE_FILE_NAME),
            thumb_dir: dir.join(THUMB_DIR_NAME),
            ..Default::default()
        }
    }

    /// Create a config builder
    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder::new()
    }

    /// Get the default per-user data directory for the index
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("media-index")
    }

    /// Get the extraction time budget as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }
}

/// Builder for IndexConfig
#[derive(Debug, Default)]
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl IndexConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: IndexConfig::default(),
        }
    }

    /// Set the cache document path
    pub fn cache_file(mut self, path: PathBuf) -> Self {
        self.config.cache_file = path;
        self
    }

    /// Set the thumbnail directory
    pub fn thumb_dir(mut self, dir: PathBuf) -> Self {
        self.config.thumb_dir = dir;
        self
    }

    /// Set the frame-extraction program
    pub fn extractor(mut self, program: PathBuf) -> Self {
        self.config.extractor = program;
        self
    }

    /// Set the thumbnail width cap
    pub fn thumb_width(mut self, width: u32) -> Self {
        self.config.thumb_width = width;
        self
    }

    /// Set the preview frame seek offset in seconds
    pub fn thumb_seek_secs(mut self, secs: u32) -> Self {
        self.config.thumb_seek_secs = secs;
        self
    }

    /// Set the per-invocation extraction timeout in seconds
    pub fn extraction_timeout_secs(mut self, secs: u64) -> Self {
        self.config.extraction_timeout_secs = secs;
        self
    }

    /// Build the config
    pub fn build(self) -> IndexConfig {
        self.config
    }
}
