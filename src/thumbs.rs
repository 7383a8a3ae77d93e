//! Thumbnail engine - content-addressed video preview frames
//!
//! Thumbnail identity is a pure function of the source path (a digest of the
//! path string), so a renamed or moved video gets a new key and its old
//! thumbnail becomes an orphan removed on the next reconcile. Freshness is
//! tracked out-of-band through file modification times.

use md5::{Digest, Md5};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant, SystemTime};

use crate::config::IndexConfig;
use crate::error::IndexError;

/// How often a running extraction is polled for completion
const EXTRACTION_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of one reconciliation pass over the current video set
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Video path -> thumbnail path for every video with a usable thumbnail
    pub thumbnails: BTreeMap<PathBuf, PathBuf>,
    /// Thumbnails regenerated this pass
    pub generated: u64,
    /// Thumbnails found fresh and reused without extraction
    pub reused: u64,
    /// Per-video generation failures recovered this pass
    pub failures: Vec<IndexError>,
    /// Orphaned thumbnail entries dropped this pass
    pub orphans_removed: u64,
    /// Orphaned thumbnail files that could not be deleted
    pub orphan_delete_failures: u64,
}

/// Generates and reconciles video preview frames via an external extractor
pub struct ThumbnailEngine {
    thumb_dir: PathBuf,
    extractor: PathBuf,
    thumb_width: u32,
    seek_secs: u32,
    timeout: Duration,
}

impl ThumbnailEngine {
    /// Create an engine from the index configuration
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            thumb_dir: config.thumb_dir.clone(),
            extractor: config.extractor.clone(),
            thumb_width: config.thumb_width,
            seek_secs: config.thumb_seek_secs,
            timeout: config.extraction_timeout(),
        }
    }

    /// Compute the content-addressed thumbnail path for a video.
    ///
    /// The name is a digest of the video's path string plus a fixed `.jpg`
    /// extension; it does not depend on the file's content or mtime.
    pub fn thumbnail_path(&self, video: &Path) -> PathBuf {
        let mut hasher = Md5::new();
        hasher.update(video.to_string_lossy().as_bytes());
        let digest = hasher.finalize();
        self.thumb_dir.join(format!("{:x}.jpg", digest))
    }

    /// Ensure a usable thumbnail exists for a video, returning its path.
    ///
    /// An existing thumbnail at least as new as the source is reused without
    /// invoking extraction. Otherwise the external extractor is run with a
    /// bounded time budget; a non-zero exit, spawn failure, or timeout is
    /// returned as an error for this one video.
    pub fn ensure(&self, video: &Path) -> Result<PathBuf, IndexError> {
        let thumb = self.thumbnail_path(video);
        if is_fresh(video, &thumb) {
            return Ok(thumb);
        }
        fs::create_dir_all(&self.thumb_dir)
            .map_err(|e| IndexError::io_error(Some(self.thumb_dir.clone()), e.to_string()))?;
        self.extract_frame(video, &thumb)?;
        Ok(thumb)
    }

    /// Bring the thumbnail map in line with the current video set.
    ///
    /// Every current video gets an `ensure` attempt, strictly one extraction
    /// in flight at a time; failures are collected, never propagated. Entries
    /// of `prior` whose video is gone are orphans: their files are deleted
    /// best-effort in parallel and their entries dropped.
    pub fn reconcile(
        &self,
        videos: &BTreeSet<PathBuf>,
        prior: &BTreeMap<PathBuf, PathBuf>,
    ) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::default();

        for video in videos {
            let fresh = is_fresh(video, &self.thumbnail_path(video));
            match self.ensure(video) {
                Ok(thumb) => {
                    if fresh {
                        outcome.reused += 1;
                    } else {
                        outcome.generated += 1;
                    }
                    outcome.thumbnails.insert(video.clone(), thumb);
                }
                Err(e) => {
                    log::warn!("no thumbnail for {}: {}", video.display(), e);
                    outcome.failures.push(e);
                }
            }
        }

        let orphans: Vec<&PathBuf> = prior
            .iter()
            .filter(|(video, _)| !videos.contains(*video))
            .map(|(_, thumb)| thumb)
            .collect();
        outcome.orphans_removed = orphans.len() as u64;
        outcome.orphan_delete_failures = orphans
            .par_iter()
            .filter(|thumb| {
                if let Err(e) = fs::remove_file(thumb) {
                    // Not found just means the file already leaked or never
                    // existed; nothing left to delete.
                    if e.kind() == std::io::ErrorKind::NotFound {
                        return false;
                    }
                    log::debug!("orphan thumbnail left behind at {}: {}", thumb.display(), e);
                    return true;
                }
                false
            })
            .count() as u64;

        if outcome.orphans_removed > 0 || !outcome.failures.is_empty() {
            log::info!(
                "thumbnails reconciled: {} generated, {} reused, {} failed, {} orphans dropped",
                outcome.generated,
                outcome.reused,
                outcome.failures.len(),
                outcome.orphans_removed
            );
        }

        outcome
    }

    /// Run the external extractor for one frame, overwriting the output path
    fn extract_frame(&self, video: &Path, thumb: &Path) -> Result<(), IndexError> {
        let seek = format_seek(self.seek_secs);
        let scale = format!("scale='min({},iw)':-2", self.thumb_width);

        let mut child = Command::new(&self.extractor)
            .arg("-y")
            .arg("-ss")
            .arg(&seek)
            .arg("-i")
            .arg(video)
            .arg("-frames:v")
            .arg("1")
            .arg("-vf")
            .arg(&scale)
            .arg(thumb)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| IndexError::spawn_failed(video.to_path_buf(), e.to_string()))?;

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if status.success() {
                        return Ok(());
                    }
                    return Err(IndexError::extraction_failed(
                        video.to_path_buf(),
                        format!("extractor exited with {}", status),
                    ));
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        child.kill().ok();
                        child.wait().ok();
                        return Err(IndexError::extraction_timeout(video.to_path_buf()));
                    }
                    std::thread::sleep(EXTRACTION_POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(IndexError::extraction_failed(
                        video.to_path_buf(),
                        e.to_string(),
                    ));
                }
            }
        }
    }
}

/// A thumbnail is fresh when both sides stat cleanly and it is at least as
/// new as its source; any stat failure means regenerate.
fn is_fresh(video: &Path, thumb: &Path) -> bool {
    let (Some(video_mtime), Some(thumb_mtime)) = (mtime(video), mtime(thumb)) else {
        return false;
    };
    thumb_mtime >= video_mtime
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn format_seek(secs: u32) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn engine_in(dir: &TempDir, extractor: &Path) -> ThumbnailEngine {
        let config = IndexConfig::builder()
            .thumb_dir(dir.path().join("thumbs"))
            .extractor(extractor.to_path_buf())
            .extraction_timeout_secs(2)
            .build();
        ThumbnailEngine::new(&config)
    }

    /// Write an executable stub extractor that records each invocation and
    /// writes its output argument, failing for inputs whose name contains
    /// "bad".
    #[cfg(unix)]
    fn write_stub_extractor(dir: &TempDir) -> (PathBuf, PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let marker = dir.path().join("invocations.log");
        let script = dir.path().join("extract.sh");
        let body = format!(
            "#!/bin/sh\n\
             in=\"\"\n\
             prev=\"\"\n\
             out=\"\"\n\
             for a in \"$@\"; do\n\
               if [ \"$prev\" = \"-i\" ]; then in=\"$a\"; fi\n\
               prev=\"$a\"\n\
               out=\"$a\"\n\
             done\n\
             echo \"$in\" >> {marker}\n\
             case \"$in\" in *bad*) exit 1;; esac\n\
             printf 'jpeg' > \"$out\"\n",
            marker = marker.display()
        );
        fs::write(&script, body).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        (script, marker)
    }

    #[cfg(unix)]
    fn invocation_count(marker: &Path) -> usize {
        fs::read_to_string(marker).map(|s| s.lines().count()).unwrap_or(0)
    }

    #[test]
    fn test_thumbnail_path_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir, Path::new("ffmpeg"));

        let a1 = engine.thumbnail_path(Path::new("/m/a.mp4"));
        let a2 = engine.thumbnail_path(Path::new("/m/a.mp4"));
        let b = engine.thumbnail_path(Path::new("/m/b.mp4"));

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(a1.extension().unwrap(), "jpg");
        assert!(a1.starts_with(dir.path().join("thumbs")));
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_reuses_fresh_thumbnail() {
        let dir = TempDir::new().unwrap();
        let (script, marker) = write_stub_extractor(&dir);
        let engine = engine_in(&dir, &script);

        let video = dir.path().join("clip.mp4");
        fs::write(&video, b"video").unwrap();

        // Thumbnail written after the video, so it is at least as new
        let thumb = engine.thumbnail_path(&video);
        fs::create_dir_all(thumb.parent().unwrap()).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        fs::write(&thumb, b"jpeg").unwrap();

        let result = engine.ensure(&video).unwrap();
        assert_eq!(result, thumb);
        assert_eq!(invocation_count(&marker), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_regenerates_stale_thumbnail() {
        let dir = TempDir::new().unwrap();
        let (script, marker) = write_stub_extractor(&dir);
        let engine = engine_in(&dir, &script);

        let video = dir.path().join("clip.mp4");
        let thumb = engine.thumbnail_path(&video);
        fs::create_dir_all(thumb.parent().unwrap()).unwrap();
        fs::write(&thumb, b"old jpeg").unwrap();

        // Video modified after its thumbnail
        std::thread::sleep(Duration::from_millis(20));
        fs::write(&video, b"newer video").unwrap();

        let result = engine.ensure(&video).unwrap();
        assert_eq!(result, thumb);
        assert_eq!(invocation_count(&marker), 1);
        assert!(is_fresh(&video, &thumb));
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_regenerates_missing_thumbnail() {
        let dir = TempDir::new().unwrap();
        let (script, marker) = write_stub_extractor(&dir);
        let engine = engine_in(&dir, &script);

        let video = dir.path().join("clip.mkv");
        fs::write(&video, b"video").unwrap();

        let thumb = engine.ensure(&video).unwrap();
        assert!(thumb.exists());
        assert_eq!(invocation_count(&marker), 1);
    }

    #[test]
    fn test_ensure_spawn_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir, Path::new("/no/such/extractor"));

        let video = dir.path().join("clip.mp4");
        fs::write(&video, b"video").unwrap();

        assert!(engine.ensure(&video).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_times_out_hung_extractor() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let script = dir.path().join("hang.sh");
        fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let config = IndexConfig::builder()
            .thumb_dir(dir.path().join("thumbs"))
            .extractor(script)
            .extraction_timeout_secs(1)
            .build();
        let engine = ThumbnailEngine::new(&config);

        let video = dir.path().join("clip.mp4");
        fs::write(&video, b"video").unwrap();

        let err = engine.ensure(&video).unwrap_err();
        assert_eq!(err.kind, crate::error::IndexErrorKind::ExtractionTimeout);
    }

    #[cfg(unix)]
    #[test]
    fn test_reconcile_isolates_single_failure() {
        let dir = TempDir::new().unwrap();
        let (script, _marker) = write_stub_extractor(&dir);
        let engine = engine_in(&dir, &script);

        let good_a = dir.path().join("a.mp4");
        let bad = dir.path().join("bad.mp4");
        let good_c = dir.path().join("c.mp4");
        for v in [&good_a, &bad, &good_c] {
            fs::write(v, b"video").unwrap();
        }

        let videos: BTreeSet<PathBuf> =
            [good_a.clone(), bad.clone(), good_c.clone()].into_iter().collect();
        let outcome = engine.reconcile(&videos, &BTreeMap::new());

        assert_eq!(outcome.thumbnails.len(), 2);
        assert!(outcome.thumbnails.contains_key(&good_a));
        assert!(outcome.thumbnails.contains_key(&good_c));
        assert!(!outcome.thumbnails.contains_key(&bad));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.generated, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_reconcile_removes_orphans() {
        let dir = TempDir::new().unwrap();
        let (script, _marker) = write_stub_extractor(&dir);
        let engine = engine_in(&dir, &script);

        let gone = PathBuf::from("/m/gone.mp4");
        let orphan_thumb = engine.thumbnail_path(&gone);
        fs::create_dir_all(orphan_thumb.parent().unwrap()).unwrap();
        fs::write(&orphan_thumb, b"stale jpeg").unwrap();

        let prior: BTreeMap<PathBuf, PathBuf> =
            [(gone.clone(), orphan_thumb.clone())].into_iter().collect();
        let outcome = engine.reconcile(&BTreeSet::new(), &prior);

        assert!(outcome.thumbnails.is_empty());
        assert_eq!(outcome.orphans_removed, 1);
        assert_eq!(outcome.orphan_delete_failures, 0);
        assert!(!orphan_thumb.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_reconcile_keeps_fresh_and_counts_reuse() {
        let dir = TempDir::new().unwrap();
        let (script, marker) = write_stub_extractor(&dir);
        let engine = engine_in(&dir, &script);

        let video = dir.path().join("clip.mp4");
        fs::write(&video, b"video").unwrap();

        let videos: BTreeSet<PathBuf> = [video.clone()].into_iter().collect();
        let first = engine.reconcile(&videos, &BTreeMap::new());
        assert_eq!(first.generated, 1);

        let second = engine.reconcile(&videos, &first.thumbnails);
        assert_eq!(second.reused, 1);
        assert_eq!(second.generated, 0);
        assert_eq!(invocation_count(&marker), 1);
    }

    #[test]
    fn test_format_seek() {
        assert_eq!(format_seek(1), "00:00:01");
        assert_eq!(format_seek(75), "00:01:15");
        assert_eq!(format_seek(3661), "01:01:01");
    }
}
