//! Sync differ - describes what changed between two scans

use crate::models::{MediaSet, SyncDiff};

/// Compare a fresh scan against the previously cached set.
///
/// Pure set membership comparison; nothing is mutated. A path in `current`
/// but not `previous` is added, the reverse is removed.
pub fn diff(previous: &MediaSet, current: &MediaSet) -> SyncDiff {
    SyncDiff {
        added: MediaSet {
            images: current.images.difference(&previous.images).cloned().collect(),
            videos: current.videos.difference(&previous.videos).cloned().collect(),
        },
        removed: MediaSet {
            images: previous.images.difference(&current.images).cloned().collect(),
            videos: previous.videos.difference(&current.videos).cloned().collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn set(images: &[&str], videos: &[&str]) -> MediaSet {
        MediaSet {
            images: images.iter().map(PathBuf::from).collect(),
            videos: videos.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn test_diff_partitions_added_and_removed() {
        let previous = set(&["/m/a.jpg", "/m/b.jpg"], &[]);
        let current = set(&["/m/b.jpg", "/m/c.jpg"], &[]);

        let diff = diff(&previous, &current);
        assert_eq!(diff.added.images, set(&["/m/c.jpg"], &[]).images);
        assert_eq!(diff.removed.images, set(&["/m/a.jpg"], &[]).images);
        assert!(diff.added.videos.is_empty());
        assert!(diff.removed.videos.is_empty());
    }

    #[test]
    fn test_diff_videos_tracked_separately() {
        let previous = set(&[], &["/m/old.mp4"]);
        let current = set(&[], &["/m/new.mkv"]);

        let diff = diff(&previous, &current);
        assert_eq!(diff.added.videos.len(), 1);
        assert_eq!(diff.removed.videos.len(), 1);
        assert!(diff.added.videos.contains(&PathBuf::from("/m/new.mkv")));
    }

    #[test]
    fn test_diff_identical_sets_is_empty() {
        let a = set(&["/m/a.jpg"], &["/m/b.mp4"]);
        let diff = diff(&a, &a.clone());
        assert!(diff.is_empty());
    }
}
