//! Scanner module - walks library roots and aggregates classified media paths

use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use crate::error::{IndexError, IndexErrorKind};
use crate::models::{MediaSet, ScanOutcome};

/// Media paths found under one root, plus the faults skipped along the way
struct RootWalk {
    media: MediaSet,
    errors: Vec<IndexError>,
}

/// Walk a single library root depth-first and classify every file found.
///
/// Unreadable directories are skipped without aborting the walk; unclassified
/// files are ignored. Symlinks are not followed.
pub fn walk_root(root: &Path) -> MediaSet {
    walk_root_inner(root).media
}

fn walk_root_inner(root: &Path) -> RootWalk {
    let mut media = MediaSet::new();
    let mut errors = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    media.insert(entry.path().to_path_buf());
                }
            }
            Err(e) => {
                log::debug!("skipping unreadable entry under {}: {}", root.display(), e);
                let path = e.path().map(|p| p.to_path_buf());
                let kind = if e.io_error().map(|e| e.kind())
                    == Some(std::io::ErrorKind::PermissionDenied)
                {
                    IndexErrorKind::PermissionDenied
                } else {
                    IndexErrorKind::IoError
                };
                errors.push(IndexError::new(kind, path, e.to_string()));
            }
        }
    }

    RootWalk { media, errors }
}

/// Walk every configured library root and merge the results.
///
/// Roots are walked in parallel and merged after all walks complete; a file
/// reachable from two overlapping roots appears once. A failed or missing
/// root contributes an error to the outcome without affecting the others.
pub fn scan_libraries(roots: &BTreeSet<PathBuf>) -> ScanOutcome {
    let start = Instant::now();
    let roots: Vec<&PathBuf> = roots.iter().collect();

    let walks: Vec<RootWalk> = roots
        .par_iter()
        .map(|root| {
            if !root.exists() {
                return RootWalk {
                    media: MediaSet::new(),
                    errors: vec![IndexError::not_found((*root).clone())],
                };
            }
            walk_root_inner(root)
        })
        .collect();

    let mut outcome = ScanOutcome::default();
    for walk in walks {
        outcome.media.merge(walk.media);
        outcome.errors.extend(walk.errors);
    }
    outcome.duration_ms = start.elapsed().as_millis() as u64;

    if !outcome.errors.is_empty() {
        log::warn!(
            "scan finished with {} recovered faults across {} roots",
            outcome.errors.len(),
            roots.len()
        );
    }

    outcome
}
