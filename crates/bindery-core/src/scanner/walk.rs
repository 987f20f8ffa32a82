use super::{ArtifactFile, ArtifactPair};
use dashmap::DashMap;
use glob::Pattern;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Parallel walk of the import root. Collects primary artifacts (PDFs) and
/// pairs each with a secondary artifact (PNG/JPEG thumbnail) sharing its
/// base path, filtering by glob ignore patterns. Skips symlinks and 0-byte
/// files. An unreadable root is fatal; permission-denied subdirectories are
/// logged and skipped.
///
/// Pairs are returned sorted by primary filename so downstream phases
/// iterate in a stable order.
pub fn discover_artifact_pairs(
    root: &str,
    ignore_globs: &[&str],
) -> io::Result<Vec<ArtifactPair>> {
    let root_path = Path::new(root);
    if !root_path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Import root is not a readable directory: {}", root),
        ));
    }

    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    // base path (minus extension) → (primary, secondary)
    let map: DashMap<String, (Option<PathBuf>, Option<PathBuf>)> = DashMap::new();
    visit_dirs(root_path, &map, &ignore_patterns)?;

    let mut pairs: Vec<ArtifactPair> = Vec::with_capacity(map.len());
    for entry in map.into_iter() {
        let (base, (primary, secondary)) = entry;
        match primary {
            Some(primary_path) => pairs.push(ArtifactPair {
                primary: ArtifactFile::new(primary_path),
                secondary: secondary.map(ArtifactFile::new),
            }),
            None => {
                debug!("Skipping secondary artifact with no primary: {}", base);
            }
        }
    }

    pairs.sort_by(|a, b| a.primary.file_name.cmp(&b.primary.file_name));
    Ok(pairs)
}

/// Artifact kind by extension. Anything else is ignored by the scan.
fn classify(path: &Path) -> Option<ArtifactSlot> {
    let extension = path.extension()?.to_string_lossy().to_lowercase();
    match extension.as_str() {
        "pdf" => Some(ArtifactSlot::Primary),
        "png" | "jpg" | "jpeg" => Some(ArtifactSlot::Secondary),
        _ => None,
    }
}

enum ArtifactSlot {
    Primary,
    Secondary,
}

fn visit_dirs(
    dir: &Path,
    map: &DashMap<String, (Option<PathBuf>, Option<PathBuf>)>,
    ignore_patterns: &[Pattern],
) -> io::Result<()> {
    if ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(dir))
    {
        return Ok(());
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() == io::ErrorKind::PermissionDenied {
                error!("Access denied reading directory {}: {}", dir.display(), err);
                return Ok(());
            } else {
                return Err(io::Error::new(
                    err.kind(),
                    format!("Error reading directory {}: {}", dir.display(), err),
                ));
            }
        }
    };

    entries.par_bridge().try_for_each(|entry_result| {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                return Err(io::Error::new(
                    err.kind(),
                    format!("Error reading entry in directory {}: {}", dir.display(), err),
                ));
            }
        };

        let path = entry.path();
        if path.is_dir() {
            return visit_dirs(&path, map, ignore_patterns);
        }

        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                return Err(io::Error::new(
                    err.kind(),
                    format!("Error getting metadata for {}: {}", path.display(), err),
                ));
            }
        };
        if metadata.file_type().is_symlink() || metadata.len() == 0 {
            return Ok(());
        }
        if ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(&path))
        {
            return Ok(());
        }

        if let Some(slot) = classify(&path) {
            let base = path.with_extension("").to_string_lossy().into_owned();
            let mut entry = map.entry(base).or_default();
            match slot {
                ArtifactSlot::Primary => entry.0 = Some(path),
                ArtifactSlot::Secondary => entry.1 = Some(path),
            }
        }
        Ok(())
    })?;

    Ok(())
}
