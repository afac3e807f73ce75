//! Staged writes and full resynchronization of project directories.
//!
//! Generated files are written to a staging tree first. Publishing makes the
//! destination mirror that tree exactly: anything the current pass did not
//! produce is deleted before staged files are copied in.
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Counts of what a publish changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub written: usize,
    pub removed: usize,
}

pub fn write_staged_bytes(staging_root: &Path, rel_path: &str, bytes: &[u8]) -> Result<()> {
    let staging_path = staging_root.join(rel_path);
    if let Some(parent) = staging_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&staging_path, bytes).with_context(|| format!("write {}", staging_path.display()))?;
    Ok(())
}

/// Make `dest_root` hold exactly the files staged under `staging_root`.
pub fn publish_staging(staging_root: &Path, dest_root: &Path) -> Result<SyncReport> {
    let files = collect_files_recursive(staging_root)?;
    let mut accounted = BTreeSet::new();
    for file in &files {
        let rel = file
            .strip_prefix(staging_root)
            .context("strip staging prefix")?;
        accounted.insert(rel.to_path_buf());
    }

    fs::create_dir_all(dest_root).with_context(|| format!("create {}", dest_root.display()))?;
    let removed = remove_unaccounted(dest_root, &accounted)?;

    let mut written = 0;
    for rel in &accounted {
        publish_file(&staging_root.join(rel), &dest_root.join(rel))?;
        written += 1;
    }
    Ok(SyncReport { written, removed })
}

pub fn collect_files_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.with_context(|| format!("read {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Delete everything under `dest_root` that is neither an accounted file nor
/// a real directory leading to one. Symlinks are removed, never followed.
fn remove_unaccounted(dest_root: &Path, accounted: &BTreeSet<PathBuf>) -> Result<usize> {
    let mut needed_dirs = BTreeSet::new();
    for rel in accounted {
        let mut parent = rel.parent();
        while let Some(dir) = parent.filter(|dir| !dir.as_os_str().is_empty()) {
            needed_dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
    }

    let mut removed = 0;
    let mut walker = WalkDir::new(dest_root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.with_context(|| format!("read {}", dest_root.display()))?;
        let rel = entry
            .path()
            .strip_prefix(dest_root)
            .context("strip destination prefix")?
            .to_path_buf();
        let file_type = entry.file_type();
        if file_type.is_dir() {
            if needed_dirs.contains(&rel) {
                continue;
            }
            walker.skip_current_dir();
            removed += count_files(entry.path());
            fs::remove_dir_all(entry.path())
                .with_context(|| format!("remove {}", entry.path().display()))?;
            tracing::debug!(path = %entry.path().display(), "removed unaccounted directory");
        } else if !accounted.contains(&rel) {
            fs::remove_file(entry.path())
                .with_context(|| format!("remove {}", entry.path().display()))?;
            removed += 1;
            tracing::debug!(path = %entry.path().display(), "removed unaccounted file");
        }
    }
    Ok(removed)
}

fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_type().is_dir())
        .count()
}

fn publish_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file_name = dest
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("invalid destination {}", dest.display()))?;
    let tmp_path = dest
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!(".{file_name}.tmp"));
    fs::copy(source, &tmp_path).with_context(|| format!("publish {}", dest.display()))?;
    fs::rename(&tmp_path, dest).with_context(|| format!("publish {}", dest.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
