//! Install a copy manifest into a project directory.
//!
//! Sources that are missing at install time are fatal. This matters most for
//! native libraries: a project referencing libraries that were never packaged
//! would build but crash on device.
use crate::manifest::{InstallManifest, InstallMode, ManifestEntry};
use crate::util::join_under;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Counts of what an install produced.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub linked: usize,
    pub copied: usize,
}

/// Install every manifest entry beneath `dest_root`.
pub fn install_manifest(manifest: &InstallManifest, dest_root: &Path) -> Result<InstallReport> {
    fs::create_dir_all(dest_root).with_context(|| format!("create {}", dest_root.display()))?;
    let mut report = InstallReport::default();
    for (key, entry) in manifest.entries() {
        match entry {
            ManifestEntry::File { mode, source } => {
                let dest = join_under(dest_root, key, "manifest destination")?;
                install_one(dest_root, *mode, Path::new(source), &dest, &mut report)?;
            }
            ManifestEntry::Pattern {
                mode,
                base,
                pattern,
                dest,
            } => {
                let dest_dir = join_under(dest_root, dest, "manifest destination")?;
                let matches = resolve_pattern(Path::new(base), pattern)?;
                tracing::debug!(
                    base = %base,
                    pattern = %pattern,
                    matches = matches.len(),
                    "resolved manifest pattern"
                );
                for rel in matches {
                    let source = Path::new(base).join(&rel);
                    install_one(dest_root, *mode, &source, &dest_dir.join(&rel), &mut report)?;
                }
            }
        }
    }
    Ok(report)
}

/// Files under `base` whose base-relative path matches `pattern`, sorted.
pub fn resolve_pattern(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !base.is_dir() {
        return Err(anyhow!("pattern base {} is not a directory", base.display()));
    }
    let matcher = glob::Pattern::new(pattern)
        .with_context(|| format!("invalid manifest pattern {pattern:?}"))?;
    let options = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    let mut matches = Vec::new();
    for entry in WalkDir::new(base).follow_links(true).min_depth(1) {
        let entry = entry.with_context(|| format!("walk {}", base.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(base)
            .context("strip pattern base")?
            .to_path_buf();
        if matcher.matches_path_with(&rel, options) {
            matches.push(rel);
        }
    }
    matches.sort();
    Ok(matches)
}

fn install_one(
    dest_root: &Path,
    mode: InstallMode,
    source: &Path,
    dest: &Path,
    report: &mut InstallReport,
) -> Result<()> {
    if !source.exists() {
        return Err(anyhow!(
            "missing install source {} for {}",
            source.display(),
            dest.display()
        ));
    }
    ensure_real_parents(dest_root, dest)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    remove_existing(dest)?;
    match mode {
        InstallMode::Link => {
            link(source, dest)?;
            report.linked += 1;
        }
        InstallMode::Copy => {
            copy_recursive(source, dest)?;
            report.copied += 1;
        }
    }
    Ok(())
}

/// Refuse destinations reached through a symlinked directory below
/// `dest_root`; writing there would land outside the project.
fn ensure_real_parents(dest_root: &Path, dest: &Path) -> Result<()> {
    let rel = dest
        .strip_prefix(dest_root)
        .with_context(|| format!("{} is outside {}", dest.display(), dest_root.display()))?;
    let mut current = dest_root.to_path_buf();
    let mut components = rel.components().peekable();
    while let Some(component) = components.next() {
        if components.peek().is_none() {
            break;
        }
        current.push(component);
        let is_symlink = fs::symlink_metadata(&current)
            .is_ok_and(|meta| meta.file_type().is_symlink());
        if is_symlink {
            return Err(anyhow!(
                "refusing to install {} through symlinked directory {}",
                dest.display(),
                current.display()
            ));
        }
    }
    Ok(())
}

fn remove_existing(dest: &Path) -> Result<()> {
    let Ok(meta) = fs::symlink_metadata(dest) else {
        return Ok(());
    };
    if meta.is_dir() {
        fs::remove_dir_all(dest).with_context(|| format!("remove {}", dest.display()))
    } else {
        fs::remove_file(dest).with_context(|| format!("remove {}", dest.display()))
    }
}

#[cfg(unix)]
fn link(source: &Path, dest: &Path) -> Result<()> {
    std::os::unix::fs::symlink(source, dest)
        .with_context(|| format!("symlink {} -> {}", dest.display(), source.display()))
}

#[cfg(not(unix))]
fn link(source: &Path, dest: &Path) -> Result<()> {
    copy_recursive(source, dest)
}

fn copy_recursive(source: &Path, dest: &Path) -> Result<()> {
    if source.is_file() {
        fs::copy(source, dest)
            .with_context(|| format!("copy {} -> {}", source.display(), dest.display()))?;
        return Ok(());
    }
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.with_context(|| format!("walk {}", source.display()))?;
        let rel = entry.path().strip_prefix(source).context("strip copy source")?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).with_context(|| format!("create {}", target.display()))?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!("copy {} -> {}", entry.path().display(), target.display())
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
