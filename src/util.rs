use anyhow::{anyhow, Result};
use std::path::{Component, Path, PathBuf};

/// Reject destinations that could escape the directory they are joined onto.
pub fn validate_relative_path(rel: &str, label: &str) -> Result<()> {
    let path = Path::new(rel);
    if rel.trim().is_empty() {
        return Err(anyhow!("{label} must be non-empty"));
    }
    if path.is_absolute() || has_parent_components(path) {
        return Err(anyhow!(
            "{label} must be a relative path without '..' (got {rel:?})"
        ));
    }
    Ok(())
}

fn has_parent_components(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component, Component::ParentDir))
}

/// Express `path` relative to `base`, using `..` where the two diverge.
///
/// Both inputs are treated lexically; nothing touches the filesystem.
pub fn relpath(path: &Path, base: &Path) -> String {
    let path: Vec<Component<'_>> = normalized(path);
    let base: Vec<Component<'_>> = normalized(base);
    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(left, right)| left == right)
        .count();
    let mut parts: Vec<String> = Vec::new();
    for _ in common..base.len() {
        parts.push("..".to_string());
    }
    for component in &path[common..] {
        parts.push(component.as_os_str().to_string_lossy().to_string());
    }
    if parts.is_empty() {
        return ".".to_string();
    }
    parts.join("/")
}

fn normalized(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Join `rel` onto `root` after checking it stays inside `root`.
pub fn join_under(root: &Path, rel: &str, label: &str) -> Result<PathBuf> {
    validate_relative_path(rel, label)?;
    Ok(root.join(rel))
}

/// Render a path with forward slashes for use inside generated files.
pub fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
