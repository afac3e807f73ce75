//! Objects handed to the backends by the build configuration frontend.
//!
//! The frontend emits a stream of tagged objects; only Android project data
//! is of interest here and every other kind is acknowledged and skipped.
use crate::util::validate_relative_path;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One object produced by the build configuration frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildObject {
    AndroidProject(ProjectSource),
    #[serde(other)]
    Other,
}

/// A project description together with the directories it was declared in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSource {
    pub srcdir: PathBuf,
    pub objdir: PathBuf,
    pub project: ProjectDescription,
}

/// Declarative metadata for a single IDE project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectDescription {
    pub name: String,
    pub package_name: String,
    #[serde(default)]
    pub manifest: Option<String>,
    #[serde(default)]
    pub res: Option<String>,
    #[serde(default)]
    pub assets: Option<String>,
    /// Directory linked wholesale into `libs/`; its contents are only known
    /// after packaging.
    #[serde(default)]
    pub libs: Option<String>,
    #[serde(default)]
    pub classpath_entries: Vec<ClasspathEntry>,
    #[serde(default)]
    pub referenced_projects: BTreeSet<String>,
    #[serde(default)]
    pub included_projects: BTreeSet<String>,
    #[serde(default)]
    pub extra_jars: BTreeSet<String>,
    #[serde(default)]
    pub recursive_make_targets: BTreeSet<String>,
    #[serde(default)]
    pub is_library: bool,
    #[serde(default)]
    pub filtered_resources: BTreeSet<String>,
    #[serde(default)]
    pub native_libs: Vec<NativeLib>,
}

/// A source root exposed to the IDE compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClasspathEntry {
    pub srcdir: String,
    pub dstdir: String,
    #[serde(default)]
    pub exclude_patterns: BTreeSet<String>,
    #[serde(default)]
    pub ignore_warnings: bool,
}

impl ClasspathEntry {
    /// Path of the entry inside the project, as the IDE sees it.
    pub fn path(&self) -> &str {
        &self.dstdir
    }
}

/// A native library copied into the project at install time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeLib {
    pub src: String,
    pub dst: String,
}

impl ProjectDescription {
    /// Classpath entries ordered by path, then by source directory.
    pub fn sorted_classpath_entries(&self) -> Vec<&ClasspathEntry> {
        let mut entries: Vec<&ClasspathEntry> = self.classpath_entries.iter().collect();
        entries.sort_by(|left, right| {
            left.path()
                .cmp(right.path())
                .then_with(|| left.srcdir.cmp(&right.srcdir))
        });
        entries
    }

    /// Native library pairs ordered by destination.
    pub fn sorted_native_libs(&self) -> Vec<&NativeLib> {
        let mut libs: Vec<&NativeLib> = self.native_libs.iter().collect();
        libs.sort_by(|left, right| left.dst.cmp(&right.dst).then_with(|| left.src.cmp(&right.src)));
        libs
    }
}

/// Check the fields that become output paths.
pub fn validate_project(project: &ProjectDescription) -> Result<()> {
    let name = project.name.as_str();
    if name.trim().is_empty() {
        return Err(anyhow!("project name must be non-empty"));
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(anyhow!(
            "project name must be a single path component (got {name:?})"
        ));
    }
    for entry in &project.classpath_entries {
        validate_relative_path(&entry.dstdir, "classpath entry dstdir")
            .with_context(|| format!("project {name}"))?;
    }
    for lib in &project.native_libs {
        validate_relative_path(&lib.dst, "native library dst")
            .with_context(|| format!("project {name}"))?;
    }
    for jar in &project.extra_jars {
        let has_file_name = Path::new(jar).file_name().is_some();
        if !has_file_name {
            return Err(anyhow!("project {name}: extra jar {jar:?} has no file name"));
        }
    }
    Ok(())
}

/// Load the frontend's object stream from a JSON array.
pub fn load_objects(path: &Path) -> Result<Vec<BuildObject>> {
    let bytes = fs::read(path).with_context(|| format!("read objects {}", path.display()))?;
    let objects: Vec<BuildObject> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse build objects JSON {}", path.display()))?;
    Ok(objects)
}
