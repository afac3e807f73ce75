//! Project backends and the emission pipeline they share.
//!
//! A backend turns one [`ProjectSource`] into a copy manifest plus a fully
//! resynchronized project directory. Each emission returns an
//! [`EmitOutcome`]; callers fold outcomes into a [`BackendSummary`].
mod eclipse;
mod studio;

pub use eclipse::AndroidEclipseBackend;
pub use studio::AndroidStudioBackend;

use crate::config::BuildConfig;
use crate::frontend::{validate_project, ProjectDescription, ProjectSource};
use crate::manifest::InstallManifest;
use crate::markup;
use crate::paths::BackendPaths;
use crate::staging::publish_staging;
use crate::templates::{materialize, TemplateFile};
use crate::tokens::{self, TokenMap};
use crate::util::{relpath, slash_path};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// IDE formats that can be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    AndroidEclipse,
    AndroidStudio,
}

impl BackendKind {
    /// Human readable name used in summaries.
    pub fn display_name(self) -> &'static str {
        match self {
            BackendKind::AndroidEclipse => "Android Eclipse",
            BackendKind::AndroidStudio => "Android Studio",
        }
    }

    /// Directory under the state root holding this backend's output.
    pub fn dir_name(self) -> &'static str {
        match self {
            BackendKind::AndroidEclipse => "android_eclipse",
            BackendKind::AndroidStudio => "android_studio",
        }
    }
}

/// A generator for one IDE format.
pub trait ProjectBackend {
    fn kind(&self) -> BackendKind;

    fn paths(&self) -> &BackendPaths;

    /// Emit the project described by `source`.
    fn emit(&self, source: &ProjectSource) -> Result<EmitOutcome>;

    /// Run once after every project has been emitted.
    fn finish(&self, _outcomes: &[EmitOutcome], _run_build: bool) -> Result<()> {
        Ok(())
    }
}

/// Build the backend for `kind`, writing beneath `state_root`.
pub fn create_backend(
    kind: BackendKind,
    config: BuildConfig,
    state_root: PathBuf,
) -> Box<dyn ProjectBackend> {
    let paths = BackendPaths::new(state_root, kind.dir_name());
    match kind {
        BackendKind::AndroidEclipse => Box::new(AndroidEclipseBackend::new(config, paths)),
        BackendKind::AndroidStudio => Box::new(AndroidStudioBackend::new(config, paths)),
    }
}

/// Whether the project directory existed before the emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Created,
    Updated,
}

/// Result of emitting one project.
#[derive(Debug, Clone, Serialize)]
pub struct EmitOutcome {
    pub name: String,
    pub relsrcdir: String,
    pub project_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub status: ProjectStatus,
    pub manifest_entries: usize,
    pub files_written: usize,
    pub files_removed: usize,
}

/// Aggregate over all emissions of a run.
#[derive(Debug, Clone, Serialize)]
pub struct BackendSummary {
    pub backend: BackendKind,
    pub output_dir: PathBuf,
    pub created_count: usize,
    pub updated_count: usize,
    pub skipped_objects: usize,
    pub projects: Vec<EmitOutcome>,
}

impl BackendSummary {
    pub fn new(backend: BackendKind, output_dir: PathBuf) -> Self {
        Self {
            backend,
            output_dir,
            created_count: 0,
            updated_count: 0,
            skipped_objects: 0,
            projects: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: EmitOutcome) {
        match outcome.status {
            ProjectStatus::Created => self.created_count += 1,
            ProjectStatus::Updated => self.updated_count += 1,
        }
        self.projects.push(outcome);
    }

    pub fn record_skipped(&mut self) {
        self.skipped_objects += 1;
    }

    /// One-line report for the terminal.
    pub fn detailed(&self) -> String {
        format!(
            "Wrote {} {} projects to {}; {} created; {} updated",
            self.created_count + self.updated_count,
            self.backend.display_name(),
            self.output_dir.display(),
            self.created_count,
            self.updated_count
        )
    }
}

/// Project names grouped by relative source directory, both sorted.
///
/// Used to run one external build per project, subtree by subtree.
pub fn build_order(outcomes: &[EmitOutcome]) -> BTreeMap<String, Vec<String>> {
    let mut order: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for outcome in outcomes {
        order
            .entry(outcome.relsrcdir.clone())
            .or_default()
            .push(outcome.name.clone());
    }
    for names in order.values_mut() {
        names.sort();
    }
    order
}

/// Tokens every backend defines.
pub(crate) fn common_tokens(
    config: &BuildConfig,
    source: &ProjectSource,
    project_dir: &Path,
) -> TokenMap {
    let project = &source.project;
    let mut map = TokenMap::new();
    map.insert(tokens::IDE_OBJDIR, slash_path(&source.objdir));
    map.insert(tokens::IDE_TOPOBJDIR, slash_path(&config.topobjdir));
    map.insert(tokens::IDE_SRCDIR, slash_path(&source.srcdir));
    map.insert(tokens::IDE_TOPSRCDIR, slash_path(&config.topsrcdir));
    map.insert(tokens::IDE_PROJECT_NAME, project.name.as_str());
    map.insert(tokens::IDE_PACKAGE_NAME, project.package_name.as_str());
    map.insert(tokens::IDE_PROJECT_DIRECTORY, slash_path(project_dir));
    map.insert(
        tokens::IDE_RELSRCDIR,
        relpath(&source.srcdir, &config.topsrcdir),
    );
    let targets: Vec<&str> = project
        .recursive_make_targets
        .iter()
        .map(String::as_str)
        .collect();
    map.insert(tokens::IDE_RECURSIVE_MAKE_TARGETS, targets.join(" "));
    map.insert(
        tokens::IDE_PROJECT_LIBRARY_SETTING,
        if project.is_library {
            "android.library=true"
        } else {
            ""
        },
    );
    let references: Vec<String> = project
        .included_projects
        .iter()
        .enumerate()
        .map(|(idx, reference)| format!("android.library.reference.{}={reference}", idx + 1))
        .collect();
    map.insert(tokens::IDE_PROJECT_LIBRARY_REFERENCES, references.join("\n"));
    map.insert(
        tokens::ANDROID_TARGET_SDK,
        config.android_target_sdk.as_str(),
    );
    map
}

/// Tab-indented `<classpathentry>` lines: entries by path, then referenced
/// projects, then (optionally) extra JARs.
pub(crate) fn classpath_entries(
    project: &ProjectDescription,
    include_jars: bool,
) -> Result<String> {
    let mut lines = Vec::new();
    for entry in project.sorted_classpath_entries() {
        lines.push(markup::classpath_entry(entry)?);
    }
    for name in &project.referenced_projects {
        lines.push(markup::referenced_project(name)?);
    }
    if include_jars {
        for jar in &project.extra_jars {
            lines.push(markup::extra_jar(jar)?);
        }
    }
    Ok(lines
        .iter()
        .map(|line| format!("\t{line}"))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Everything a backend prepared for one project.
pub(crate) struct Emission<'a> {
    pub paths: &'a BackendPaths,
    pub source: &'a ProjectSource,
    pub templates: Vec<TemplateFile>,
    pub manifest: InstallManifest,
    pub tokens: TokenMap,
    /// Output name of the manifest template, dropped for non-library projects.
    pub library_manifest: &'static str,
    pub relsrcdir: String,
}

/// Write the manifest, render templates and resynchronize the project dir.
pub(crate) fn run_emission(emission: Emission<'_>) -> Result<EmitOutcome> {
    let start = Instant::now();
    let project = &emission.source.project;
    let name = project.name.as_str();
    let project_dir = emission.paths.project_dir(name);
    let manifest_path = emission.paths.manifest_path(name);

    emission.manifest.write(&manifest_path)?;

    let staging = tempfile::Builder::new()
        .prefix("ideproj-staging-")
        .tempdir()
        .context("create staging directory")?;
    let is_library = project.is_library;
    let library_manifest = emission.library_manifest;
    materialize(
        &emission.templates,
        &emission.tokens,
        staging.path(),
        |output_name| !is_library && output_name == library_manifest,
    )
    .with_context(|| format!("render templates for {name}"))?;

    let status = if project_dir.is_dir() {
        ProjectStatus::Updated
    } else {
        ProjectStatus::Created
    };
    let report = publish_staging(staging.path(), &project_dir)
        .with_context(|| format!("publish {}", project_dir.display()))?;

    tracing::info!(
        project = name,
        files_written = report.written,
        files_removed = report.removed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "emitted project"
    );

    Ok(EmitOutcome {
        name: name.to_string(),
        relsrcdir: emission.relsrcdir,
        project_dir,
        manifest_path,
        status,
        manifest_entries: emission.manifest.len(),
        files_written: report.written,
        files_removed: report.removed,
    })
}

/// Validate a project before anything is written for it.
pub(crate) fn checked(source: &ProjectSource) -> Result<&ProjectDescription> {
    validate_project(&source.project)?;
    Ok(&source.project)
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
