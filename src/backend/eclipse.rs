//! Android Eclipse project generation.
use super::{
    checked, classpath_entries, common_tokens, run_emission, BackendKind, EmitOutcome, Emission,
    ProjectBackend,
};
use crate::config::BuildConfig;
use crate::frontend::{ProjectDescription, ProjectSource};
use crate::manifest::InstallManifest;
use crate::paths::BackendPaths;
use crate::templates::{load_templates, ANDROID_ECLIPSE_TEMPLATES};
use crate::tokens::{TokenMap, IDE_CLASSPATH_ENTRIES};
use crate::util::relpath;
use anyhow::{anyhow, Result};
use std::path::Path;

/// Main projects supply their own manifest through the copy manifest.
const LIBRARY_MANIFEST_TEMPLATE: &str = "AndroidManifest.xml";

pub struct AndroidEclipseBackend {
    config: BuildConfig,
    paths: BackendPaths,
}

impl AndroidEclipseBackend {
    pub fn new(config: BuildConfig, paths: BackendPaths) -> Self {
        Self { config, paths }
    }

    /// Tokens for one project's templates.
    pub fn tokens(&self, source: &ProjectSource) -> Result<TokenMap> {
        let project_dir = self.paths.project_dir(&source.project.name);
        let mut map = common_tokens(&self.config, source, &project_dir);
        map.insert(
            IDE_CLASSPATH_ENTRIES,
            classpath_entries(&source.project, false)?,
        );
        Ok(map)
    }
}

/// Links for the Eclipse layout: sources and resources at the project root,
/// JARs and native libraries together in `libs/`.
pub fn manifest_for_project(
    srcdir: &Path,
    project: &ProjectDescription,
) -> Result<InstallManifest> {
    let mut manifest = InstallManifest::new();

    if let Some(android_manifest) = &project.manifest {
        manifest.add_symlink(&srcdir.join(android_manifest), "AndroidManifest.xml")?;
    }
    if let Some(res) = &project.res {
        manifest.add_symlink(&srcdir.join(res), "res")?;
    }
    if let Some(assets) = &project.assets {
        manifest.add_symlink(&srcdir.join(assets), "assets")?;
    }
    for entry in project.sorted_classpath_entries() {
        manifest.add_symlink(&srcdir.join(&entry.srcdir), &entry.dstdir)?;
    }

    // The contents of libs/ are only known after a successful package, which
    // is after generation; the pattern is resolved at install time.
    if let Some(libs) = &project.libs {
        manifest.add_pattern_symlink(&srcdir.join(libs), "**", "libs")?;
    }
    for jar in &project.extra_jars {
        let file_name = Path::new(jar)
            .file_name()
            .ok_or_else(|| anyhow!("extra jar {jar:?} has no file name"))?
            .to_string_lossy();
        manifest.add_symlink(&srcdir.join(jar), &format!("libs/{file_name}"))?;
    }

    Ok(manifest)
}

impl ProjectBackend for AndroidEclipseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::AndroidEclipse
    }

    fn paths(&self) -> &BackendPaths {
        &self.paths
    }

    fn emit(&self, source: &ProjectSource) -> Result<EmitOutcome> {
        let project = checked(source)?;
        run_emission(Emission {
            paths: &self.paths,
            source,
            templates: load_templates(self.config.template_root(), ANDROID_ECLIPSE_TEMPLATES)?,
            manifest: manifest_for_project(&source.srcdir, project)?,
            tokens: self.tokens(source)?,
            library_manifest: LIBRARY_MANIFEST_TEMPLATE,
            relsrcdir: relpath(&source.srcdir, &self.config.topsrcdir),
        })
    }
}
