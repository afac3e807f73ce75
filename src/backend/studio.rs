//! Android Studio / IntelliJ project generation.
//!
//! Studio projects follow the Gradle layout (`src/main/...`) and add an IML
//! module and a `build.gradle` on top of the Eclipse-style files.
use super::{
    build_order, checked, classpath_entries, common_tokens, run_emission, BackendKind,
    EmitOutcome, Emission, ProjectBackend,
};
use crate::config::{BuildConfig, FilterIds};
use crate::external::run_external;
use crate::frontend::{ProjectDescription, ProjectSource};
use crate::manifest::InstallManifest;
use crate::markup;
use crate::paths::BackendPaths;
use crate::templates::{
    extract_bundled, load_templates, ANDROID_STUDIO_TEMPLATES, EMPTY_RESOURCE_DIRECTORY,
};
use crate::tokens::{self, TokenMap};
use crate::util::relpath;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const LIBRARY_MANIFEST_TEMPLATE: &str = "src/main/AndroidManifest.xml";
const GRADLE_MAIN_SOURCES: &str = "src/main";

pub struct AndroidStudioBackend {
    config: BuildConfig,
    paths: BackendPaths,
}

impl AndroidStudioBackend {
    pub fn new(config: BuildConfig, paths: BackendPaths) -> Self {
        Self { config, paths }
    }

    /// Pattern-copy base for projects without resources. Bundled templates
    /// are extracted beside the project directories.
    fn empty_resource_dir(&self) -> PathBuf {
        match self.config.template_root() {
            Some(root) => root.join(EMPTY_RESOURCE_DIRECTORY),
            None => self.paths.backend_dir().join(EMPTY_RESOURCE_DIRECTORY),
        }
    }

    pub(super) fn first_filter_id(&self) -> Result<u64> {
        match self.config.filter_ids {
            FilterIds::Sequential => Ok(1),
            FilterIds::Time => Ok(SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .context("compute timestamp")?
                .as_millis() as u64),
        }
    }

    /// Tokens for one project's templates.
    pub fn tokens(&self, source: &ProjectSource) -> Result<TokenMap> {
        let project = &source.project;
        let project_dir = self.paths.project_dir(&project.name);
        let mut map = common_tokens(&self.config, source, &project_dir);
        map.insert(
            tokens::IDE_CLASSPATH_ENTRIES,
            classpath_entries(project, true)?,
        );

        let filtered = if project.filtered_resources.is_empty() {
            String::new()
        } else {
            markup::filtered_resources(&project.filtered_resources, self.first_filter_id()?)?
        };
        map.insert(tokens::IDE_PROJECT_FILTERED_RESOURCES, filtered);

        map.insert(
            tokens::IDE_PLUGIN,
            if project.is_library {
                "android-library"
            } else {
                "android"
            },
        );

        let mut dependencies = String::new();
        let mut order_entries = String::new();
        for reference in &project.included_projects {
            let module = module_name(reference);
            dependencies.push_str(&markup::gradle_project_dependency(&module));
            order_entries.push_str(&markup::order_entry_module(&module)?);
        }
        map.insert(tokens::IDE_DEPENDENCIES, dependencies);
        map.insert(tokens::IDE_ORDERENTRY_MODULES, order_entries);

        let libraries = project
            .extra_jars
            .iter()
            .map(|jar| markup::order_entry_module_library(jar))
            .collect::<Result<String>>()?;
        map.insert(tokens::IDE_ORDERENTRY_MODULE_LIBRARIES, libraries);

        let mut src_dirs = String::new();
        let mut excludes = String::new();
        let mut source_folders = String::new();
        for entry in project.sorted_classpath_entries() {
            for pattern in &entry.exclude_patterns {
                excludes.push_str(&markup::gradle_exclude(pattern));
            }
            if !entry.dstdir.starts_with(GRADLE_MAIN_SOURCES) {
                src_dirs.push_str(&markup::gradle_src_dir(&entry.dstdir));
                source_folders.push_str(&markup::source_folder(&entry.dstdir)?);
            }
        }
        map.insert(tokens::IDE_SRCDIRS, src_dirs.trim_end());
        map.insert(tokens::IDE_EXCLUDES, excludes.trim_end());
        map.insert(tokens::IDE_SOURCEFOLDERS, source_folders.trim_end());
        Ok(map)
    }

    /// Copies and links for the Gradle layout.
    pub fn manifest_for_project(
        &self,
        srcdir: &Path,
        project: &ProjectDescription,
    ) -> Result<InstallManifest> {
        let mut manifest = InstallManifest::new();

        if let Some(android_manifest) = &project.manifest {
            manifest.add_copy(
                &srcdir.join(android_manifest),
                "src/main/AndroidManifest.xml",
            )?;
        }

        match &project.res {
            Some(res) => manifest.add_symlink(&srcdir.join(res), "src/main/res")?,
            // The IDE insists on a res directory, so give it an empty one.
            None => manifest.add_pattern_copy(&self.empty_resource_dir(), "**", "src/main/res")?,
        }

        if let Some(assets) = &project.assets {
            manifest.add_symlink(&srcdir.join(assets), "src/main/assets")?;
        }

        for entry in project.sorted_classpath_entries() {
            manifest.add_symlink(&srcdir.join(&entry.srcdir), &entry.dstdir)?;
        }

        // Native libraries are copied explicitly. Installing fails when the
        // tree has not been packaged, rather than shipping a project that
        // crashes on device for lack of them.
        for lib in project.sorted_native_libs() {
            manifest.add_copy(
                &srcdir.join(&lib.src),
                &format!("src/main/jniLibs/{}", lib.dst),
            )?;
        }

        Ok(manifest)
    }
}

/// Gradle/IML module name for an included project path.
fn module_name(reference: &str) -> String {
    reference.replace("../", "")
}

impl ProjectBackend for AndroidStudioBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::AndroidStudio
    }

    fn paths(&self) -> &BackendPaths {
        &self.paths
    }

    fn emit(&self, source: &ProjectSource) -> Result<EmitOutcome> {
        let project = checked(source)?;
        if project.res.is_none() && self.config.template_root().is_none() {
            extract_bundled(EMPTY_RESOURCE_DIRECTORY, &self.empty_resource_dir())?;
        }
        run_emission(Emission {
            paths: &self.paths,
            source,
            templates: load_templates(self.config.template_root(), ANDROID_STUDIO_TEMPLATES)?,
            manifest: self.manifest_for_project(&source.srcdir, project)?,
            tokens: self.tokens(source)?,
            library_manifest: LIBRARY_MANIFEST_TEMPLATE,
            relsrcdir: relpath(&source.srcdir, &self.config.topsrcdir),
        })
    }

    fn finish(&self, outcomes: &[EmitOutcome], run_build: bool) -> Result<()> {
        if !run_build {
            return Ok(());
        }
        let cwd = &self.config.topsrcdir;
        run_external(&self.config.package_command, &[], cwd)?;
        for (relsrcdir, names) in build_order(outcomes) {
            for name in names {
                let target = format!("{relsrcdir}/ANDROID_STUDIO_PROJECT_{name}");
                run_external(&self.config.build_command, &[target], cwd)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::module_name;

    #[test]
    fn module_names_drop_parent_hops() {
        assert_eq!(module_name("../FennecBranding"), "FennecBranding");
        assert_eq!(module_name("Omnijar"), "Omnijar");
    }
}
