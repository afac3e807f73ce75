//! Template trees and their materialization into a staging directory.
//!
//! Each backend owns one tree of templates. Trees ship inside the binary and
//! can be overridden by a template root directory on disk. Every file in a
//! tree, dotfiles included, produces one output file whose name and content
//! have tokens substituted.
use crate::preprocess::Preprocessor;
use crate::staging::write_staged_bytes;
use crate::tokens::TokenMap;
use crate::util::validate_relative_path;
use anyhow::{anyhow, Context, Result};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

pub const ANDROID_ECLIPSE_TEMPLATES: &str = "android_eclipse";
pub const ANDROID_STUDIO_TEMPLATES: &str = "android_studio";
pub const EMPTY_RESOURCE_DIRECTORY: &str = "android_eclipse_empty_resource_directory";

struct BundledFile {
    tree: &'static str,
    name: &'static str,
    bytes: &'static [u8],
}

const BUNDLED_TEMPLATES: &[BundledFile] = &[
    BundledFile {
        tree: ANDROID_ECLIPSE_TEMPLATES,
        name: ".classpath",
        bytes: include_bytes!("../templates/android_eclipse/.classpath"),
    },
    BundledFile {
        tree: ANDROID_ECLIPSE_TEMPLATES,
        name: ".externalToolBuilders/com.mozilla.ide.builder.launch",
        bytes: include_bytes!(
            "../templates/android_eclipse/.externalToolBuilders/com.mozilla.ide.builder.launch"
        ),
    },
    BundledFile {
        tree: ANDROID_ECLIPSE_TEMPLATES,
        name: ".project",
        bytes: include_bytes!("../templates/android_eclipse/.project"),
    },
    BundledFile {
        tree: ANDROID_ECLIPSE_TEMPLATES,
        name: ".settings/org.eclipse.core.resources.prefs",
        bytes: include_bytes!(
            "../templates/android_eclipse/.settings/org.eclipse.core.resources.prefs"
        ),
    },
    BundledFile {
        tree: ANDROID_ECLIPSE_TEMPLATES,
        name: "AndroidManifest.xml",
        bytes: include_bytes!("../templates/android_eclipse/AndroidManifest.xml"),
    },
    BundledFile {
        tree: ANDROID_ECLIPSE_TEMPLATES,
        name: "project.properties",
        bytes: include_bytes!("../templates/android_eclipse/project.properties"),
    },
    BundledFile {
        tree: ANDROID_STUDIO_TEMPLATES,
        name: ".classpath",
        bytes: include_bytes!("../templates/android_studio/.classpath"),
    },
    BundledFile {
        tree: ANDROID_STUDIO_TEMPLATES,
        name: ".project",
        bytes: include_bytes!("../templates/android_studio/.project"),
    },
    BundledFile {
        tree: ANDROID_STUDIO_TEMPLATES,
        name: "@IDE_PROJECT_NAME@.iml",
        bytes: include_bytes!("../templates/android_studio/@IDE_PROJECT_NAME@.iml"),
    },
    BundledFile {
        tree: ANDROID_STUDIO_TEMPLATES,
        name: "build.gradle",
        bytes: include_bytes!("../templates/android_studio/build.gradle"),
    },
    BundledFile {
        tree: ANDROID_STUDIO_TEMPLATES,
        name: "project.properties",
        bytes: include_bytes!("../templates/android_studio/project.properties"),
    },
    BundledFile {
        tree: ANDROID_STUDIO_TEMPLATES,
        name: "src/main/AndroidManifest.xml",
        bytes: include_bytes!("../templates/android_studio/src/main/AndroidManifest.xml"),
    },
    BundledFile {
        tree: EMPTY_RESOURCE_DIRECTORY,
        name: ".not_an_android_resource",
        bytes: include_bytes!(
            "../templates/android_eclipse_empty_resource_directory/.not_an_android_resource"
        ),
    },
];

/// One template: its `/`-separated name inside the tree and raw contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub name: String,
    pub bytes: Cow<'static, [u8]>,
}

/// Templates of `tree`, sorted by name. Read from `root` when given,
/// otherwise from the copies built into the binary.
pub fn load_templates(root: Option<&Path>, tree: &str) -> Result<Vec<TemplateFile>> {
    let Some(root) = root else {
        return bundled_templates(tree);
    };
    let dir = root.join(tree);
    find_templates(&dir)?
        .into_iter()
        .map(|name| {
            let path = dir.join(&name);
            let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
            Ok(TemplateFile {
                name,
                bytes: Cow::Owned(bytes),
            })
        })
        .collect()
}

fn bundled_templates(tree: &str) -> Result<Vec<TemplateFile>> {
    let mut files: Vec<TemplateFile> = BUNDLED_TEMPLATES
        .iter()
        .filter(|file| file.tree == tree)
        .map(|file| TemplateFile {
            name: file.name.to_string(),
            bytes: Cow::Borrowed(file.bytes),
        })
        .collect();
    if files.is_empty() {
        return Err(anyhow!("no bundled template tree named {tree:?}"));
    }
    files.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(files)
}

/// Write the bundled `tree` verbatim into `dest`.
pub fn extract_bundled(tree: &str, dest: &Path) -> Result<()> {
    for file in bundled_templates(tree)? {
        write_staged_bytes(dest, &file.name, &file.bytes)?;
    }
    Ok(())
}

/// Template files under `dir` as sorted `/`-separated relative paths.
pub fn find_templates(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(anyhow!("missing template directory {}", dir.display()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).follow_links(true) {
        let entry = entry.with_context(|| format!("walk templates {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .context("strip template prefix")?;
        files.push(rel.to_string_lossy().replace('\\', "/"));
    }
    files.sort();
    Ok(files)
}

/// Render `templates` into `staging_root`.
///
/// `skip` sees the substituted output name and may drop the file. Returns the
/// output names that were written.
pub fn materialize<F>(
    templates: &[TemplateFile],
    tokens: &TokenMap,
    staging_root: &Path,
    skip: F,
) -> Result<Vec<String>>
where
    F: Fn(&str) -> bool,
{
    let preprocessor = Preprocessor::new()?;
    let mut written = Vec::new();
    for template in templates {
        let output_name = tokens.substitute(&template.name);
        if skip(&output_name) {
            tracing::debug!(template = %template.name, "skipped template");
            continue;
        }
        validate_relative_path(&output_name, "template output")
            .with_context(|| format!("template {}", template.name))?;
        let rendered = match std::str::from_utf8(&template.bytes) {
            Ok(text) => Cow::Owned(preprocessor.run(text, tokens, &template.name)?.into_bytes()),
            Err(_) => Cow::Borrowed(template.bytes.as_ref()),
        };
        write_staged_bytes(staging_root, &output_name, &rendered)?;
        written.push(output_name);
    }
    Ok(written)
}
