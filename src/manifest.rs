//! Copy manifests describing how to populate a project directory.
//!
//! The on-disk format is line based: a version line, then one record per
//! line with fields separated by the ASCII unit separator (`0x1f`):
//!
//! ```text
//! 5
//! 1<US>res<US>/src/mobile/android/base/resources
//! 5<US>libs/**<US>/obj/dist/libs<US>**<US>libs
//! ```
use crate::util::validate_relative_path;
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const MANIFEST_VERSION: u32 = 5;
const FIELD_SEPARATOR: char = '\x1f';

const LINK: u32 = 1;
const COPY: u32 = 2;
const PATTERN_LINK: u32 = 5;
const PATTERN_COPY: u32 = 6;

/// Whether a directive links to its source or copies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    Link,
    Copy,
}

/// One manifest directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    /// Install a single file or directory at `dest`.
    File { mode: InstallMode, source: String },
    /// Install every file under `base` matching `pattern` beneath `dest`,
    /// resolved when the manifest is installed.
    Pattern {
        mode: InstallMode,
        base: String,
        pattern: String,
        dest: String,
    },
}

impl ManifestEntry {
    /// Path below the install root this entry writes at or under.
    fn install_root<'a>(&'a self, key: &'a str) -> &'a Path {
        match self {
            ManifestEntry::File { .. } => Path::new(key),
            ManifestEntry::Pattern { dest, .. } => Path::new(dest),
        }
    }

    fn fields(&self) -> Vec<&str> {
        match self {
            ManifestEntry::File { source, .. } => vec![source.as_str()],
            ManifestEntry::Pattern {
                base,
                pattern,
                dest,
                ..
            } => vec![base.as_str(), pattern.as_str(), dest.as_str()],
        }
    }

    fn type_code(&self) -> u32 {
        match self {
            ManifestEntry::File {
                mode: InstallMode::Link,
                ..
            } => LINK,
            ManifestEntry::File {
                mode: InstallMode::Copy,
                ..
            } => COPY,
            ManifestEntry::Pattern {
                mode: InstallMode::Link,
                ..
            } => PATTERN_LINK,
            ManifestEntry::Pattern {
                mode: InstallMode::Copy,
                ..
            } => PATTERN_COPY,
        }
    }
}

/// Ordered set of install directives keyed by destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallManifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl InstallManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn add_symlink(&mut self, source: &Path, dest: &str) -> Result<()> {
        self.add_file(InstallMode::Link, source, dest)
    }

    pub fn add_copy(&mut self, source: &Path, dest: &str) -> Result<()> {
        self.add_file(InstallMode::Copy, source, dest)
    }

    pub fn add_pattern_symlink(&mut self, base: &Path, pattern: &str, dest: &str) -> Result<()> {
        self.add_pattern(InstallMode::Link, base, pattern, dest)
    }

    pub fn add_pattern_copy(&mut self, base: &Path, pattern: &str, dest: &str) -> Result<()> {
        self.add_pattern(InstallMode::Copy, base, pattern, dest)
    }

    fn add_file(&mut self, mode: InstallMode, source: &Path, dest: &str) -> Result<()> {
        let source = source.to_string_lossy().to_string();
        self.add_entry(dest.to_string(), ManifestEntry::File { mode, source })
    }

    fn add_pattern(
        &mut self,
        mode: InstallMode,
        base: &Path,
        pattern: &str,
        dest: &str,
    ) -> Result<()> {
        glob::Pattern::new(pattern)
            .with_context(|| format!("invalid manifest pattern {pattern:?}"))?;
        let key = format!("{}/{pattern}", dest.trim_end_matches('/'));
        self.add_entry(
            key,
            ManifestEntry::Pattern {
                mode,
                base: base.to_string_lossy().to_string(),
                pattern: pattern.to_string(),
                dest: dest.to_string(),
            },
        )
    }

    fn add_entry(&mut self, key: String, entry: ManifestEntry) -> Result<()> {
        validate_relative_path(&key, "manifest destination")?;
        for field in entry.fields().into_iter().chain([key.as_str()]) {
            if field.contains(['\n', '\r', FIELD_SEPARATOR]) {
                return Err(anyhow!(
                    "manifest field {field:?} contains a line break or field separator"
                ));
            }
        }
        if self.entries.contains_key(&key) {
            return Err(anyhow!("manifest already has an entry for {key:?}"));
        }
        if let ManifestEntry::Pattern { dest, .. } = &entry {
            validate_relative_path(dest, "manifest destination")?;
        }
        if let Some(existing) = self.conflicting_key(&key, &entry) {
            return Err(anyhow!(
                "manifest destination {key:?} overlaps existing entry {existing:?}"
            ));
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    /// An existing key that would place one entry inside another.
    ///
    /// A file or link destination may not contain any other destination, and
    /// a pattern may not install beneath one.
    fn conflicting_key(&self, key: &str, entry: &ManifestEntry) -> Option<&str> {
        let target = entry.install_root(key);
        self.entries.iter().find_map(|(existing_key, existing)| {
            let existing_root = existing.install_root(existing_key);
            let clash = match (entry, existing) {
                (ManifestEntry::File { .. }, ManifestEntry::File { .. }) => {
                    target.starts_with(existing_root) || existing_root.starts_with(target)
                }
                (ManifestEntry::File { .. }, ManifestEntry::Pattern { .. }) => {
                    existing_root.starts_with(target)
                }
                (ManifestEntry::Pattern { .. }, ManifestEntry::File { .. }) => {
                    target.starts_with(existing_root)
                }
                (ManifestEntry::Pattern { .. }, ManifestEntry::Pattern { .. }) => false,
            };
            clash.then_some(existing_key.as_str())
        })
    }

    /// Serialize the manifest in its text format.
    pub fn to_text(&self) -> String {
        let mut out = format!("{MANIFEST_VERSION}\n");
        for (key, entry) in &self.entries {
            let mut fields = vec![entry.type_code().to_string(), key.clone()];
            match entry {
                ManifestEntry::File { source, .. } => fields.push(source.clone()),
                ManifestEntry::Pattern {
                    base,
                    pattern,
                    dest,
                    ..
                } => {
                    fields.push(base.clone());
                    fields.push(pattern.clone());
                    fields.push(dest.clone());
                }
            }
            out.push_str(&fields.join(&FIELD_SEPARATOR.to_string()));
            out.push('\n');
        }
        out
    }

    /// Parse a manifest previously produced by [`InstallManifest::to_text`].
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let version = lines
            .next()
            .ok_or_else(|| anyhow!("manifest is empty"))?
            .trim();
        if version != MANIFEST_VERSION.to_string() {
            return Err(anyhow!("unsupported manifest version {version:?}"));
        }
        let mut manifest = InstallManifest::new();
        for (idx, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_no = idx + 2;
            let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
            let code: u32 = fields[0]
                .parse()
                .with_context(|| format!("manifest line {line_no}: bad record type"))?;
            let key = fields.get(1).copied().unwrap_or_default();
            let entry = match (code, fields.len()) {
                (LINK, 3) | (COPY, 3) => ManifestEntry::File {
                    mode: if code == LINK {
                        InstallMode::Link
                    } else {
                        InstallMode::Copy
                    },
                    source: fields[2].to_string(),
                },
                (PATTERN_LINK, 5) | (PATTERN_COPY, 5) => ManifestEntry::Pattern {
                    mode: if code == PATTERN_LINK {
                        InstallMode::Link
                    } else {
                        InstallMode::Copy
                    },
                    base: fields[2].to_string(),
                    pattern: fields[3].to_string(),
                    dest: fields[4].to_string(),
                },
                _ => {
                    return Err(anyhow!(
                        "manifest line {line_no}: unsupported record type {code} with {} fields",
                        fields.len()
                    ))
                }
            };
            manifest
                .add_entry(key.to_string(), entry)
                .with_context(|| format!("manifest line {line_no}"))?;
        }
        Ok(manifest)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(path, self.to_text().as_bytes())
            .with_context(|| format!("write manifest {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read manifest {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse manifest {}", path.display()))
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
